use fretlink_core::{PeerMessage, Role};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    SignalingConnected,
    Joined,
    Negotiating,
    ChannelOpen,
    PeerLost,
    Closed,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "DISCONNECTED",
            ConnectionState::SignalingConnected => "SIGNALING_CONNECTED",
            ConnectionState::Joined => "JOINED",
            ConnectionState::Negotiating => "NEGOTIATING",
            ConnectionState::ChannelOpen => "CHANNEL_OPEN",
            ConnectionState::PeerLost => "PEER_LOST",
            ConnectionState::Closed => "CLOSED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ConnectionState::Closed)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a collaborator can observe about a session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    StateChanged(ConnectionState),
    Joined { room_id: String, role: Role },
    /// Both members are in the room.
    PeerReady,
    PeerLeft { role: Option<Role> },
    /// The peer channel is open. Fired once per successful negotiation.
    Connected,
    Message(PeerMessage),
    Error { message: String, fatal: bool },
}

/// Server `ERROR` messages that end the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    Unauthorized,
    RoleTaken,
    InvalidRoom,
}

impl Refusal {
    /// Recognises the fatal causes by their message text. Anything else is
    /// reported and otherwise ignored.
    pub fn classify(message: &str) -> Option<Self> {
        let message = message.to_ascii_lowercase();
        if message.contains("unauthorized") {
            Some(Refusal::Unauthorized)
        } else if message.contains("role already taken") {
            Some(Refusal::RoleTaken)
        } else if message.contains("invalid room") {
            Some(Refusal::InvalidRoom)
        } else {
            None
        }
    }
}
