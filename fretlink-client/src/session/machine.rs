use crate::session::state::{ConnectionState, Refusal, SessionEvent};
use fretlink_core::{IceCandidate, Role, SignalMessage};
use tracing::{debug, error, info, warn};

/// Something that happened to the session: a control frame, a transport
/// callback, the result of an effect, or a request from the owner.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionInput {
    Connect,
    ControlConnected,
    ControlFailed(String),
    ControlLost,
    Signal(SignalMessage),
    LocalOffer(String),
    LocalAnswer(String),
    RemoteDescriptionApplied,
    LocalCandidate(IceCandidate),
    NegotiationFailed(String),
    TransportConnected,
    TransportDisconnected,
    TransportFailed,
    ChannelReady,
    Retry,
    Disconnect,
}

/// Work the driver has to carry out in response to an input, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEffect {
    ConnectControl,
    CloseControl,
    SendSignal(SignalMessage),
    /// Build a fresh peer transport, discarding any previous one.
    PrepareTransport,
    CreateOffer,
    /// Apply the remote offer and answer it.
    AcceptOffer(String),
    ApplyAnswer(String),
    AddIceCandidate(IceCandidate),
    /// Start delivering peer channel traffic to the owner.
    ActivateChannel,
    CloseTransport,
    Notify(SessionEvent),
}

#[derive(Debug, Default)]
struct Negotiation {
    remote_applied: bool,
    sdp_complete: bool,
    transport_connected: bool,
    channel_ready: bool,
    pending_candidates: Vec<IceCandidate>,
}

/// Connection state machine of one device in one room.
///
/// Pure: it performs no I/O and returns the effects of every input instead.
/// `Closed` is terminal and swallows all further input.
pub struct SessionMachine {
    room_id: String,
    role: Role,
    token: String,
    state: ConnectionState,
    control_alive: bool,
    peer_present: bool,
    negotiation: Negotiation,
}

impl SessionMachine {
    pub fn new(room_id: impl Into<String>, role: Role, token: impl Into<String>) -> Self {
        Self {
            room_id: room_id.into(),
            role,
            token: token.into(),
            state: ConnectionState::Disconnected,
            control_alive: false,
            peer_present: false,
            negotiation: Negotiation::default(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn control_alive(&self) -> bool {
        self.control_alive
    }

    pub fn peer_present(&self) -> bool {
        self.peer_present
    }

    /// Remote candidates waiting for the remote description.
    pub fn buffered_candidates(&self) -> usize {
        self.negotiation.pending_candidates.len()
    }

    pub fn handle(&mut self, input: SessionInput) -> Vec<SessionEffect> {
        let mut fx = Vec::new();
        if self.state.is_terminal() {
            debug!("Session closed, ignoring {:?}", input);
            return fx;
        }

        match input {
            SessionInput::Connect => {
                if self.state == ConnectionState::Disconnected && !self.control_alive {
                    fx.push(SessionEffect::ConnectControl);
                }
            }

            SessionInput::ControlConnected => {
                if self.state != ConnectionState::Disconnected {
                    warn!("Control link connected while {}", self.state);
                    return fx;
                }
                self.control_alive = true;
                self.transition(ConnectionState::SignalingConnected, &mut fx);
                fx.push(SessionEffect::SendSignal(SignalMessage::Join {
                    room_id: self.room_id.clone(),
                    role: self.role,
                    token: self.token.clone(),
                }));
            }

            SessionInput::ControlFailed(reason) => {
                warn!("Could not reach signaling server: {}", reason);
                fx.push(SessionEffect::Notify(SessionEvent::Error {
                    message: reason,
                    fatal: false,
                }));
            }

            SessionInput::ControlLost => {
                self.control_alive = false;
                match self.state {
                    ConnectionState::ChannelOpen => {
                        info!("Signaling lost, peer channel stays open");
                    }
                    ConnectionState::Negotiating => {
                        self.abandon_negotiation(&mut fx);
                        self.transition(ConnectionState::PeerLost, &mut fx);
                    }
                    ConnectionState::SignalingConnected | ConnectionState::Joined => {
                        self.transition(ConnectionState::Disconnected, &mut fx);
                    }
                    _ => {}
                }
            }

            SessionInput::Signal(message) => self.on_signal(message, &mut fx),

            SessionInput::LocalOffer(sdp) => {
                if self.state == ConnectionState::Negotiating && self.role == Role::Performer {
                    fx.push(SessionEffect::SendSignal(SignalMessage::offer(sdp)));
                }
            }

            SessionInput::LocalAnswer(sdp) => {
                if self.state == ConnectionState::Negotiating && self.role == Role::Controller {
                    fx.push(SessionEffect::SendSignal(SignalMessage::answer(sdp)));
                    self.remote_description_applied(&mut fx);
                }
            }

            SessionInput::RemoteDescriptionApplied => {
                if self.state == ConnectionState::Negotiating && self.role == Role::Performer {
                    self.remote_description_applied(&mut fx);
                }
            }

            SessionInput::LocalCandidate(candidate) => {
                let negotiating = matches!(
                    self.state,
                    ConnectionState::Negotiating | ConnectionState::ChannelOpen
                );
                if negotiating && self.control_alive {
                    fx.push(SessionEffect::SendSignal(SignalMessage::ice(candidate)));
                } else {
                    debug!("Local candidate not sent while {}", self.state);
                }
            }

            SessionInput::NegotiationFailed(reason) => {
                if self.state == ConnectionState::Negotiating {
                    warn!("Negotiation failed: {}", reason);
                    self.abandon_negotiation(&mut fx);
                    fx.push(SessionEffect::Notify(SessionEvent::Error {
                        message: reason,
                        fatal: false,
                    }));
                    self.transition(ConnectionState::PeerLost, &mut fx);
                }
            }

            SessionInput::TransportConnected => {
                if self.state == ConnectionState::Negotiating {
                    self.negotiation.transport_connected = true;
                    self.try_open(&mut fx);
                }
            }

            SessionInput::ChannelReady => {
                if self.state == ConnectionState::Negotiating {
                    self.negotiation.channel_ready = true;
                    self.try_open(&mut fx);
                }
            }

            SessionInput::TransportDisconnected | SessionInput::TransportFailed => {
                if matches!(
                    self.state,
                    ConnectionState::Negotiating | ConnectionState::ChannelOpen
                ) {
                    warn!("Peer transport lost ({:?})", input);
                    self.abandon_negotiation(&mut fx);
                    self.transition(ConnectionState::PeerLost, &mut fx);
                }
            }

            SessionInput::Retry => match self.state {
                ConnectionState::PeerLost if self.control_alive => {
                    info!("Retrying handshake from JOINED");
                    self.transition(ConnectionState::Joined, &mut fx);
                    self.start_negotiation(&mut fx);
                }
                ConnectionState::PeerLost | ConnectionState::Disconnected => {
                    info!("Retrying from a fresh signaling connection");
                    self.transition(ConnectionState::Disconnected, &mut fx);
                    fx.push(SessionEffect::ConnectControl);
                }
                _ => debug!("Nothing to retry while {}", self.state),
            },

            SessionInput::Disconnect => {
                fx.push(SessionEffect::CloseTransport);
                if self.control_alive {
                    fx.push(SessionEffect::CloseControl);
                }
                self.control_alive = false;
                self.negotiation = Negotiation::default();
                self.transition(ConnectionState::Closed, &mut fx);
            }
        }

        fx
    }

    fn on_signal(&mut self, message: SignalMessage, fx: &mut Vec<SessionEffect>) {
        debug!("Signal {} while {}", message.kind(), self.state);
        match message {
            SignalMessage::Joined { payload } => {
                if self.state != ConnectionState::SignalingConnected {
                    warn!("Unexpected JOINED while {}", self.state);
                    return;
                }
                self.transition(ConnectionState::Joined, fx);
                fx.push(SessionEffect::Notify(SessionEvent::Joined {
                    room_id: payload.room_id,
                    role: payload.role,
                }));
            }

            SignalMessage::Ready { .. } => {
                self.peer_present = true;
                fx.push(SessionEffect::Notify(SessionEvent::PeerReady));
                match self.state {
                    ConnectionState::Joined => self.start_negotiation(fx),
                    ConnectionState::PeerLost if self.control_alive => {
                        self.transition(ConnectionState::Joined, fx);
                        self.start_negotiation(fx);
                    }
                    ConnectionState::Negotiating | ConnectionState::ChannelOpen => {
                        info!("Peer rejoined, restarting negotiation");
                        self.abandon_negotiation(fx);
                        self.transition(ConnectionState::Joined, fx);
                        self.start_negotiation(fx);
                    }
                    _ => warn!("Unexpected READY while {}", self.state),
                }
            }

            SignalMessage::Offer { payload } => {
                if self.role != Role::Controller {
                    warn!("Performer received an OFFER, ignoring");
                    return;
                }
                match self.state {
                    ConnectionState::Joined => {}
                    ConnectionState::Negotiating | ConnectionState::ChannelOpen => {
                        self.abandon_negotiation(fx);
                    }
                    ConnectionState::PeerLost if self.control_alive => {}
                    _ => {
                        warn!("Unexpected OFFER while {}", self.state);
                        return;
                    }
                }
                self.peer_present = true;
                self.negotiation = Negotiation::default();
                self.transition(ConnectionState::Negotiating, fx);
                fx.push(SessionEffect::PrepareTransport);
                fx.push(SessionEffect::AcceptOffer(payload.sdp));
            }

            SignalMessage::Answer { payload } => {
                let expected = self.role == Role::Performer
                    && self.state == ConnectionState::Negotiating
                    && !self.negotiation.sdp_complete;
                if expected {
                    fx.push(SessionEffect::ApplyAnswer(payload.sdp));
                } else {
                    warn!("Unexpected ANSWER while {}", self.state);
                }
            }

            SignalMessage::IceCandidate { payload } => match self.state {
                ConnectionState::Negotiating | ConnectionState::ChannelOpen
                    if self.negotiation.remote_applied =>
                {
                    fx.push(SessionEffect::AddIceCandidate(payload.candidate));
                }
                ConnectionState::Negotiating => {
                    debug!("Buffering ICE candidate until the remote description is set");
                    self.negotiation.pending_candidates.push(payload.candidate);
                }
                _ => warn!("Dropping ICE candidate received while {}", self.state),
            },

            SignalMessage::Error { payload } => match Refusal::classify(&payload.message) {
                Some(refusal) => {
                    error!("Session refused ({:?}): {}", refusal, payload.message);
                    fx.push(SessionEffect::Notify(SessionEvent::Error {
                        message: payload.message,
                        fatal: true,
                    }));
                    fx.push(SessionEffect::CloseTransport);
                    if self.control_alive {
                        fx.push(SessionEffect::CloseControl);
                    }
                    self.control_alive = false;
                    self.negotiation = Negotiation::default();
                    self.transition(ConnectionState::Closed, fx);
                }
                None => {
                    warn!("Server error: {}", payload.message);
                    fx.push(SessionEffect::Notify(SessionEvent::Error {
                        message: payload.message,
                        fatal: false,
                    }));
                }
            },

            SignalMessage::PeerDisconnected { payload } => {
                self.peer_present = false;
                fx.push(SessionEffect::Notify(SessionEvent::PeerLeft {
                    role: payload.map(|p| p.role),
                }));
                match self.state {
                    ConnectionState::Negotiating => {
                        self.abandon_negotiation(fx);
                        self.transition(ConnectionState::PeerLost, fx);
                    }
                    // The transport callbacks decide whether an open channel is gone.
                    ConnectionState::ChannelOpen => {
                        info!("Peer left signaling, peer channel stays open");
                    }
                    _ => {}
                }
            }

            SignalMessage::Join { .. } => warn!("Server sent a JOIN frame, ignoring"),
        }
    }

    /// From `Joined`: the performer offers as soon as the peer is present;
    /// the controller waits for the offer.
    fn start_negotiation(&mut self, fx: &mut Vec<SessionEffect>) {
        if self.role != Role::Performer || !self.peer_present {
            return;
        }
        self.negotiation = Negotiation::default();
        self.transition(ConnectionState::Negotiating, fx);
        fx.push(SessionEffect::PrepareTransport);
        fx.push(SessionEffect::CreateOffer);
    }

    fn remote_description_applied(&mut self, fx: &mut Vec<SessionEffect>) {
        self.negotiation.remote_applied = true;
        self.negotiation.sdp_complete = true;
        let pending = std::mem::take(&mut self.negotiation.pending_candidates);
        if !pending.is_empty() {
            debug!("Replaying {} buffered ICE candidates", pending.len());
        }
        fx.extend(pending.into_iter().map(SessionEffect::AddIceCandidate));
        self.try_open(fx);
    }

    fn try_open(&mut self, fx: &mut Vec<SessionEffect>) {
        let n = &self.negotiation;
        if n.sdp_complete && n.transport_connected && n.channel_ready {
            fx.push(SessionEffect::ActivateChannel);
            self.transition(ConnectionState::ChannelOpen, fx);
            fx.push(SessionEffect::Notify(SessionEvent::Connected));
        }
    }

    fn abandon_negotiation(&mut self, fx: &mut Vec<SessionEffect>) {
        self.negotiation = Negotiation::default();
        fx.push(SessionEffect::CloseTransport);
    }

    fn transition(&mut self, next: ConnectionState, fx: &mut Vec<SessionEffect>) {
        if self.state == next {
            return;
        }
        info!("Session {} ({}): {} -> {}", self.room_id, self.role, self.state, next);
        self.state = next;
        fx.push(SessionEffect::Notify(SessionEvent::StateChanged(next)));
    }
}
