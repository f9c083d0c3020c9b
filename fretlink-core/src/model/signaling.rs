use crate::error::CoreError;
use crate::model::role::Role;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

/// Control-channel frame exchanged with the rendezvous server.
///
/// `JOIN` is flat (`{type, roomId, role, token}`); every other frame carries
/// its data under `payload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalMessage {
    Join {
        #[serde(rename = "roomId")]
        room_id: String,
        role: Role,
        #[serde(default)]
        token: String,
    },
    Joined {
        payload: JoinedPayload,
    },
    Ready {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<ReadyPayload>,
    },
    Offer {
        payload: SdpPayload,
    },
    Answer {
        payload: SdpPayload,
    },
    IceCandidate {
        payload: IceCandidatePayload,
    },
    Error {
        payload: ErrorPayload,
    },
    PeerDisconnected {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<PeerDisconnectedPayload>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinedPayload {
    #[serde(rename = "roomId")]
    pub room_id: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadyPayload {
    #[serde(rename = "roomId")]
    pub room_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SdpPayload {
    pub sdp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IceCandidatePayload {
    pub candidate: IceCandidate,
}

/// Browser-compatible `RTCIceCandidateInit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    pub candidate: String,
    #[serde(default)]
    pub sdp_mid: Option<String>,
    #[serde(default, rename = "sdpMLineIndex")]
    pub sdp_mline_index: Option<u16>,
    #[serde(default)]
    pub username_fragment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerDisconnectedPayload {
    pub role: Role,
}

impl SignalMessage {
    pub fn decode(text: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn encode(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            payload: ErrorPayload {
                message: message.into(),
            },
        }
    }

    pub fn offer(sdp: impl Into<String>) -> Self {
        Self::Offer {
            payload: SdpPayload { sdp: sdp.into() },
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self::Answer {
            payload: SdpPayload { sdp: sdp.into() },
        }
    }

    pub fn ice(candidate: IceCandidate) -> Self {
        Self::IceCandidate {
            payload: IceCandidatePayload { candidate },
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Join { .. } => "JOIN",
            Self::Joined { .. } => "JOINED",
            Self::Ready { .. } => "READY",
            Self::Offer { .. } => "OFFER",
            Self::Answer { .. } => "ANSWER",
            Self::IceCandidate { .. } => "ICE_CANDIDATE",
            Self::Error { .. } => "ERROR",
            Self::PeerDisconnected { .. } => "PEER_DISCONNECTED",
        }
    }

    /// Frames the server forwards verbatim to the other member of the room.
    pub fn is_relayed(&self) -> bool {
        matches!(
            self,
            Self::Offer { .. } | Self::Answer { .. } | Self::IceCandidate { .. }
        )
    }
}
