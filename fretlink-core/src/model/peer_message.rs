use crate::error::CoreError;
use crate::model::fret::FretState;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Application payload carried over the peer data channel.
#[derive(Debug, Clone, PartialEq)]
pub enum PeerMessage {
    FretUpdate(FretState),
    /// Any other tag. Ignored by the game core, handed through to collaborators.
    Other { kind: String, payload: Value },
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    payload: Value,
}

const FRET_UPDATE: &str = "FRET_UPDATE";

impl PeerMessage {
    pub fn decode(data: &[u8]) -> Result<Self, CoreError> {
        let envelope: Envelope = serde_json::from_slice(data)?;
        match envelope.kind.as_str() {
            FRET_UPDATE => Ok(Self::FretUpdate(serde_json::from_value(envelope.payload)?)),
            _ => Ok(Self::Other {
                kind: envelope.kind,
                payload: envelope.payload,
            }),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, CoreError> {
        let envelope = match self {
            Self::FretUpdate(state) => Envelope {
                kind: FRET_UPDATE.to_owned(),
                payload: serde_json::to_value(state)?,
            },
            Self::Other { kind, payload } => Envelope {
                kind: kind.clone(),
                payload: payload.clone(),
            },
        };
        Ok(serde_json::to_vec(&envelope)?)
    }

    pub fn kind(&self) -> &str {
        match self {
            Self::FretUpdate(_) => FRET_UPDATE,
            Self::Other { kind, .. } => kind,
        }
    }
}
