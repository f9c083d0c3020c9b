use fretlink_core::CoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("signaling connection failed: {0}")]
    Signaling(String),

    #[error("signaling connection is closed")]
    ControlClosed,

    #[error("room directory request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("room {0} is full")]
    RoomConflict(String),

    #[error("room request rejected ({status}): {message}")]
    RoomRejected { status: u16, message: String },

    #[error("server refused the session: {0}")]
    Rejected(String),

    #[error("session closed")]
    SessionClosed,

    #[error("timed out waiting for {0}")]
    Timeout(&'static str),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ClientError {
    /// Transient failures worth another attempt; authorization and validation
    /// failures are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Signaling(_) | ClientError::ControlClosed | ClientError::Timeout(_) => {
                true
            }
            ClientError::Http(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }
}

/// Failure of a fire-and-forget send on the peer channel.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SendError {
    #[error("peer channel is not open")]
    NotOpen,

    #[error("peer channel is closed")]
    Closed,

    #[error("payload could not be encoded: {0}")]
    Encode(String),
}
