use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid room id {0:?}: expected 4-8 alphanumeric characters")]
    InvalidRoomId(String),

    #[error("unknown role {0:?}")]
    UnknownRole(String),

    #[error("fret {fret} on string {string} exceeds max fret {max}")]
    FretOutOfRange { string: usize, fret: u8, max: u8 },

    #[error("chord chart is not time-ordered at entry {index}")]
    UnorderedChart { index: usize },

    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
}
