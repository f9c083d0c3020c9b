use thiserror::Error;

#[derive(Debug, Error)]
pub enum StageError {
    #[error("progress store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("progress data is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}
