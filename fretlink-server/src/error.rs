use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid allowed origin '{0}'")]
    InvalidOrigin(String),

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}
