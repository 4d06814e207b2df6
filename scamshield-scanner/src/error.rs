use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Unexpected HTTP status: {0}")]
    Status(u16),

    #[error("No API credential configured for {0}")]
    MissingCredential(&'static str),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Timed out after {0} seconds")]
    Timeout(u64),

    #[error("Task join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),

    #[error("Other error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ScanError>;
