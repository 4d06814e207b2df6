use scamshield_scanner::ScanError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Failed to read config {path}: {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    ConfigJson(#[from] serde_json::Error),

    #[error("Invalid heuristic pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Scanner setup failed: {0}")]
    Scanner(#[from] ScanError),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("A scan is already in progress")]
    Busy,

    #[error("Scan was discarded by a restart")]
    Discarded,
}

pub type Result<T> = std::result::Result<T, CoreError>;
