use thiserror::Error;

/// Error type that captures period store and configuration failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Period `{0}` not found")]
    NotFound(String),
    #[error("Period identifier must not be blank")]
    InvalidIdentifier,
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
