use thiserror::Error;

/// Error type shared by the domain, storage, and configuration layers.
#[derive(Debug, Error)]
pub enum FinanceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Already exists: {0}")]
    Duplicate(String),
}

pub type Result<T> = std::result::Result<T, FinanceError>;
