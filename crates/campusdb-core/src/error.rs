use campusdb_store::StoreError;
use thiserror::Error;

/// Errors that can occur in entity-store operations
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("circuit open for endpoint: {0}")]
    CircuitOpen(String),
}

/// Result type for entity-store operations
pub type Result<T> = std::result::Result<T, CoreError>;
