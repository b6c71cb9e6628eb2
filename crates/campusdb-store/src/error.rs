//! Error types for storage operations.

use thiserror::Error;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur during storage operations.
///
/// Read-oriented paths surface absence as `None`/`false` rather than
/// `NotFound`; only update-by-ID paths fail with `NotFound`. Batch paths
/// swallow per-item failures and report counts instead of erroring.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Compare-and-set retries exhausted. The stored value is unchanged;
    /// the caller should retry the whole logical operation.
    #[error("concurrent modification on '{key}' after {attempts} attempts")]
    ConcurrentModification { key: String, attempts: u32 },

    /// A recency-index operation was given a timestamp that does not parse.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// Update-by-ID path against a record that does not exist.
    #[error("{kind} '{id}' not found")]
    NotFound { kind: String, id: String },

    /// Create against an ID that already has a record.
    #[error("{kind} '{id}' already exists")]
    AlreadyExists { kind: String, id: String },

    /// No secondary index is configured for the requested field.
    #[error("no '{field}' index configured for {kind}")]
    UnknownIndex { kind: String, field: String },

    /// Document encode/decode failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Error reported by the underlying substrate.
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// True when the error is the bounded-retry conflict outcome.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::ConcurrentModification { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::ConcurrentModification {
            key: "grade:g1".into(),
            attempts: 4,
        };
        assert_eq!(
            err.to_string(),
            "concurrent modification on 'grade:g1' after 4 attempts"
        );
        assert!(err.is_conflict());

        let err = StoreError::NotFound {
            kind: "user".into(),
            id: "u1".into(),
        };
        assert_eq!(err.to_string(), "user 'u1' not found");
        assert!(!err.is_conflict());
    }
}
