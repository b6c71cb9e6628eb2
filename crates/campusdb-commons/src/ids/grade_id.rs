//! Type-safe wrapper for grade identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type-safe wrapper for grade record identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GradeId(String);

impl GradeId {
    /// Creates a new GradeId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the grade ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the inner String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for GradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for GradeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for GradeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for GradeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
