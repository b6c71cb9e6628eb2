//! Type-safe wrapper for announcement identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type-safe wrapper for announcement identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnouncementId(String);

impl AnnouncementId {
    /// Creates a new AnnouncementId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the announcement ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the inner String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for AnnouncementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AnnouncementId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AnnouncementId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for AnnouncementId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
