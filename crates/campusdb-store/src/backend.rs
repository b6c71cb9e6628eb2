//! Substrate abstraction for pluggable key-value backends.
//!
//! This module defines the minimal contract the rest of the crate is built
//! on: per-shard `get`/`put`/`delete`, a batch delete, a single-operation
//! transactional compare-and-set, and a lexicographically ordered prefix
//! scan with cursor pagination. Nothing else is assumed of the substrate —
//! in particular there are no multi-key transactions.
//!
//! ## Shard Model
//!
//! A [`Shard`] names one independently addressable unit of storage with its
//! own keyspace and its own per-key operation serialization. Each record
//! kind, each primary index, and each secondary/compound/recency index owns
//! a disjoint shard, so no two components ever contend for the same key
//! except a record and its own version counter — which is exactly what
//! compare-and-set arbitrates.

use crate::error::Result;
use async_trait::async_trait;
use std::fmt;

/// Names one logical shard of data within the substrate.
///
/// Shard names are derived deterministically from the entity kind and, for
/// indexes, the field name or scope — see the constructors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shard {
    name: String,
}

impl Shard {
    /// Creates a shard with an explicit name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Shard holding the records of one entity kind.
    pub fn records(kind: &str) -> Self {
        Self::new(kind)
    }

    /// Shard holding a primary (membership) index.
    pub fn primary_index(index_name: &str) -> Self {
        Self::new(format!("idx:{index_name}"))
    }

    /// Shard holding a single-field secondary index.
    pub fn secondary_index(kind: &str, field: &str) -> Self {
        Self::new(format!("idx:{kind}:{field}"))
    }

    /// Shard holding a compound (multi-field) secondary index.
    pub fn compound_index(kind: &str, fields: &[&str]) -> Self {
        Self::new(format!("idx:{kind}:{}", fields.join("+")))
    }

    /// Shard holding a recency index, optionally scoped (e.g. per class).
    pub fn recency_index(kind: &str, scope: Option<&str>) -> Self {
        match scope {
            Some(scope) => Self::new(format!("recency:{kind}:{scope}")),
            None => Self::new(format!("recency:{kind}")),
        }
    }

    /// Returns the shard name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Shard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl From<&str> for Shard {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A stored value together with its write version.
///
/// `version` starts at 1 on the first successful write and increases by
/// exactly 1 on every subsequent write to the same key; version 0 is the
/// implicit version of an absent key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned {
    pub version: u64,
    pub data: Vec<u8>,
}

/// Outcome of a compare-and-set attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasOutcome {
    /// The write was applied; `version` is the new stored version.
    Applied { version: u64 },
    /// The stored version did not match the expectation; nothing was written.
    Conflict { current_version: u64 },
}

/// One page of keys from a prefix scan.
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    /// Keys in lexicographic order.
    pub keys: Vec<String>,
    /// Opaque continuation cursor; `None` when the scan is exhausted.
    pub cursor: Option<String>,
}

/// Trait for pluggable substrate implementations.
///
/// Implementations must be thread-safe (`Send + Sync`) and must serialize
/// operations per key: two concurrent `compare_and_set` calls against the
/// same key must observe each other.
///
/// ## Error Handling
///
/// Implementations report substrate-level failures as
/// [`StoreError::Backend`](crate::StoreError::Backend); absence of a key is
/// never an error.
#[async_trait]
pub trait KvBackend: Send + Sync {
    /// Retrieves a value and its version. `Ok(None)` when the key is absent.
    async fn get(&self, shard: &Shard, key: &str) -> Result<Option<Versioned>>;

    /// Stores a value unconditionally, bumping the stored version.
    async fn put(&self, shard: &Shard, key: &str, value: &[u8]) -> Result<()>;

    /// Deletes a key. Returns whether the key existed (idempotent).
    async fn delete(&self, shard: &Shard, key: &str) -> Result<bool>;

    /// Deletes several keys, returning the count actually removed.
    async fn delete_batch(&self, shard: &Shard, keys: &[String]) -> Result<usize>;

    /// Conditional write: applied only when the stored version equals
    /// `expected_version` (0 for "key must be absent"). This is the only
    /// transactional primitive the substrate offers.
    async fn compare_and_set(
        &self,
        shard: &Shard,
        key: &str,
        expected_version: u64,
        value: &[u8],
    ) -> Result<CasOutcome>;

    /// Scans keys in lexicographic order.
    ///
    /// * `prefix` — when set, only keys starting with it are returned.
    /// * `cursor` — opaque continuation token from a previous page; the scan
    ///   resumes strictly after it.
    /// * `limit` — maximum number of keys per page.
    async fn list(
        &self,
        shard: &Shard,
        prefix: Option<&str>,
        cursor: Option<&str>,
        limit: Option<usize>,
    ) -> Result<ListPage>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shard_naming() {
        assert_eq!(Shard::records("grade").name(), "grade");
        assert_eq!(Shard::primary_index("grades").name(), "idx:grades");
        assert_eq!(
            Shard::secondary_index("grade", "student_id").name(),
            "idx:grade:student_id"
        );
        assert_eq!(
            Shard::compound_index("grade", &["student_id", "course_id"]).name(),
            "idx:grade:student_id+course_id"
        );
        assert_eq!(
            Shard::recency_index("announcement", Some("c1")).name(),
            "recency:announcement:c1"
        );
        assert_eq!(
            Shard::recency_index("grade", None).name(),
            "recency:grade"
        );
    }
}
