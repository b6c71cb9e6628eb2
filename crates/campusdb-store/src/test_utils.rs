//! Test utilities for campusdb-store.
//!
//! Provides helpers for setting up test backends with minimal boilerplate.
//! Available to dependent crates' tests as well.

use crate::backend::{CasOutcome, KvBackend, ListPage, Shard, Versioned};
use crate::error::Result;
use crate::memory::MemoryBackend;
use async_trait::async_trait;
use campusdb_commons::Document;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Fresh in-memory backend behind the trait object the store layers expect.
pub fn memory_backend() -> Arc<dyn KvBackend> {
    Arc::new(MemoryBackend::new())
}

/// Backend wrapper whose compare-and-set always reports a conflict.
///
/// Used to exercise the bounded-retry path: reads, scans, and deletes pass
/// through to the wrapped backend, so retry loops observe real state while
/// never being allowed to win the write.
pub struct ConflictingBackend {
    inner: Arc<dyn KvBackend>,
    cas_attempts: AtomicU64,
}

impl ConflictingBackend {
    pub fn wrap(inner: Arc<dyn KvBackend>) -> Self {
        Self {
            inner,
            cas_attempts: AtomicU64::new(0),
        }
    }

    /// Number of compare-and-set attempts observed so far.
    pub fn cas_attempts(&self) -> u64 {
        self.cas_attempts.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl KvBackend for ConflictingBackend {
    async fn get(&self, shard: &Shard, key: &str) -> Result<Option<Versioned>> {
        self.inner.get(shard, key).await
    }

    async fn put(&self, shard: &Shard, key: &str, value: &[u8]) -> Result<()> {
        self.inner.put(shard, key, value).await
    }

    async fn delete(&self, shard: &Shard, key: &str) -> Result<bool> {
        self.inner.delete(shard, key).await
    }

    async fn delete_batch(&self, shard: &Shard, keys: &[String]) -> Result<usize> {
        self.inner.delete_batch(shard, keys).await
    }

    async fn compare_and_set(
        &self,
        shard: &Shard,
        key: &str,
        _expected_version: u64,
        _value: &[u8],
    ) -> Result<CasOutcome> {
        self.cas_attempts.fetch_add(1, Ordering::Relaxed);
        let current_version = self
            .inner
            .get(shard, key)
            .await?
            .map(|v| v.version)
            .unwrap_or(0);
        Ok(CasOutcome::Conflict { current_version })
    }

    async fn list(
        &self,
        shard: &Shard,
        prefix: Option<&str>,
        cursor: Option<&str>,
        limit: Option<usize>,
    ) -> Result<ListPage> {
        self.inner.list(shard, prefix, cursor, limit).await
    }
}

/// Minimal document type for store-level tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub body: String,
    pub views: i64,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
    pub deleted_at: Option<i64>,
}

impl Note {
    pub fn blank(id: &str) -> Self {
        Self {
            id: id.to_string(),
            body: String::new(),
            views: 0,
            created_at: None,
            updated_at: None,
            deleted_at: None,
        }
    }

    pub fn with_body(id: &str, body: &str) -> Self {
        Self {
            body: body.to_string(),
            ..Self::blank(id)
        }
    }
}

impl Document for Note {
    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> Option<i64> {
        self.created_at
    }

    fn updated_at(&self) -> Option<i64> {
        self.updated_at
    }

    fn deleted_at(&self) -> Option<i64> {
        self.deleted_at
    }

    fn set_created_at(&mut self, ts: Option<i64>) {
        self.created_at = ts;
    }

    fn set_updated_at(&mut self, ts: Option<i64>) {
        self.updated_at = ts;
    }

    fn set_deleted_at(&mut self, ts: Option<i64>) {
        self.deleted_at = ts;
    }
}
