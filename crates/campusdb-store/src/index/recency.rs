//! Recency (date-sorted) index.
//!
//! Maintains entity IDs ordered by a timestamp field using reversed,
//! zero-padded numeric keys (`sort:{padded_reversed_ts}:{id}`), so that a
//! bounded prefix scan yields "most recent N" without a full scan plus sort.
//!
//! Removal recomputes the key from the original date, so callers must retain
//! the date used at insertion time; passing a different date silently
//! no-ops.

use crate::backend::{KvBackend, Shard};
use crate::config::StoreConfig;
use crate::error::Result;
use crate::key_encoding::{recency_entry_id, recency_entry_key, RECENCY_PREFIX};
use std::sync::Arc;

pub struct RecencyIndex {
    backend: Arc<dyn KvBackend>,
    shard: Shard,
    config: StoreConfig,
}

impl RecencyIndex {
    /// Index covering all records of one entity kind.
    pub fn new(backend: Arc<dyn KvBackend>, kind: &str) -> Self {
        Self {
            backend,
            shard: Shard::recency_index(kind, None),
            config: StoreConfig::default(),
        }
    }

    /// Scoped variant, e.g. announcements within one class.
    pub fn scoped(backend: Arc<dyn KvBackend>, kind: &str, scope: &str) -> Self {
        Self {
            backend,
            shard: Shard::recency_index(kind, Some(scope)),
            config: StoreConfig::default(),
        }
    }

    /// Adds an entry for `(date, id)`. Fails with
    /// [`StoreError::InvalidDate`](crate::StoreError::InvalidDate) when the
    /// date does not parse as RFC 3339.
    pub async fn add(&self, date: &str, id: &str) -> Result<()> {
        let key = recency_entry_key(date, id)?;
        self.backend.put(&self.shard, &key, id.as_bytes()).await
    }

    /// Removes the entry written for `(date, id)` by recomputing the same
    /// key. Returns whether an entry existed for that exact pair.
    pub async fn remove(&self, date: &str, id: &str) -> Result<bool> {
        let key = recency_entry_key(date, id)?;
        self.backend.delete(&self.shard, &key).await
    }

    /// Up to `limit` entity IDs, most recent first. Relies on ascending
    /// lexicographic key order equaling descending chronological order.
    pub async fn recent(&self, limit: usize) -> Result<Vec<String>> {
        let page = self
            .backend
            .list(&self.shard, Some(RECENCY_PREFIX), None, Some(limit))
            .await?;
        Ok(page
            .keys
            .iter()
            .filter_map(|k| recency_entry_id(k))
            .map(str::to_string)
            .collect())
    }

    /// Every entity ID, most recent first. Capped at the scan limit.
    pub async fn all(&self) -> Result<Vec<String>> {
        let page = self
            .backend
            .list(
                &self.shard,
                Some(RECENCY_PREFIX),
                None,
                Some(self.config.max_scan_keys),
            )
            .await?;
        if page.cursor.is_some() {
            log::warn!(
                "recency index {} scan reached the {}-key cap, result truncated",
                self.shard,
                self.config.max_scan_keys
            );
        }
        Ok(page
            .keys
            .iter()
            .filter_map(|k| recency_entry_id(k))
            .map(str::to_string)
            .collect())
    }

    pub async fn count(&self) -> Result<usize> {
        Ok(self.all().await?.len())
    }

    pub async fn clear(&self) -> Result<usize> {
        let page = self
            .backend
            .list(
                &self.shard,
                Some(RECENCY_PREFIX),
                None,
                Some(self.config.max_scan_keys),
            )
            .await?;
        self.backend.delete_batch(&self.shard, &page.keys).await
    }
}
