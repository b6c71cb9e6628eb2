//! Primary (membership) index.
//!
//! The authoritative set of live IDs for one entity kind, stored as one
//! `i:{id}` entry per member. Listing pages through substrate key order;
//! counting is a prefix scan (no maintained counter).

use crate::backend::{KvBackend, Shard};
use crate::config::StoreConfig;
use crate::error::Result;
use crate::key_encoding::{primary_entry_id, primary_entry_key, PRIMARY_PREFIX};
use std::sync::Arc;

/// One page of entity IDs.
#[derive(Debug, Clone, Default)]
pub struct IdPage {
    pub ids: Vec<String>,
    /// Opaque continuation cursor; `None` when exhausted.
    pub cursor: Option<String>,
}

pub struct PrimaryIndex {
    backend: Arc<dyn KvBackend>,
    shard: Shard,
    config: StoreConfig,
}

impl PrimaryIndex {
    pub fn new(backend: Arc<dyn KvBackend>, index_name: &str) -> Self {
        Self::with_config(backend, index_name, StoreConfig::default())
    }

    pub fn with_config(backend: Arc<dyn KvBackend>, index_name: &str, config: StoreConfig) -> Self {
        Self {
            backend,
            shard: Shard::primary_index(index_name),
            config,
        }
    }

    /// Idempotent membership insert.
    pub async fn add(&self, id: &str) -> Result<()> {
        self.backend
            .put(&self.shard, &primary_entry_key(id), id.as_bytes())
            .await
    }

    /// Inserts several members in one pass.
    pub async fn add_batch(&self, ids: &[String]) -> Result<()> {
        for id in ids {
            self.add(id).await?;
        }
        Ok(())
    }

    pub async fn contains(&self, id: &str) -> Result<bool> {
        Ok(self
            .backend
            .get(&self.shard, &primary_entry_key(id))
            .await?
            .is_some())
    }

    /// Removes a member. Idempotent no-op for absent IDs.
    pub async fn remove(&self, id: &str) -> Result<bool> {
        self.backend
            .delete(&self.shard, &primary_entry_key(id))
            .await
    }

    /// Removes several members, returning the count actually removed.
    pub async fn remove_batch(&self, ids: &[String]) -> Result<usize> {
        let keys: Vec<String> = ids.iter().map(|id| primary_entry_key(id)).collect();
        self.backend.delete_batch(&self.shard, &keys).await
    }

    /// Returns up to `limit` IDs in substrate key order plus a continuation
    /// cursor (`None` when exhausted).
    pub async fn page(&self, cursor: Option<&str>, limit: Option<usize>) -> Result<IdPage> {
        let page = self
            .backend
            .list(&self.shard, Some(PRIMARY_PREFIX), cursor, limit)
            .await?;
        Ok(IdPage {
            ids: page
                .keys
                .iter()
                .filter_map(|k| primary_entry_id(k))
                .map(str::to_string)
                .collect(),
            cursor: page.cursor,
        })
    }

    /// Collects every member ID. Capped at the configured scan limit.
    pub async fn list(&self) -> Result<Vec<String>> {
        let page = self
            .backend
            .list(
                &self.shard,
                Some(PRIMARY_PREFIX),
                None,
                Some(self.config.max_scan_keys),
            )
            .await?;
        if page.cursor.is_some() {
            log::warn!(
                "primary index {} scan reached the {}-key cap, result truncated",
                self.shard,
                self.config.max_scan_keys
            );
        }
        Ok(page
            .keys
            .iter()
            .filter_map(|k| primary_entry_id(k))
            .map(str::to_string)
            .collect())
    }

    /// Cardinality via prefix scan length — O(n).
    pub async fn count(&self) -> Result<usize> {
        Ok(self.list().await?.len())
    }

    /// Removes every member, returning the count removed.
    pub async fn clear(&self) -> Result<usize> {
        let page = self
            .backend
            .list(
                &self.shard,
                Some(PRIMARY_PREFIX),
                None,
                Some(self.config.max_scan_keys),
            )
            .await?;
        self.backend.delete_batch(&self.shard, &page.keys).await
    }
}
