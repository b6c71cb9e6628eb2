//! Compound (multi-field) secondary index.
//!
//! Same pointer-entry mechanism as the single-field index, keyed by an
//! ordered tuple of field values: `compound:{v1}:{v2}:...:entity:{id}`.
//! Used where a lookup or uniqueness check depends on a field combination,
//! e.g. one grade per (student, course) pair.

use crate::backend::{KvBackend, Shard};
use crate::config::StoreConfig;
use crate::error::Result;
use crate::key_encoding::{compound_entry_key, compound_value_prefix, entity_id_after};
use std::sync::Arc;

pub struct CompoundIndex {
    backend: Arc<dyn KvBackend>,
    shard: Shard,
    fields: Vec<String>,
    config: StoreConfig,
}

impl CompoundIndex {
    pub fn new(backend: Arc<dyn KvBackend>, kind: &str, fields: &[&str]) -> Self {
        Self::with_config(backend, kind, fields, StoreConfig::default())
    }

    pub fn with_config(
        backend: Arc<dyn KvBackend>,
        kind: &str,
        fields: &[&str],
        config: StoreConfig,
    ) -> Self {
        Self {
            backend,
            shard: Shard::compound_index(kind, fields),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            config,
        }
    }

    /// The indexed field names, in key order.
    pub fn fields(&self) -> Vec<&str> {
        self.fields.iter().map(String::as_str).collect()
    }

    pub async fn add(&self, values: &[&str], id: &str) -> Result<()> {
        self.backend
            .put(&self.shard, &compound_entry_key(values, id), id.as_bytes())
            .await
    }

    pub async fn remove(&self, values: &[&str], id: &str) -> Result<bool> {
        self.backend
            .delete(&self.shard, &compound_entry_key(values, id))
            .await
    }

    /// Entity IDs matching the full value tuple.
    pub async fn ids_for_values(&self, values: &[&str]) -> Result<Vec<String>> {
        let prefix = compound_value_prefix(values);
        let page = self
            .backend
            .list(
                &self.shard,
                Some(&prefix),
                None,
                Some(self.config.max_scan_keys),
            )
            .await?;
        Ok(page
            .keys
            .iter()
            .filter_map(|k| entity_id_after(k, &prefix))
            .map(str::to_string)
            .collect())
    }

    pub async fn count_for_values(&self, values: &[&str]) -> Result<usize> {
        Ok(self.ids_for_values(values).await?.len())
    }

    pub async fn exists_for_values(&self, values: &[&str]) -> Result<bool> {
        let prefix = compound_value_prefix(values);
        let page = self
            .backend
            .list(&self.shard, Some(&prefix), None, Some(1))
            .await?;
        Ok(!page.keys.is_empty())
    }

    pub async fn clear_values(&self, values: &[&str]) -> Result<usize> {
        let prefix = compound_value_prefix(values);
        let page = self
            .backend
            .list(
                &self.shard,
                Some(&prefix),
                None,
                Some(self.config.max_scan_keys),
            )
            .await?;
        self.backend.delete_batch(&self.shard, &page.keys).await
    }

    pub async fn clear(&self) -> Result<usize> {
        let page = self
            .backend
            .list(
                &self.shard,
                Some("compound:"),
                None,
                Some(self.config.max_scan_keys),
            )
            .await?;
        self.backend.delete_batch(&self.shard, &page.keys).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::memory_backend;

    fn index() -> CompoundIndex {
        CompoundIndex::new(memory_backend(), "grade", &["student_id", "course_id"])
    }

    #[tokio::test]
    async fn test_tuple_round_trip() {
        let idx = index();
        idx.add(&["s1", "c1"], "g1").await.unwrap();

        assert_eq!(idx.ids_for_values(&["s1", "c1"]).await.unwrap(), vec!["g1"]);
        assert!(idx.exists_for_values(&["s1", "c1"]).await.unwrap());
        assert!(!idx.exists_for_values(&["s1", "c2"]).await.unwrap());

        assert!(idx.remove(&["s1", "c1"], "g1").await.unwrap());
        assert!(idx.ids_for_values(&["s1", "c1"]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tuple_order_matters() {
        let idx = index();
        idx.add(&["s1", "c1"], "g1").await.unwrap();

        assert!(idx.exists_for_values(&["s1", "c1"]).await.unwrap());
        assert!(!idx.exists_for_values(&["c1", "s1"]).await.unwrap());
    }

    #[tokio::test]
    async fn test_pair_uniqueness_probe() {
        let idx = index();
        idx.add(&["s1", "c1"], "g1").await.unwrap();
        idx.add(&["s1", "c2"], "g2").await.unwrap();
        idx.add(&["s2", "c1"], "g3").await.unwrap();

        assert_eq!(idx.count_for_values(&["s1", "c1"]).await.unwrap(), 1);
        assert_eq!(idx.count_for_values(&["s1", "c2"]).await.unwrap(), 1);
        assert_eq!(idx.clear().await.unwrap(), 3);
    }
}
