//! Single-field secondary index.
//!
//! Maps one field's value to the set of entity IDs sharing that value via
//! `field:{value}:entity:{id}` pointer entries. Encoding the ID into the key
//! lets membership queries resolve without fetching documents; the trade-off
//! is that the index must be explicitly repaired if the indexed field changes
//! outside the maintained mutation path — the index is derived, not
//! authoritative.

use crate::backend::{KvBackend, Shard};
use crate::config::StoreConfig;
use crate::error::Result;
use crate::key_encoding::{entity_id_after, secondary_entry_key, secondary_value_prefix};
use std::sync::Arc;

pub struct SecondaryIndex {
    backend: Arc<dyn KvBackend>,
    shard: Shard,
    field: String,
    config: StoreConfig,
}

impl SecondaryIndex {
    pub fn new(backend: Arc<dyn KvBackend>, kind: &str, field: &str) -> Self {
        Self::with_config(backend, kind, field, StoreConfig::default())
    }

    pub fn with_config(
        backend: Arc<dyn KvBackend>,
        kind: &str,
        field: &str,
        config: StoreConfig,
    ) -> Self {
        Self {
            backend,
            shard: Shard::secondary_index(kind, field),
            field: field.to_string(),
            config,
        }
    }

    /// The indexed field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Writes one pointer entry. Unconditional — the entry's own value is
    /// trivial, so last-writer-wins is safe.
    pub async fn add(&self, value: &str, id: &str) -> Result<()> {
        self.backend
            .put(&self.shard, &secondary_entry_key(value, id), id.as_bytes())
            .await
    }

    /// Deletes one pointer entry, reporting whether it existed.
    pub async fn remove(&self, value: &str, id: &str) -> Result<bool> {
        self.backend
            .delete(&self.shard, &secondary_entry_key(value, id))
            .await
    }

    /// Entity IDs in the bucket for `value`, recovered from key suffixes —
    /// no document fetch involved.
    pub async fn ids_for_value(&self, value: &str) -> Result<Vec<String>> {
        let prefix = secondary_value_prefix(value);
        let page = self
            .backend
            .list(
                &self.shard,
                Some(&prefix),
                None,
                Some(self.config.max_scan_keys),
            )
            .await?;
        if page.cursor.is_some() {
            log::warn!(
                "secondary index {} bucket scan reached the {}-key cap",
                self.shard,
                self.config.max_scan_keys
            );
        }
        Ok(page
            .keys
            .iter()
            .filter_map(|k| entity_id_after(k, &prefix))
            .map(str::to_string)
            .collect())
    }

    pub async fn count_for_value(&self, value: &str) -> Result<usize> {
        Ok(self.ids_for_value(value).await?.len())
    }

    /// Existence probe, short-circuited to a single-key scan.
    pub async fn exists_for_value(&self, value: &str) -> Result<bool> {
        let prefix = secondary_value_prefix(value);
        let page = self
            .backend
            .list(&self.shard, Some(&prefix), None, Some(1))
            .await?;
        Ok(!page.keys.is_empty())
    }

    /// Deletes one bucket, returning the count removed.
    pub async fn clear_value(&self, value: &str) -> Result<usize> {
        let prefix = secondary_value_prefix(value);
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

    /// Deletes the entire index, returning the count removed.
    pub async fn clear(&self) -> Result<usize> {
        let page = self
            .backend
            .list(
                &self.shard,
                Some("field:"),
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

    fn index() -> SecondaryIndex {
        SecondaryIndex::new(memory_backend(), "grade", "student_id")
    }

    #[tokio::test]
    async fn test_round_trip() {
        let idx = index();
        idx.add("s1", "g1").await.unwrap();

        assert_eq!(idx.ids_for_value("s1").await.unwrap(), vec!["g1"]);
        assert!(idx.exists_for_value("s1").await.unwrap());

        assert!(idx.remove("s1", "g1").await.unwrap());
        assert!(idx.ids_for_value("s1").await.unwrap().is_empty());
        assert!(!idx.exists_for_value("s1").await.unwrap());
        assert!(!idx.remove("s1", "g1").await.unwrap());
    }

    #[tokio::test]
    async fn test_buckets_are_separate() {
        let idx = index();
        idx.add("s1", "g1").await.unwrap();
        idx.add("s1", "g2").await.unwrap();
        idx.add("s2", "g3").await.unwrap();

        assert_eq!(idx.count_for_value("s1").await.unwrap(), 2);
        assert_eq!(idx.count_for_value("s2").await.unwrap(), 1);
        assert_eq!(idx.count_for_value("s3").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_value_with_colon_does_not_bleed_between_buckets() {
        let idx = index();
        idx.add("s1:a", "g1").await.unwrap();
        idx.add("s1", "g2").await.unwrap();

        // "s1" prefix scans stop at the ":entity:" marker of its own bucket.
        assert_eq!(idx.ids_for_value("s1").await.unwrap(), vec!["g2"]);
        assert_eq!(idx.ids_for_value("s1:a").await.unwrap(), vec!["g1"]);
    }

    #[tokio::test]
    async fn test_clear_value_and_clear() {
        let idx = index();
        idx.add("s1", "g1").await.unwrap();
        idx.add("s1", "g2").await.unwrap();
        idx.add("s2", "g3").await.unwrap();

        assert_eq!(idx.clear_value("s1").await.unwrap(), 2);
        assert_eq!(idx.count_for_value("s2").await.unwrap(), 1);

        assert_eq!(idx.clear().await.unwrap(), 1);
        assert_eq!(idx.count_for_value("s2").await.unwrap(), 0);
    }
}
