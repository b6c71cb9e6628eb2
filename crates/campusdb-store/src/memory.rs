//! In-memory substrate adapter.
//!
//! Reference implementation of [`KvBackend`] over per-shard ordered maps.
//! `BTreeMap` gives the lexicographic key order the prefix-scan contract
//! requires. This is the backend used in tests and embedded deployments;
//! durable substrates live with the embedder and implement the same trait.

use crate::backend::{CasOutcome, KvBackend, ListPage, Shard, Versioned};
use crate::error::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;

/// In-memory [`KvBackend`] implementation.
#[derive(Default)]
pub struct MemoryBackend {
    shards: RwLock<HashMap<String, BTreeMap<String, Versioned>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvBackend for MemoryBackend {
    async fn get(&self, shard: &Shard, key: &str) -> Result<Option<Versioned>> {
        Ok(self
            .shards
            .read()
            .get(shard.name())
            .and_then(|m| m.get(key))
            .cloned())
    }

    async fn put(&self, shard: &Shard, key: &str, value: &[u8]) -> Result<()> {
        let mut shards = self.shards.write();
        let map = shards.entry(shard.name().to_string()).or_default();
        let version = map.get(key).map(|v| v.version).unwrap_or(0) + 1;
        map.insert(
            key.to_string(),
            Versioned {
                version,
                data: value.to_vec(),
            },
        );
        Ok(())
    }

    async fn delete(&self, shard: &Shard, key: &str) -> Result<bool> {
        let mut shards = self.shards.write();
        Ok(shards
            .get_mut(shard.name())
            .map(|m| m.remove(key).is_some())
            .unwrap_or(false))
    }

    async fn delete_batch(&self, shard: &Shard, keys: &[String]) -> Result<usize> {
        let mut shards = self.shards.write();
        let Some(map) = shards.get_mut(shard.name()) else {
            return Ok(0);
        };
        Ok(keys.iter().filter(|k| map.remove(*k).is_some()).count())
    }

    async fn compare_and_set(
        &self,
        shard: &Shard,
        key: &str,
        expected_version: u64,
        value: &[u8],
    ) -> Result<CasOutcome> {
        let mut shards = self.shards.write();
        let map = shards.entry(shard.name().to_string()).or_default();
        let current = map.get(key).map(|v| v.version).unwrap_or(0);
        if current != expected_version {
            return Ok(CasOutcome::Conflict {
                current_version: current,
            });
        }
        let version = current + 1;
        map.insert(
            key.to_string(),
            Versioned {
                version,
                data: value.to_vec(),
            },
        );
        Ok(CasOutcome::Applied { version })
    }

    async fn list(
        &self,
        shard: &Shard,
        prefix: Option<&str>,
        cursor: Option<&str>,
        limit: Option<usize>,
    ) -> Result<ListPage> {
        let shards = self.shards.read();
        let Some(map) = shards.get(shard.name()) else {
            return Ok(ListPage::default());
        };

        // Resume strictly after the cursor, or at the prefix itself.
        let start: Bound<String> = match (cursor, prefix) {
            (Some(c), _) => Bound::Excluded(c.to_string()),
            (None, Some(p)) => Bound::Included(p.to_string()),
            (None, None) => Bound::Unbounded,
        };

        let matches = map
            .range((start, Bound::Unbounded))
            .map(|(k, _)| k)
            .take_while(|k| prefix.map(|p| k.starts_with(p)).unwrap_or(true));

        let mut keys: Vec<String> = match limit {
            // Fetch one extra key to learn whether another page exists.
            Some(limit) => matches.take(limit + 1).cloned().collect(),
            None => matches.cloned().collect(),
        };

        let cursor = match limit {
            Some(limit) if keys.len() > limit => {
                keys.truncate(limit);
                keys.last().cloned()
            }
            _ => None,
        };

        Ok(ListPage { keys, cursor })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shard() -> Shard {
        Shard::new("test")
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let backend = MemoryBackend::new();
        let s = shard();

        assert!(backend.get(&s, "k").await.unwrap().is_none());
        backend.put(&s, "k", b"v1").await.unwrap();

        let got = backend.get(&s, "k").await.unwrap().unwrap();
        assert_eq!(got.version, 1);
        assert_eq!(got.data, b"v1");

        backend.put(&s, "k", b"v2").await.unwrap();
        assert_eq!(backend.get(&s, "k").await.unwrap().unwrap().version, 2);

        assert!(backend.delete(&s, "k").await.unwrap());
        assert!(!backend.delete(&s, "k").await.unwrap());
    }

    #[tokio::test]
    async fn test_compare_and_set_enforces_version() {
        let backend = MemoryBackend::new();
        let s = shard();

        // First write must expect version 0.
        let out = backend.compare_and_set(&s, "k", 0, b"a").await.unwrap();
        assert_eq!(out, CasOutcome::Applied { version: 1 });

        // Stale expectation conflicts and leaves the value untouched.
        let out = backend.compare_and_set(&s, "k", 0, b"b").await.unwrap();
        assert_eq!(out, CasOutcome::Conflict { current_version: 1 });
        assert_eq!(backend.get(&s, "k").await.unwrap().unwrap().data, b"a");

        let out = backend.compare_and_set(&s, "k", 1, b"b").await.unwrap();
        assert_eq!(out, CasOutcome::Applied { version: 2 });
    }

    #[tokio::test]
    async fn test_list_orders_and_paginates() {
        let backend = MemoryBackend::new();
        let s = shard();
        for key in ["i:c", "i:a", "i:b", "other:x"] {
            backend.put(&s, key, b"").await.unwrap();
        }

        let page = backend.list(&s, Some("i:"), None, Some(2)).await.unwrap();
        assert_eq!(page.keys, vec!["i:a", "i:b"]);
        let cursor = page.cursor.expect("more pages expected");

        let page = backend
            .list(&s, Some("i:"), Some(&cursor), Some(2))
            .await
            .unwrap();
        assert_eq!(page.keys, vec!["i:c"]);
        assert!(page.cursor.is_none());
    }

    #[tokio::test]
    async fn test_list_exact_page_boundary_terminates() {
        let backend = MemoryBackend::new();
        let s = shard();
        backend.put(&s, "i:a", b"").await.unwrap();
        backend.put(&s, "i:b", b"").await.unwrap();

        let page = backend.list(&s, Some("i:"), None, Some(2)).await.unwrap();
        assert_eq!(page.keys.len(), 2);
        assert!(page.cursor.is_none());
    }

    #[tokio::test]
    async fn test_delete_batch_counts_existing_only() {
        let backend = MemoryBackend::new();
        let s = shard();
        backend.put(&s, "a", b"").await.unwrap();
        backend.put(&s, "b", b"").await.unwrap();

        let removed = backend
            .delete_batch(&s, &["a".into(), "b".into(), "missing".into()])
            .await
            .unwrap();
        assert_eq!(removed, 2);
    }

    #[tokio::test]
    async fn test_shards_are_disjoint() {
        let backend = MemoryBackend::new();
        backend.put(&Shard::new("s1"), "k", b"1").await.unwrap();
        assert!(backend
            .get(&Shard::new("s2"), "k")
            .await
            .unwrap()
            .is_none());
    }
}
