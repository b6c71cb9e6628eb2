//! Versioned document records with optimistic concurrency control.
//!
//! A [`VersionedRecord`] wraps one logical JSON document stored at
//! `{kind}:{id}` inside the kind's record shard. Every successful write
//! advances the stored version by exactly 1; a write issued against a stale
//! version is rejected by the substrate's compare-and-set and retried from a
//! fresh read, up to [`WRITE_RETRY_ATTEMPTS`] times. No write is ever
//! partially applied.

use crate::backend::{CasOutcome, KvBackend, Shard};
use crate::error::{Result, StoreError};
use crate::key_encoding::record_key;
use campusdb_commons::{now_millis, Document};
use std::sync::Arc;

/// Bounded retry count for optimistic writes. When compare-and-set conflicts
/// on every attempt, the operation fails with
/// [`StoreError::ConcurrentModification`] after exactly this many attempts.
pub const WRITE_RETRY_ATTEMPTS: u32 = 4;

/// One versioned document.
///
/// The struct tracks the last version it observed locally; the substrate's
/// per-key compare-and-set is the only mutual exclusion involved.
pub struct VersionedRecord<D: Document> {
    backend: Arc<dyn KvBackend>,
    shard: Shard,
    key: String,
    kind: String,
    id: String,
    initial: D,
    version: u64,
}

impl<D: Document> VersionedRecord<D> {
    /// Opens a record handle. Nothing is read or written until the first
    /// operation; `initial` is the state [`read`](Self::read) reports while
    /// the key is absent.
    pub fn open(backend: Arc<dyn KvBackend>, kind: &str, id: &str, initial: D) -> Self {
        Self {
            backend,
            shard: Shard::records(kind),
            key: record_key(kind, id),
            kind: kind.to_string(),
            id: id.to_string(),
            initial,
            version: 0,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The record key, `{kind}:{id}`.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Last version observed by this handle (0 before the first read/write).
    pub fn version(&self) -> u64 {
        self.version
    }

    fn encode(state: &D) -> Result<Vec<u8>> {
        serde_json::to_vec(state).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn decode(&self, data: &[u8]) -> Result<D> {
        serde_json::from_slice(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Fetches the stored document, refreshing the locally tracked version.
    async fn load(&mut self) -> Result<Option<D>> {
        match self.backend.get(&self.shard, &self.key).await? {
            Some(versioned) => {
                let state = self.decode(&versioned.data)?;
                self.version = versioned.version;
                Ok(Some(state))
            }
            None => {
                self.version = 0;
                Ok(None)
            }
        }
    }

    /// Current state, or the initial state (version 0) when the key is
    /// absent. Never writes.
    pub async fn read(&mut self) -> Result<D> {
        match self.load().await? {
            Some(state) => Ok(state),
            None => Ok(self.initial.clone()),
        }
    }

    /// Stored state, `None` when the key is absent.
    pub async fn get(&mut self) -> Result<Option<D>> {
        self.load().await
    }

    pub async fn exists(&self) -> Result<bool> {
        Ok(self.backend.get(&self.shard, &self.key).await?.is_some())
    }

    /// First write of a record: a single compare-and-set from version 0.
    ///
    /// There is deliberately no retry here — a conflict means the ID is
    /// already taken, which surfaces as [`StoreError::AlreadyExists`].
    pub async fn create(&mut self, state: D) -> Result<D> {
        let value = Self::encode(&state)?;
        match self
            .backend
            .compare_and_set(&self.shard, &self.key, 0, &value)
            .await?
        {
            CasOutcome::Applied { version } => {
                self.version = version;
                Ok(state)
            }
            CasOutcome::Conflict { .. } => Err(StoreError::AlreadyExists {
                kind: self.kind.clone(),
                id: self.id.clone(),
            }),
        }
    }

    /// Writes `state`, retrying from a fresh read on version conflicts.
    pub async fn write(&mut self, state: D) -> Result<D> {
        let value = Self::encode(&state)?;
        for attempt in 1..=WRITE_RETRY_ATTEMPTS {
            match self
                .backend
                .compare_and_set(&self.shard, &self.key, self.version, &value)
                .await?
            {
                CasOutcome::Applied { version } => {
                    self.version = version;
                    return Ok(state);
                }
                CasOutcome::Conflict { current_version } => {
                    log::debug!(
                        "write conflict on {} (attempt {attempt}, stored version {current_version})",
                        self.key
                    );
                    self.load().await?;
                }
            }
        }
        Err(StoreError::ConcurrentModification {
            key: self.key.clone(),
            attempts: WRITE_RETRY_ATTEMPTS,
        })
    }

    /// Read-modify-write cycle. The updater is re-applied to a freshly read
    /// state on every attempt, so it must be a pure function of the current
    /// state rather than a closed-over snapshot.
    ///
    /// Stamps `updated_at` with the current time and preserves `created_at`
    /// from the prior state (defaulting to now when absent).
    pub async fn mutate<F>(&mut self, updater: F) -> Result<D>
    where
        F: Fn(D) -> D,
    {
        for attempt in 1..=WRITE_RETRY_ATTEMPTS {
            let current = match self.load().await? {
                Some(state) => state,
                None => self.initial.clone(),
            };
            let prior_created = current.created_at();
            let mut next = updater(current);
            let now = now_millis();
            next.set_created_at(Some(prior_created.unwrap_or(now)));
            next.set_updated_at(Some(now));

            let value = Self::encode(&next)?;
            match self
                .backend
                .compare_and_set(&self.shard, &self.key, self.version, &value)
                .await?
            {
                CasOutcome::Applied { version } => {
                    self.version = version;
                    return Ok(next);
                }
                CasOutcome::Conflict { current_version } => {
                    log::debug!(
                        "mutate conflict on {} (attempt {attempt}, stored version {current_version})",
                        self.key
                    );
                }
            }
        }
        Err(StoreError::ConcurrentModification {
            key: self.key.clone(),
            attempts: WRITE_RETRY_ATTEMPTS,
        })
    }

    /// Shallow-merges the fields of a JSON object into the current state.
    /// Sugar over [`mutate`](Self::mutate).
    pub async fn patch(&mut self, partial: serde_json::Value) -> Result<D> {
        for attempt in 1..=WRITE_RETRY_ATTEMPTS {
            let current = match self.load().await? {
                Some(state) => state,
                None => self.initial.clone(),
            };
            let prior_created = current.created_at();
            let mut next = merge_partial(current, &partial)?;
            let now = now_millis();
            next.set_created_at(Some(prior_created.unwrap_or(now)));
            next.set_updated_at(Some(now));

            let value = Self::encode(&next)?;
            match self
                .backend
                .compare_and_set(&self.shard, &self.key, self.version, &value)
                .await?
            {
                CasOutcome::Applied { version } => {
                    self.version = version;
                    return Ok(next);
                }
                CasOutcome::Conflict { .. } => {
                    log::debug!("patch conflict on {} (attempt {attempt})", self.key);
                }
            }
        }
        Err(StoreError::ConcurrentModification {
            key: self.key.clone(),
            attempts: WRITE_RETRY_ATTEMPTS,
        })
    }

    /// Marks the record soft-deleted. Returns `false` without writing when
    /// the record is absent or already soft-deleted.
    pub async fn soft_delete(&mut self) -> Result<bool> {
        for _ in 1..=WRITE_RETRY_ATTEMPTS {
            let Some(current) = self.load().await? else {
                return Ok(false);
            };
            if current.is_deleted() {
                return Ok(false);
            }
            let mut next = current;
            let now = now_millis();
            next.set_deleted_at(Some(now));
            next.set_updated_at(Some(now));

            let value = Self::encode(&next)?;
            if let CasOutcome::Applied { version } = self
                .backend
                .compare_and_set(&self.shard, &self.key, self.version, &value)
                .await?
            {
                self.version = version;
                return Ok(true);
            }
        }
        Err(StoreError::ConcurrentModification {
            key: self.key.clone(),
            attempts: WRITE_RETRY_ATTEMPTS,
        })
    }

    /// Clears the soft-delete mark. Returns `false` without writing when the
    /// record is absent or not currently soft-deleted.
    pub async fn restore(&mut self) -> Result<bool> {
        for _ in 1..=WRITE_RETRY_ATTEMPTS {
            let Some(current) = self.load().await? else {
                return Ok(false);
            };
            if !current.is_deleted() {
                return Ok(false);
            }
            let mut next = current;
            next.set_deleted_at(None);
            next.set_updated_at(Some(now_millis()));

            let value = Self::encode(&next)?;
            if let CasOutcome::Applied { version } = self
                .backend
                .compare_and_set(&self.shard, &self.key, self.version, &value)
                .await?
            {
                self.version = version;
                return Ok(true);
            }
        }
        Err(StoreError::ConcurrentModification {
            key: self.key.clone(),
            attempts: WRITE_RETRY_ATTEMPTS,
        })
    }

    /// Unconditional physical removal. Resets the local version to 0.
    pub async fn delete(&mut self) -> Result<bool> {
        let existed = self.backend.delete(&self.shard, &self.key).await?;
        self.version = 0;
        Ok(existed)
    }
}

/// Shallow JSON-object merge: every top-level field of `partial` replaces
/// the corresponding field of `state`.
fn merge_partial<D: Document>(state: D, partial: &serde_json::Value) -> Result<D> {
    let mut value =
        serde_json::to_value(&state).map_err(|e| StoreError::Serialization(e.to_string()))?;
    match (value.as_object_mut(), partial.as_object()) {
        (Some(obj), Some(patch)) => {
            for (field, v) in patch {
                obj.insert(field.clone(), v.clone());
            }
        }
        _ => {
            return Err(StoreError::Serialization(
                "patch requires JSON objects on both sides".to_string(),
            ))
        }
    }
    serde_json::from_value(value).map_err(|e| StoreError::Serialization(e.to_string()))
}
