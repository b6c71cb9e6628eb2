//! Indexed entity composition.
//!
//! Binds one versioned record kind to its primary index and zero-or-more
//! secondary/compound/recency indexes, and keeps them consistent across
//! create, update, delete, soft-delete, restore, and seed bootstrap.
//!
//! ## Consistency Model
//!
//! The substrate offers no multi-key transactions, so every operation here
//! is a saga: the record write happens first, then each index write as an
//! independent step. A failure between steps leaves the record authoritative
//! and the indexes stale — recoverable through [`IndexedEntity::repair_indexes`]
//! or [`IndexedEntity::rebuild_indexes`], never rolled back automatically.

use crate::backend::KvBackend;
use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::index::{CompoundIndex, PrimaryIndex, RecencyIndex, SecondaryIndex};
use crate::record::VersionedRecord;
use campusdb_commons::{now_millis, Document};
use std::sync::Arc;

/// Derives a single-field index value from a document.
///
/// Returning `None` skips indexing for that document (conditional indexes).
pub trait SecondaryIndexDef<D>: Send + Sync {
    /// The indexed field name; also names the index shard.
    fn field(&self) -> &'static str;

    fn value(&self, doc: &D) -> Option<String>;
}

/// Derives an ordered tuple of field values from a document.
pub trait CompoundIndexDef<D>: Send + Sync {
    /// The indexed field names, in key order.
    fn fields(&self) -> &'static [&'static str];

    fn values(&self, doc: &D) -> Option<Vec<String>>;
}

/// Derives the timestamp (and optional scope) a document is recency-indexed
/// under.
pub trait RecencyIndexDef<D>: Send + Sync {
    /// Scope of the index instance this document belongs to; `None` selects
    /// the kind-wide index.
    fn scope(&self, _doc: &D) -> Option<String> {
        None
    }

    /// RFC 3339 timestamp to sort by; `None` skips indexing.
    fn date(&self, doc: &D) -> Option<String>;
}

/// Static per-entity-kind configuration: names, initial state, index
/// definitions, and optional seed records.
pub struct EntityBinding<D> {
    kind: &'static str,
    index_name: &'static str,
    initial: fn(&str) -> D,
    secondary: Vec<Arc<dyn SecondaryIndexDef<D>>>,
    compound: Vec<Arc<dyn CompoundIndexDef<D>>>,
    recency: Vec<Arc<dyn RecencyIndexDef<D>>>,
    seed: Vec<D>,
}

impl<D> EntityBinding<D> {
    /// * `kind` — record kind, names the record shard and key prefix.
    /// * `index_name` — primary index name.
    /// * `initial` — constructor for the state reported while a record is
    ///   absent (version 0).
    pub fn new(kind: &'static str, index_name: &'static str, initial: fn(&str) -> D) -> Self {
        Self {
            kind,
            index_name,
            initial,
            secondary: Vec::new(),
            compound: Vec::new(),
            recency: Vec::new(),
            seed: Vec::new(),
        }
    }

    pub fn with_secondary(mut self, def: Arc<dyn SecondaryIndexDef<D>>) -> Self {
        self.secondary.push(def);
        self
    }

    pub fn with_compound(mut self, def: Arc<dyn CompoundIndexDef<D>>) -> Self {
        self.compound.push(def);
        self
    }

    pub fn with_recency(mut self, def: Arc<dyn RecencyIndexDef<D>>) -> Self {
        self.recency.push(def);
        self
    }

    pub fn with_seed(mut self, seed: Vec<D>) -> Self {
        self.seed = seed;
        self
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn index_name(&self) -> &'static str {
        self.index_name
    }
}

/// One page of documents.
#[derive(Debug, Clone)]
pub struct Page<D> {
    pub items: Vec<D>,
    /// Opaque continuation cursor; `None` when exhausted.
    pub cursor: Option<String>,
}

/// Composition of one record kind with all of its indexes.
pub struct IndexedEntity<D: Document> {
    backend: Arc<dyn KvBackend>,
    binding: Arc<EntityBinding<D>>,
    config: StoreConfig,
}

impl<D: Document> Clone for IndexedEntity<D> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            binding: Arc::clone(&self.binding),
            config: self.config.clone(),
        }
    }
}

impl<D: Document> IndexedEntity<D> {
    pub fn new(backend: Arc<dyn KvBackend>, binding: EntityBinding<D>) -> Self {
        Self {
            backend,
            binding: Arc::new(binding),
            config: StoreConfig::default(),
        }
    }

    pub fn with_config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    pub fn kind(&self) -> &str {
        self.binding.kind
    }

    /// The substrate this entity is bound to.
    pub fn backend(&self) -> &Arc<dyn KvBackend> {
        &self.backend
    }

    /// Opens a record handle for direct versioned access.
    pub fn record(&self, id: &str) -> VersionedRecord<D> {
        VersionedRecord::open(
            Arc::clone(&self.backend),
            self.binding.kind,
            id,
            (self.binding.initial)(id),
        )
    }

    /// Handle on the primary membership index.
    pub fn primary(&self) -> PrimaryIndex {
        PrimaryIndex::with_config(
            Arc::clone(&self.backend),
            self.binding.index_name,
            self.config.clone(),
        )
    }

    /// Handle on one single-field secondary index.
    pub fn secondary(&self, field: &str) -> SecondaryIndex {
        SecondaryIndex::with_config(
            Arc::clone(&self.backend),
            self.binding.kind,
            field,
            self.config.clone(),
        )
    }

    /// Handle on one compound secondary index.
    pub fn compound(&self, fields: &[&str]) -> CompoundIndex {
        CompoundIndex::with_config(
            Arc::clone(&self.backend),
            self.binding.kind,
            fields,
            self.config.clone(),
        )
    }

    /// Handle on the (optionally scoped) recency index.
    pub fn recency(&self, scope: Option<&str>) -> RecencyIndex {
        match scope {
            Some(scope) => RecencyIndex::scoped(Arc::clone(&self.backend), self.binding.kind, scope),
            None => RecencyIndex::new(Arc::clone(&self.backend), self.binding.kind),
        }
    }

    /// Writes every pointer entry derived from `doc`. Idempotent.
    async fn add_pointers(&self, doc: &D) -> Result<()> {
        let id = doc.id();
        for def in &self.binding.secondary {
            if let Some(value) = def.value(doc) {
                self.secondary(def.field()).add(&value, id).await?;
            }
        }
        for def in &self.binding.compound {
            if let Some(values) = def.values(doc) {
                let refs: Vec<&str> = values.iter().map(String::as_str).collect();
                self.compound(def.fields()).add(&refs, id).await?;
            }
        }
        for def in &self.binding.recency {
            if let Some(date) = def.date(doc) {
                self.recency(def.scope(doc).as_deref()).add(&date, id).await?;
            }
        }
        Ok(())
    }

    /// Removes every pointer entry derived from `doc`.
    async fn remove_pointers(&self, doc: &D) -> Result<()> {
        let id = doc.id();
        for def in &self.binding.secondary {
            if let Some(value) = def.value(doc) {
                self.secondary(def.field()).remove(&value, id).await?;
            }
        }
        for def in &self.binding.compound {
            if let Some(values) = def.values(doc) {
                let refs: Vec<&str> = values.iter().map(String::as_str).collect();
                self.compound(def.fields()).remove(&refs, id).await?;
            }
        }
        for def in &self.binding.recency {
            if let Some(date) = def.date(doc) {
                self.recency(def.scope(doc).as_deref())
                    .remove(&date, id)
                    .await?;
            }
        }
        Ok(())
    }

    /// Moves pointer entries whose derived values changed between `old` and
    /// `new`. Unchanged entries are left alone.
    async fn refresh_pointers(&self, old: &D, new: &D) -> Result<()> {
        let id = new.id();
        for def in &self.binding.secondary {
            let old_value = def.value(old);
            let new_value = def.value(new);
            if old_value == new_value {
                continue;
            }
            let index = self.secondary(def.field());
            if let Some(value) = old_value {
                index.remove(&value, id).await?;
            }
            if let Some(value) = new_value {
                index.add(&value, id).await?;
            }
        }
        for def in &self.binding.compound {
            let old_values = def.values(old);
            let new_values = def.values(new);
            if old_values == new_values {
                continue;
            }
            let index = self.compound(def.fields());
            if let Some(values) = old_values {
                let refs: Vec<&str> = values.iter().map(String::as_str).collect();
                index.remove(&refs, id).await?;
            }
            if let Some(values) = new_values {
                let refs: Vec<&str> = values.iter().map(String::as_str).collect();
                index.add(&refs, id).await?;
            }
        }
        for def in &self.binding.recency {
            let old_entry = (def.scope(old), def.date(old));
            let new_entry = (def.scope(new), def.date(new));
            if old_entry == new_entry {
                continue;
            }
            if let (scope, Some(date)) = (&old_entry.0, &old_entry.1) {
                self.recency(scope.as_deref()).remove(date, id).await?;
            }
            if let (scope, Some(date)) = (&new_entry.0, &new_entry.1) {
                self.recency(scope.as_deref()).add(date, id).await?;
            }
        }
        Ok(())
    }

    /// Creates a record, stamping timestamps against the empty prior state,
    /// then seeds the primary index and every configured pointer index.
    /// Fails with `AlreadyExists` on ID collision.
    pub async fn create(&self, mut state: D) -> Result<D> {
        let id = state.id().to_string();
        let now = now_millis();
        if state.created_at().is_none() {
            state.set_created_at(Some(now));
        }
        state.set_updated_at(Some(now));

        let mut record = self.record(&id);
        let stamped = record.create(state).await?;
        self.primary().add(&id).await?;
        self.add_pointers(&stamped).await?;
        Ok(stamped)
    }

    /// Fetches a record by ID, soft-deleted or not.
    pub async fn get(&self, id: &str) -> Result<Option<D>> {
        self.record(id).get().await
    }

    /// Read-modify-write by ID, keeping index membership in sync with the
    /// fields the updater changed. Fails with `NotFound` when absent.
    pub async fn update<F>(&self, id: &str, updater: F) -> Result<D>
    where
        F: Fn(D) -> D,
    {
        let mut record = self.record(id);
        let Some(old) = record.get().await? else {
            return Err(StoreError::NotFound {
                kind: self.binding.kind.to_string(),
                id: id.to_string(),
            });
        };
        let new = record.mutate(updater).await?;
        self.refresh_pointers(&old, &new).await?;
        Ok(new)
    }

    /// Shallow JSON merge by ID, with the same index maintenance as
    /// [`update`](Self::update).
    pub async fn patch(&self, id: &str, partial: serde_json::Value) -> Result<D> {
        let mut record = self.record(id);
        let Some(old) = record.get().await? else {
            return Err(StoreError::NotFound {
                kind: self.binding.kind.to_string(),
                id: id.to_string(),
            });
        };
        let new = record.patch(partial).await?;
        self.refresh_pointers(&old, &new).await?;
        Ok(new)
    }

    /// Physically deletes a record and every index entry derived from the
    /// state read before deletion.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let mut record = self.record(id);
        let Some(state) = record.get().await? else {
            return Ok(false);
        };
        record.delete().await?;
        self.primary().remove(id).await?;
        self.remove_pointers(&state).await?;
        Ok(true)
    }

    /// Deletes several records. Individual failures (e.g. a record vanishing
    /// mid-batch) are logged and skipped; returns the count actually removed.
    pub async fn delete_many(&self, ids: &[String]) -> Result<usize> {
        let mut removed = 0;
        for id in ids {
            match self.delete(id).await {
                Ok(true) => removed += 1,
                Ok(false) => {}
                Err(e) => {
                    log::warn!(
                        "delete of {} '{}' failed mid-batch: {e}",
                        self.binding.kind,
                        id
                    );
                }
            }
        }
        Ok(removed)
    }

    /// Soft-deletes the record and removes it from the primary index and
    /// every pointer index. Returns `false` when absent or already deleted.
    pub async fn soft_delete_with_cleanup(&self, id: &str) -> Result<bool> {
        let mut record = self.record(id);
        let Some(state) = record.get().await? else {
            return Ok(false);
        };
        if !record.soft_delete().await? {
            return Ok(false);
        }
        self.primary().remove(id).await?;
        self.remove_pointers(&state).await?;
        Ok(true)
    }

    /// Restores a soft-deleted record and re-adds it to the primary index
    /// and every pointer index. Returns `false` when absent or not deleted.
    pub async fn restore_with_cleanup(&self, id: &str) -> Result<bool> {
        let mut record = self.record(id);
        if !record.restore().await? {
            return Ok(false);
        }
        let Some(state) = record.get().await? else {
            return Ok(false);
        };
        self.primary().add(id).await?;
        self.add_pointers(&state).await?;
        Ok(true)
    }

    /// Pages through the primary index, fetching each record. Soft-deleted
    /// records are excluded unless `include_deleted`; records that vanish
    /// between the index scan and the fetch are skipped silently.
    pub async fn list(
        &self,
        cursor: Option<&str>,
        limit: Option<usize>,
        include_deleted: bool,
    ) -> Result<Page<D>> {
        let page = self.primary().page(cursor, limit).await?;
        let mut items = Vec::with_capacity(page.ids.len());
        for id in &page.ids {
            match self.get(id).await {
                Ok(Some(doc)) => {
                    if include_deleted || !doc.is_deleted() {
                        items.push(doc);
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    log::debug!("skipping unreadable {} '{id}': {e}", self.binding.kind);
                }
            }
        }
        Ok(Page {
            items,
            cursor: page.cursor,
        })
    }

    fn secondary_def(&self, field: &str) -> Result<&Arc<dyn SecondaryIndexDef<D>>> {
        self.binding
            .secondary
            .iter()
            .find(|d| d.field() == field)
            .ok_or_else(|| StoreError::UnknownIndex {
                kind: self.binding.kind.to_string(),
                field: field.to_string(),
            })
    }

    fn compound_def(&self, fields: &[&str]) -> Result<&Arc<dyn CompoundIndexDef<D>>> {
        self.binding
            .compound
            .iter()
            .find(|d| d.fields() == fields)
            .ok_or_else(|| StoreError::UnknownIndex {
                kind: self.binding.kind.to_string(),
                field: fields.join("+"),
            })
    }

    /// Resolves candidate IDs through the secondary index and fetches each
    /// record, discarding fetch failures and (by default) soft-deleted
    /// records.
    pub async fn get_by_index(
        &self,
        field: &str,
        value: &str,
        include_deleted: bool,
    ) -> Result<Vec<D>> {
        let def = self.secondary_def(field)?;
        let ids = self.secondary(def.field()).ids_for_value(value).await?;
        self.fetch_filtered(&ids, include_deleted).await
    }

    pub async fn count_by_index(&self, field: &str, value: &str) -> Result<usize> {
        let def = self.secondary_def(field)?;
        self.secondary(def.field()).count_for_value(value).await
    }

    pub async fn exists_by_index(&self, field: &str, value: &str) -> Result<bool> {
        let def = self.secondary_def(field)?;
        self.secondary(def.field()).exists_for_value(value).await
    }

    /// Compound-index lookup over an ordered tuple of field values.
    pub async fn get_by_compound(
        &self,
        fields: &[&str],
        values: &[&str],
        include_deleted: bool,
    ) -> Result<Vec<D>> {
        let def = self.compound_def(fields)?;
        let ids = self.compound(def.fields()).ids_for_values(values).await?;
        self.fetch_filtered(&ids, include_deleted).await
    }

    pub async fn exists_by_compound(&self, fields: &[&str], values: &[&str]) -> Result<bool> {
        let def = self.compound_def(fields)?;
        self.compound(def.fields()).exists_for_values(values).await
    }

    async fn fetch_filtered(&self, ids: &[String], include_deleted: bool) -> Result<Vec<D>> {
        let mut items = Vec::with_capacity(ids.len());
        for id in ids {
            match self.get(id).await {
                Ok(Some(doc)) => {
                    if include_deleted || !doc.is_deleted() {
                        items.push(doc);
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    log::debug!("skipping unreadable {} '{id}': {e}", self.binding.kind);
                }
            }
        }
        Ok(items)
    }

    /// Cardinality of the primary index.
    pub async fn count(&self) -> Result<usize> {
        self.primary().count().await
    }

    /// Bootstrap: when the primary index is empty and seed records are
    /// configured, writes every seed record and bulk-adds the primary index
    /// in one pass. Idempotent — a non-empty index makes this a no-op, and
    /// existing records are never overwritten. Returns the number of records
    /// linked into the index.
    pub async fn ensure_seed(&self) -> Result<usize> {
        if self.binding.seed.is_empty() {
            return Ok(0);
        }
        let probe = self.primary().page(None, Some(1)).await?;
        if !probe.ids.is_empty() {
            return Ok(0);
        }

        let mut ids = Vec::with_capacity(self.binding.seed.len());
        for seed in &self.binding.seed {
            let mut state = seed.clone();
            let now = now_millis();
            if state.created_at().is_none() {
                state.set_created_at(Some(now));
            }
            state.set_updated_at(Some(now));

            let mut record = self.record(state.id());
            match record.create(state).await {
                Ok(stamped) => {
                    self.add_pointers(&stamped).await?;
                    ids.push(stamped.id().to_string());
                }
                // Record survived an earlier wipe of the index; relink it.
                Err(StoreError::AlreadyExists { .. }) => ids.push(seed.id().to_string()),
                Err(e) => return Err(e),
            }
        }
        self.primary().add_batch(&ids).await?;
        Ok(ids.len())
    }

    /// Re-derives index membership for one record from its current state:
    /// live records get their primary membership and pointer entries
    /// re-added; soft-deleted records get nothing re-added. Idempotent.
    /// Returns `false` when the record does not exist.
    pub async fn repair_indexes(&self, id: &str) -> Result<bool> {
        let Some(state) = self.get(id).await? else {
            return Ok(false);
        };
        if state.is_deleted() {
            return Ok(true);
        }
        self.primary().add(id).await?;
        self.add_pointers(&state).await?;
        Ok(true)
    }

    /// Walks the primary index and heals drift: membership entries whose
    /// record vanished are dropped, and every live record gets its pointer
    /// entries re-derived. Returns the number of records repaired.
    ///
    /// Pointer entries whose derived value no longer matches any record are
    /// not discovered by this pass; they disappear only through the explicit
    /// delete paths.
    pub async fn rebuild_indexes(&self) -> Result<usize> {
        let ids = self.primary().list().await?;
        let mut repaired = 0;
        for id in ids {
            match self.get(&id).await? {
                Some(state) => {
                    if !state.is_deleted() {
                        self.add_pointers(&state).await?;
                        repaired += 1;
                    }
                }
                None => {
                    log::warn!(
                        "dropping orphaned {} index entry '{id}'",
                        self.binding.kind
                    );
                    self.primary().remove(&id).await?;
                }
            }
        }
        Ok(repaired)
    }
}
