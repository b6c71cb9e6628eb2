//! Announcements store.

use super::indexes::announcements_binding;
use super::model::Announcement;
use crate::error::Result;
use campusdb_commons::{AnnouncementId, ClassId};
use campusdb_store::key_encoding::epoch_millis;
use campusdb_store::{IndexedEntity, KvBackend, Page};
use std::sync::Arc;

/// Store surface for the announcements entity.
pub struct AnnouncementStore {
    entity: IndexedEntity<Announcement>,
}

impl AnnouncementStore {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self {
            entity: IndexedEntity::new(backend, announcements_binding()),
        }
    }

    /// Publishes an announcement into its class feed. The publication
    /// timestamp is validated before anything is written.
    pub async fn publish(&self, announcement: Announcement) -> Result<Announcement> {
        epoch_millis(&announcement.published_at)?;
        Ok(self.entity.create(announcement).await?)
    }

    pub async fn get(&self, id: &AnnouncementId) -> Result<Option<Announcement>> {
        Ok(self.entity.get(id.as_str()).await?)
    }

    /// The `limit` most recent announcements of one class, newest first,
    /// resolved through the class-scoped recency index with a bounded scan.
    pub async fn feed(&self, class_id: &ClassId, limit: usize) -> Result<Vec<Announcement>> {
        let ids = self
            .entity
            .recency(Some(class_id.as_str()))
            .recent(limit)
            .await?;
        let mut items = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(a) = self.entity.get(&id).await? {
                if a.deleted_at.is_none() {
                    items.push(a);
                }
            }
        }
        Ok(items)
    }

    /// Unordered membership lookup for one class.
    pub async fn for_class(&self, class_id: &ClassId) -> Result<Vec<Announcement>> {
        Ok(self
            .entity
            .get_by_index("class_id", class_id.as_str(), false)
            .await?)
    }

    pub async fn list(
        &self,
        cursor: Option<&str>,
        limit: Option<usize>,
        include_deleted: bool,
    ) -> Result<Page<Announcement>> {
        Ok(self.entity.list(cursor, limit, include_deleted).await?)
    }

    /// Retracts an announcement: soft-deletes the record and drops it from
    /// the class membership and feed indexes.
    pub async fn retract(&self, id: &AnnouncementId) -> Result<bool> {
        Ok(self.entity.soft_delete_with_cleanup(id.as_str()).await?)
    }

    pub async fn republish(&self, id: &AnnouncementId) -> Result<bool> {
        Ok(self.entity.restore_with_cleanup(id.as_str()).await?)
    }

    pub async fn delete(&self, id: &AnnouncementId) -> Result<bool> {
        Ok(self.entity.delete(id.as_str()).await?)
    }

    pub async fn count(&self) -> Result<usize> {
        Ok(self.entity.count().await?)
    }
}
