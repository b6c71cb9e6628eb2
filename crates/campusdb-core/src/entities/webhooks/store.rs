//! Webhook delivery store.

use super::indexes::webhooks_binding;
use super::model::{DeliveryStatus, WebhookDelivery};
use crate::error::Result;
use campusdb_commons::DeliveryId;
use campusdb_store::{IndexedEntity, KvBackend, Page};
use std::sync::Arc;

/// Store surface for webhook delivery bookkeeping.
pub struct WebhookStore {
    entity: IndexedEntity<WebhookDelivery>,
}

impl WebhookStore {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self {
            entity: IndexedEntity::new(backend, webhooks_binding()),
        }
    }

    /// Records a new pending delivery.
    pub async fn enqueue(&self, delivery: WebhookDelivery) -> Result<WebhookDelivery> {
        Ok(self.entity.create(delivery).await?)
    }

    pub async fn get(&self, id: &DeliveryId) -> Result<Option<WebhookDelivery>> {
        Ok(self.entity.get(id.as_str()).await?)
    }

    /// Marks a delivery completed, stamping the completion timestamp that
    /// feeds the recency index.
    pub async fn mark_delivered(&self, id: &DeliveryId) -> Result<WebhookDelivery> {
        let delivered_at = chrono::Utc::now().to_rfc3339();
        Ok(self
            .entity
            .update(id.as_str(), move |mut delivery| {
                delivery.status = DeliveryStatus::Delivered;
                delivery.attempts += 1;
                delivery.delivered_at = Some(delivered_at.clone());
                delivery.last_error = None;
                delivery
            })
            .await?)
    }

    /// Records a failed attempt, keeping the delivery out of the recency
    /// index.
    pub async fn mark_failed(&self, id: &DeliveryId, error: &str) -> Result<WebhookDelivery> {
        let error = error.to_string();
        let delivery = self
            .entity
            .update(id.as_str(), move |mut delivery| {
                delivery.status = DeliveryStatus::Failed;
                delivery.attempts += 1;
                delivery.last_error = Some(error.clone());
                delivery
            })
            .await?;
        log::warn!(
            "webhook delivery {} to {} failed (attempt {}): {}",
            delivery.id,
            delivery.endpoint,
            delivery.attempts,
            delivery.last_error.as_deref().unwrap_or("unknown")
        );
        Ok(delivery)
    }

    pub async fn for_event(&self, event: &str) -> Result<Vec<WebhookDelivery>> {
        Ok(self.entity.get_by_index("event", event, false).await?)
    }

    /// Pending and failed deliveries a retry sweep should pick up.
    pub async fn needing_retry(&self) -> Result<Vec<WebhookDelivery>> {
        let mut out = self
            .entity
            .get_by_index("status", DeliveryStatus::Pending.as_str(), false)
            .await?;
        out.extend(
            self.entity
                .get_by_index("status", DeliveryStatus::Failed.as_str(), false)
                .await?,
        );
        Ok(out)
    }

    /// Most recently completed deliveries, newest first.
    pub async fn recent_deliveries(&self, limit: usize) -> Result<Vec<WebhookDelivery>> {
        let ids = self.entity.recency(None).recent(limit).await?;
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(delivery) = self.entity.get(&id).await? {
                if delivery.deleted_at.is_none() {
                    out.push(delivery);
                }
            }
        }
        Ok(out)
    }

    pub async fn list(
        &self,
        cursor: Option<&str>,
        limit: Option<usize>,
        include_deleted: bool,
    ) -> Result<Page<WebhookDelivery>> {
        Ok(self.entity.list(cursor, limit, include_deleted).await?)
    }

    pub async fn delete(&self, id: &DeliveryId) -> Result<bool> {
        Ok(self.entity.delete(id.as_str()).await?)
    }

    /// Prunes a batch of delivery records, e.g. after a retention sweep.
    pub async fn delete_many(&self, ids: &[DeliveryId]) -> Result<usize> {
        let ids: Vec<String> = ids.iter().map(|id| id.as_str().to_string()).collect();
        Ok(self.entity.delete_many(&ids).await?)
    }

    pub async fn count(&self) -> Result<usize> {
        Ok(self.entity.count().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campusdb_store::test_utils::memory_backend;

    #[tokio::test]
    async fn test_delivery_lifecycle_moves_status_buckets() {
        let store = WebhookStore::new(memory_backend());
        store
            .enqueue(WebhookDelivery::new("d1", "grade.recorded", "https://sis.test/hook"))
            .await
            .unwrap();

        assert_eq!(store.needing_retry().await.unwrap().len(), 1);

        let delivered = store.mark_delivered(&DeliveryId::new("d1")).await.unwrap();
        assert_eq!(delivered.status, DeliveryStatus::Delivered);
        assert_eq!(delivered.attempts, 1);
        assert!(delivered.delivered_at.is_some());

        assert!(store.needing_retry().await.unwrap().is_empty());
        assert_eq!(store.recent_deliveries(5).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_delivery_keeps_out_of_recency() {
        let store = WebhookStore::new(memory_backend());
        store
            .enqueue(WebhookDelivery::new("d1", "grade.recorded", "https://sis.test/hook"))
            .await
            .unwrap();

        let failed = store
            .mark_failed(&DeliveryId::new("d1"), "503 from endpoint")
            .await
            .unwrap();
        assert_eq!(failed.status, DeliveryStatus::Failed);
        assert_eq!(failed.last_error.as_deref(), Some("503 from endpoint"));

        assert!(store.recent_deliveries(5).await.unwrap().is_empty());
        assert_eq!(store.needing_retry().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_event_lookup_and_pruning() {
        let store = WebhookStore::new(memory_backend());
        for id in ["d1", "d2"] {
            store
                .enqueue(WebhookDelivery::new(id, "user.created", "https://sis.test/hook"))
                .await
                .unwrap();
        }
        store
            .enqueue(WebhookDelivery::new("d3", "grade.recorded", "https://sis.test/hook"))
            .await
            .unwrap();

        assert_eq!(store.for_event("user.created").await.unwrap().len(), 2);

        let pruned = store
            .delete_many(&[DeliveryId::new("d1"), DeliveryId::new("d2"), DeliveryId::new("dx")])
            .await
            .unwrap();
        assert_eq!(pruned, 2);
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
