//! Webhook delivery index definitions.

use super::model::{DeliveryStatus, WebhookDelivery};
use campusdb_store::{EntityBinding, RecencyIndexDef, SecondaryIndexDef};
use std::sync::Arc;

/// Deliveries of one event name.
pub struct DeliveryEventIndex;

impl SecondaryIndexDef<WebhookDelivery> for DeliveryEventIndex {
    fn field(&self) -> &'static str {
        "event"
    }

    fn value(&self, delivery: &WebhookDelivery) -> Option<String> {
        Some(delivery.event.clone())
    }
}

/// Deliveries by status, for retry sweeps over pending/failed entries.
pub struct DeliveryStatusIndex;

impl SecondaryIndexDef<WebhookDelivery> for DeliveryStatusIndex {
    fn field(&self) -> &'static str {
        "status"
    }

    fn value(&self, delivery: &WebhookDelivery) -> Option<String> {
        Some(delivery.status.as_str().to_string())
    }
}

/// Completed deliveries, newest first. Pending and failed deliveries carry
/// no completion timestamp and are not indexed here.
pub struct DeliveryRecencyIndex;

impl RecencyIndexDef<WebhookDelivery> for DeliveryRecencyIndex {
    fn date(&self, delivery: &WebhookDelivery) -> Option<String> {
        match delivery.status {
            DeliveryStatus::Delivered => delivery.delivered_at.clone(),
            _ => None,
        }
    }
}

pub fn webhooks_binding() -> EntityBinding<WebhookDelivery> {
    EntityBinding::new("webhook_delivery", "webhook_deliveries", WebhookDelivery::blank)
        .with_secondary(Arc::new(DeliveryEventIndex))
        .with_secondary(Arc::new(DeliveryStatusIndex))
        .with_recency(Arc::new(DeliveryRecencyIndex))
}
