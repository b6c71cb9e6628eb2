//! Webhook delivery entity.

use campusdb_commons::{DeliveryId, Document};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Pending,
    Delivered,
    Failed,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "pending",
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::Failed => "failed",
        }
    }
}

/// One delivery attempt of one event payload to one endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookDelivery {
    pub id: DeliveryId,
    /// Event name, e.g. "grade.recorded".
    pub event: String,
    pub endpoint: String,
    pub status: DeliveryStatus,
    pub attempts: u32,
    /// RFC 3339 completion timestamp, set when the delivery succeeds.
    pub delivered_at: Option<String>,
    pub last_error: Option<String>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
    pub deleted_at: Option<i64>,
}

impl WebhookDelivery {
    pub fn new(id: impl Into<DeliveryId>, event: &str, endpoint: &str) -> Self {
        Self {
            id: id.into(),
            event: event.to_string(),
            endpoint: endpoint.to_string(),
            status: DeliveryStatus::Pending,
            attempts: 0,
            delivered_at: None,
            last_error: None,
            created_at: None,
            updated_at: None,
            deleted_at: None,
        }
    }

    pub(crate) fn blank(id: &str) -> Self {
        Self::new(id, "", "")
    }
}

impl Document for WebhookDelivery {
    fn id(&self) -> &str {
        self.id.as_str()
    }
    fn created_at(&self) -> Option<i64> {
        self.created_at
    }
    fn updated_at(&self) -> Option<i64> {
        self.updated_at
    }
    fn deleted_at(&self) -> Option<i64> {
        self.deleted_at
    }
    fn set_created_at(&mut self, ts: Option<i64>) {
        self.created_at = ts;
    }
    fn set_updated_at(&mut self, ts: Option<i64>) {
        self.updated_at = ts;
    }
    fn set_deleted_at(&mut self, ts: Option<i64>) {
        self.deleted_at = ts;
    }
}
