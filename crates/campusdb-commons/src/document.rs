//! Document contract for stored entities.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Contract implemented by every entity persisted through the store.
///
/// A document always carries its own identifier; the lifecycle timestamps are
/// stamped by the store on create/update and read back for soft-delete
/// filtering. All timestamps are Unix milliseconds.
///
/// Implementations should treat the setters as store-internal plumbing:
/// application code never stamps timestamps itself.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The record identifier, unique within the entity kind.
    fn id(&self) -> &str;

    /// Creation timestamp, present once the record has been written.
    fn created_at(&self) -> Option<i64>;

    /// Last-modification timestamp.
    fn updated_at(&self) -> Option<i64>;

    /// Soft-delete timestamp; `Some` marks the record logically deleted.
    fn deleted_at(&self) -> Option<i64>;

    fn set_created_at(&mut self, ts: Option<i64>);

    fn set_updated_at(&mut self, ts: Option<i64>);

    fn set_deleted_at(&mut self, ts: Option<i64>);

    /// Whether the record is soft-deleted.
    fn is_deleted(&self) -> bool {
        self.deleted_at().is_some()
    }
}
