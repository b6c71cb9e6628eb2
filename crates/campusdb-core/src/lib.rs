//! # campusdb-core
//!
//! Entity bindings for the school-administration domain, built on the
//! generic record/index machinery in campusdb-store.
//!
//! Each entity (users, classes, courses, grades, announcements, webhook
//! deliveries) gets a model, its index definitions, and a store wrapper that
//! exposes the surface route handlers consume: create, list, lookups by
//! secondary index, delete/soft-delete/restore with index cleanup, counts,
//! and idempotent seed bootstrap. All stores share one `Arc<dyn KvBackend>`
//! handed in by the embedder.

pub mod entities;
pub mod error;

pub use entities::announcements::AnnouncementStore;
pub use entities::classes::ClassStore;
pub use entities::courses::CourseStore;
pub use entities::grades::GradeStore;
pub use entities::users::UserStore;
pub use entities::webhooks::{CircuitBreaker, WebhookStore};
pub use error::{CoreError, Result};
