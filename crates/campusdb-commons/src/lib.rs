//! # campusdb-commons
//!
//! Shared types for CampusDB.
//!
//! This crate provides foundational types used across the CampusDB crates
//! (campusdb-store, campusdb-core). It carries no storage logic of its own,
//! which keeps the dependency graph acyclic.
//!
//! ## Type-Safe Wrappers
//!
//! The crate provides type-safe wrappers for common identifiers:
//! - `UserId`: User identifier wrapper
//! - `ClassId`: Class identifier wrapper
//! - `CourseId`: Course identifier wrapper
//! - `GradeId`: Grade identifier wrapper
//! - `AnnouncementId`: Announcement identifier wrapper
//! - `DeliveryId`: Webhook delivery identifier wrapper
//!
//! ## Document Contract
//!
//! Every entity persisted through campusdb-store implements the [`Document`]
//! trait, which exposes the record identifier and the lifecycle timestamps
//! (`created_at`, `updated_at`, `deleted_at`, all Unix milliseconds) that the
//! store stamps and filters on.

pub mod document;
pub mod ids;
pub mod role;

pub use document::Document;
pub use ids::{AnnouncementId, ClassId, CourseId, DeliveryId, GradeId, UserId};
pub use role::Role;

/// Current time as Unix milliseconds, the timestamp convention used by every
/// stored document.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
