//! # campusdb-store
//!
//! Versioned document storage for CampusDB. This crate isolates every direct
//! interaction with the key-value substrate, allowing campusdb-core to stay
//! free of storage details.
//!
//! ## Architecture
//!
//! ```text
//! campusdb-core (entity bindings)
//!     ↓
//! IndexedEntity<D>          ← record + index composition (indexed.rs)
//!     ↓
//! VersionedRecord<D>        ← optimistic-concurrency document writes (record.rs)
//! PrimaryIndex / SecondaryIndex / CompoundIndex / RecencyIndex (index/)
//!     ↓
//! KvBackend                 ← substrate contract (backend.rs)
//!     ↓
//! MemoryBackend / external  ← actual storage implementation
//! ```
//!
//! ## Substrate Contract
//!
//! The substrate only guarantees atomicity for a single compare-and-set and
//! lexicographically ordered prefix scans. Everything above it — record
//! versioning, index membership, soft-delete filtering — is built from those
//! two primitives. There are no cross-key transactions: a record write and
//! its index writes are independent steps, and a failure in between leaves a
//! recoverable, index-inconsistent state that [`IndexedEntity::repair_indexes`]
//! can heal on demand.

pub mod backend;
pub mod config;
pub mod error;
pub mod index;
pub mod indexed;
pub mod key_encoding;
pub mod memory;
pub mod record;
pub mod test_utils;

pub use backend::{CasOutcome, KvBackend, ListPage, Shard, Versioned};
pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use index::{CompoundIndex, IdPage, PrimaryIndex, RecencyIndex, SecondaryIndex};
pub use indexed::{
    CompoundIndexDef, EntityBinding, IndexedEntity, Page, RecencyIndexDef, SecondaryIndexDef,
};
pub use memory::MemoryBackend;
pub use record::{VersionedRecord, WRITE_RETRY_ATTEMPTS};

// Re-export the document contract so dependents need a single import path.
pub use campusdb_commons::Document;
