//! Index shapes over the substrate.
//!
//! All four indexes store membership pointers only — never record data — and
//! are derived projections maintained by the composition layer in
//! [`crate::indexed`]. Each index instance owns a disjoint shard addressed
//! deterministically by entity kind (+ field name, + scope).

mod compound;
mod primary;
mod recency;
mod secondary;

pub use compound::CompoundIndex;
pub use primary::{IdPage, PrimaryIndex};
pub use recency::RecencyIndex;
pub use secondary::SecondaryIndex;
