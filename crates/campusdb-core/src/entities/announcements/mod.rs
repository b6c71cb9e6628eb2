//! Announcements entity.
//!
//! Announcements are published into one class and read back as a
//! newest-first feed, so the recency index here is class-scoped: each class
//! owns its own `recency:announcement:{class}` shard.

mod indexes;
mod model;
mod store;

pub use indexes::announcements_binding;
pub use model::Announcement;
pub use store::AnnouncementStore;
