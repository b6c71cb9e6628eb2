//! Announcements index definitions.

use super::model::Announcement;
use campusdb_store::{EntityBinding, RecencyIndexDef, SecondaryIndexDef};
use std::sync::Arc;

/// All announcements of one class (unordered membership).
pub struct AnnouncementClassIndex;

impl SecondaryIndexDef<Announcement> for AnnouncementClassIndex {
    fn field(&self) -> &'static str {
        "class_id"
    }

    fn value(&self, announcement: &Announcement) -> Option<String> {
        Some(announcement.class_id.as_str().to_string())
    }
}

/// Newest-first feed per class: the recency index instance is scoped by the
/// announcement's class.
pub struct AnnouncementFeedIndex;

impl RecencyIndexDef<Announcement> for AnnouncementFeedIndex {
    fn scope(&self, announcement: &Announcement) -> Option<String> {
        Some(announcement.class_id.as_str().to_string())
    }

    fn date(&self, announcement: &Announcement) -> Option<String> {
        if announcement.published_at.is_empty() {
            None
        } else {
            Some(announcement.published_at.clone())
        }
    }
}

pub fn announcements_binding() -> EntityBinding<Announcement> {
    EntityBinding::new("announcement", "announcements", Announcement::blank)
        .with_secondary(Arc::new(AnnouncementClassIndex))
        .with_recency(Arc::new(AnnouncementFeedIndex))
}
