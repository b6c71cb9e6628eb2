//! Announcement entity.

use campusdb_commons::{AnnouncementId, ClassId, Document, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: AnnouncementId,
    pub class_id: ClassId,
    pub author_id: UserId,
    pub title: String,
    pub body: String,
    /// RFC 3339 publication timestamp; drives the class-scoped feed order.
    pub published_at: String,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
    pub deleted_at: Option<i64>,
}

impl Announcement {
    pub fn new(
        id: impl Into<AnnouncementId>,
        class_id: impl Into<ClassId>,
        author_id: impl Into<UserId>,
        title: &str,
        published_at: &str,
    ) -> Self {
        Self {
            id: id.into(),
            class_id: class_id.into(),
            author_id: author_id.into(),
            title: title.to_string(),
            body: String::new(),
            published_at: published_at.to_string(),
            created_at: None,
            updated_at: None,
            deleted_at: None,
        }
    }

    pub fn with_body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }

    pub(crate) fn blank(id: &str) -> Self {
        Self::new(id, "", "", "", "")
    }
}

impl Document for Announcement {
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
