//! Grade entity.

use campusdb_commons::{CourseId, Document, GradeId, UserId};
use serde::{Deserialize, Serialize};

/// One grade awarded to one student in one course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    pub id: GradeId,
    pub student_id: UserId,
    pub course_id: CourseId,
    /// Score on a 0–100 scale.
    pub score: f64,
    /// RFC 3339 timestamp of when the grade was awarded; drives the recency
    /// index, so it must be retained to remove the entry later.
    pub graded_at: String,
    pub comment: Option<String>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
    pub deleted_at: Option<i64>,
}

impl Grade {
    pub fn new(
        id: impl Into<GradeId>,
        student_id: impl Into<UserId>,
        course_id: impl Into<CourseId>,
        score: f64,
        graded_at: &str,
    ) -> Self {
        Self {
            id: id.into(),
            student_id: student_id.into(),
            course_id: course_id.into(),
            score,
            graded_at: graded_at.to_string(),
            comment: None,
            created_at: None,
            updated_at: None,
            deleted_at: None,
        }
    }

    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = Some(comment.to_string());
        self
    }

    pub(crate) fn blank(id: &str) -> Self {
        Self::new(id, "", "", 0.0, "")
    }
}

impl Document for Grade {
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
