//! Grades index definitions.

use super::model::Grade;
use campusdb_store::{CompoundIndexDef, EntityBinding, RecencyIndexDef, SecondaryIndexDef};
use std::sync::Arc;

/// A student's grade sheet.
pub struct GradeStudentIndex;

impl SecondaryIndexDef<Grade> for GradeStudentIndex {
    fn field(&self) -> &'static str {
        "student_id"
    }

    fn value(&self, grade: &Grade) -> Option<String> {
        Some(grade.student_id.as_str().to_string())
    }
}

/// A course's grade book.
pub struct GradeCourseIndex;

impl SecondaryIndexDef<Grade> for GradeCourseIndex {
    fn field(&self) -> &'static str {
        "course_id"
    }

    fn value(&self, grade: &Grade) -> Option<String> {
        Some(grade.course_id.as_str().to_string())
    }
}

/// One grade per (student, course) pair.
pub struct GradePairIndex;

impl CompoundIndexDef<Grade> for GradePairIndex {
    fn fields(&self) -> &'static [&'static str] {
        &["student_id", "course_id"]
    }

    fn values(&self, grade: &Grade) -> Option<Vec<String>> {
        Some(vec![
            grade.student_id.as_str().to_string(),
            grade.course_id.as_str().to_string(),
        ])
    }
}

/// Most-recently-graded ordering across the whole kind.
pub struct GradeRecencyIndex;

impl RecencyIndexDef<Grade> for GradeRecencyIndex {
    fn date(&self, grade: &Grade) -> Option<String> {
        if grade.graded_at.is_empty() {
            None
        } else {
            Some(grade.graded_at.clone())
        }
    }
}

pub fn grades_binding() -> EntityBinding<Grade> {
    EntityBinding::new("grade", "grades", Grade::blank)
        .with_secondary(Arc::new(GradeStudentIndex))
        .with_secondary(Arc::new(GradeCourseIndex))
        .with_compound(Arc::new(GradePairIndex))
        .with_recency(Arc::new(GradeRecencyIndex))
}
