//! Grades store.

use super::indexes::grades_binding;
use super::model::Grade;
use crate::error::{CoreError, Result};
use campusdb_commons::{CourseId, GradeId, UserId};
use campusdb_store::key_encoding::epoch_millis;
use campusdb_store::{IndexedEntity, KvBackend, Page};
use std::sync::Arc;

/// Store surface for the grades entity.
pub struct GradeStore {
    entity: IndexedEntity<Grade>,
}

impl GradeStore {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self {
            entity: IndexedEntity::new(backend, grades_binding()),
        }
    }

    /// Records a grade. The (student, course) pair must not already hold a
    /// live grade, and `graded_at` is validated before anything is written
    /// so the recency step cannot fail a half-applied create.
    pub async fn record(&self, grade: Grade) -> Result<Grade> {
        epoch_millis(&grade.graded_at)?;
        if self
            .entity
            .exists_by_compound(
                &["student_id", "course_id"],
                &[grade.student_id.as_str(), grade.course_id.as_str()],
            )
            .await?
        {
            return Err(CoreError::AlreadyExists(format!(
                "grade for student '{}' in course '{}'",
                grade.student_id, grade.course_id
            )));
        }
        Ok(self.entity.create(grade).await?)
    }

    pub async fn get(&self, id: &GradeId) -> Result<Option<Grade>> {
        Ok(self.entity.get(id.as_str()).await?)
    }

    pub async fn for_student(&self, student_id: &UserId) -> Result<Vec<Grade>> {
        Ok(self
            .entity
            .get_by_index("student_id", student_id.as_str(), false)
            .await?)
    }

    pub async fn for_course(&self, course_id: &CourseId) -> Result<Vec<Grade>> {
        Ok(self
            .entity
            .get_by_index("course_id", course_id.as_str(), false)
            .await?)
    }

    /// The student's grade in one course, resolved through the compound
    /// index.
    pub async fn for_pair(
        &self,
        student_id: &UserId,
        course_id: &CourseId,
    ) -> Result<Option<Grade>> {
        let matches = self
            .entity
            .get_by_compound(
                &["student_id", "course_id"],
                &[student_id.as_str(), course_id.as_str()],
                false,
            )
            .await?;
        Ok(matches.into_iter().next())
    }

    /// Most recently graded records, newest first.
    pub async fn recently_graded(&self, limit: usize) -> Result<Vec<Grade>> {
        let ids = self.entity.recency(None).recent(limit).await?;
        let mut grades = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(grade) = self.entity.get(&id).await? {
                if grade.deleted_at.is_none() {
                    grades.push(grade);
                }
            }
        }
        Ok(grades)
    }

    /// Corrects a score, stamping `updated_at`.
    pub async fn rescore(&self, id: &GradeId, score: f64) -> Result<Grade> {
        Ok(self
            .entity
            .update(id.as_str(), move |mut grade| {
                grade.score = score;
                grade
            })
            .await?)
    }

    pub async fn list(
        &self,
        cursor: Option<&str>,
        limit: Option<usize>,
        include_deleted: bool,
    ) -> Result<Page<Grade>> {
        Ok(self.entity.list(cursor, limit, include_deleted).await?)
    }

    /// Removes the grade from the record shard and every index —
    /// student, course, pair, and recency — in one pass.
    pub async fn delete(&self, id: &GradeId) -> Result<bool> {
        Ok(self.entity.delete(id.as_str()).await?)
    }

    pub async fn delete_many(&self, ids: &[GradeId]) -> Result<usize> {
        let ids: Vec<String> = ids.iter().map(|id| id.as_str().to_string()).collect();
        Ok(self.entity.delete_many(&ids).await?)
    }

    pub async fn count(&self) -> Result<usize> {
        Ok(self.entity.count().await?)
    }

    pub async fn count_for_course(&self, course_id: &CourseId) -> Result<usize> {
        Ok(self
            .entity
            .count_by_index("course_id", course_id.as_str())
            .await?)
    }

    /// Explicit maintenance entry point for healing index drift.
    pub async fn rebuild_indexes(&self) -> Result<usize> {
        Ok(self.entity.rebuild_indexes().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campusdb_store::test_utils::memory_backend;
    use campusdb_store::StoreError;

    fn grade(id: &str, student: &str, course: &str, score: f64, graded_at: &str) -> Grade {
        Grade::new(id, student, course, score, graded_at)
    }

    #[tokio::test]
    async fn test_record_and_lookup_by_student() {
        let grades = GradeStore::new(memory_backend());
        grades
            .record(grade("g1", "s1", "c1", 95.0, "2026-03-01T10:00:00Z"))
            .await
            .unwrap();

        let sheet = grades.for_student(&UserId::new("s1")).await.unwrap();
        assert_eq!(sheet.len(), 1);
        assert_eq!(sheet[0].id, GradeId::new("g1"));
        assert_eq!(sheet[0].score, 95.0);
    }

    #[tokio::test]
    async fn test_pair_uniqueness_is_enforced() {
        let grades = GradeStore::new(memory_backend());
        grades
            .record(grade("g1", "s1", "c1", 95.0, "2026-03-01T10:00:00Z"))
            .await
            .unwrap();

        let err = grades
            .record(grade("g2", "s1", "c1", 80.0, "2026-03-02T10:00:00Z"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::AlreadyExists(_)));

        // A different course for the same student is fine.
        grades
            .record(grade("g3", "s1", "c2", 88.0, "2026-03-02T10:00:00Z"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_recreate_same_id_fails() {
        let grades = GradeStore::new(memory_backend());
        grades
            .record(grade("g1", "s1", "c1", 95.0, "2026-03-01T10:00:00Z"))
            .await
            .unwrap();

        let err = grades
            .record(grade("g1", "s2", "c2", 50.0, "2026-03-02T10:00:00Z"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Storage(StoreError::AlreadyExists { .. })
        ));
    }

    #[tokio::test]
    async fn test_unparseable_graded_at_is_rejected_up_front() {
        let grades = GradeStore::new(memory_backend());
        let err = grades
            .record(grade("g1", "s1", "c1", 95.0, "last tuesday"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Storage(StoreError::InvalidDate(_))
        ));
        assert_eq!(grades.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_recently_graded_orders_newest_first() {
        let grades = GradeStore::new(memory_backend());
        grades
            .record(grade("g1", "s1", "c1", 70.0, "2026-03-01T10:00:00Z"))
            .await
            .unwrap();
        grades
            .record(grade("g2", "s2", "c1", 80.0, "2026-03-03T10:00:00Z"))
            .await
            .unwrap();
        grades
            .record(grade("g3", "s3", "c1", 90.0, "2026-03-02T10:00:00Z"))
            .await
            .unwrap();

        let recent = grades.recently_graded(2).await.unwrap();
        let ids: Vec<&str> = recent.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["g2", "g3"]);
    }

    #[tokio::test]
    async fn test_delete_clears_every_index() {
        let grades = GradeStore::new(memory_backend());
        grades
            .record(grade("g1", "s1", "c1", 95.0, "2026-03-01T10:00:00Z"))
            .await
            .unwrap();

        assert!(grades.delete(&GradeId::new("g1")).await.unwrap());

        assert!(grades.for_student(&UserId::new("s1")).await.unwrap().is_empty());
        assert!(grades.for_course(&CourseId::new("c1")).await.unwrap().is_empty());
        assert!(grades
            .for_pair(&UserId::new("s1"), &CourseId::new("c1"))
            .await
            .unwrap()
            .is_none());
        assert!(grades.recently_graded(10).await.unwrap().is_empty());

        // The pair is free again.
        grades
            .record(grade("g9", "s1", "c1", 60.0, "2026-03-05T10:00:00Z"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_rescore_keeps_index_membership() {
        let grades = GradeStore::new(memory_backend());
        grades
            .record(grade("g1", "s1", "c1", 60.0, "2026-03-01T10:00:00Z"))
            .await
            .unwrap();

        let updated = grades.rescore(&GradeId::new("g1"), 75.0).await.unwrap();
        assert_eq!(updated.score, 75.0);
        assert!(updated.updated_at >= updated.created_at);

        let sheet = grades.for_student(&UserId::new("s1")).await.unwrap();
        assert_eq!(sheet[0].score, 75.0);
    }
}
