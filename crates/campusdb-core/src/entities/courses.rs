//! Courses entity: taught subjects, each attached to a class and a teacher.

use crate::error::Result;
use campusdb_commons::{ClassId, CourseId, Document, UserId};
use campusdb_store::{EntityBinding, IndexedEntity, KvBackend, Page, SecondaryIndexDef};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub class_id: ClassId,
    pub teacher_id: UserId,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
    pub deleted_at: Option<i64>,
}

impl Course {
    pub fn new(
        id: impl Into<CourseId>,
        name: &str,
        class_id: impl Into<ClassId>,
        teacher_id: impl Into<UserId>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.to_string(),
            class_id: class_id.into(),
            teacher_id: teacher_id.into(),
            created_at: None,
            updated_at: None,
            deleted_at: None,
        }
    }

    fn blank(id: &str) -> Self {
        Self::new(id, "", "", "")
    }
}

impl Document for Course {
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

struct CourseClassIndex;

impl SecondaryIndexDef<Course> for CourseClassIndex {
    fn field(&self) -> &'static str {
        "class_id"
    }

    fn value(&self, course: &Course) -> Option<String> {
        Some(course.class_id.as_str().to_string())
    }
}

struct CourseTeacherIndex;

impl SecondaryIndexDef<Course> for CourseTeacherIndex {
    fn field(&self) -> &'static str {
        "teacher_id"
    }

    fn value(&self, course: &Course) -> Option<String> {
        Some(course.teacher_id.as_str().to_string())
    }
}

pub fn courses_binding() -> EntityBinding<Course> {
    EntityBinding::new("course", "courses", Course::blank)
        .with_secondary(Arc::new(CourseClassIndex))
        .with_secondary(Arc::new(CourseTeacherIndex))
}

pub struct CourseStore {
    entity: IndexedEntity<Course>,
}

impl CourseStore {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self {
            entity: IndexedEntity::new(backend, courses_binding()),
        }
    }

    pub async fn create(&self, course: Course) -> Result<Course> {
        Ok(self.entity.create(course).await?)
    }

    pub async fn get(&self, id: &CourseId) -> Result<Option<Course>> {
        Ok(self.entity.get(id.as_str()).await?)
    }

    pub async fn list(
        &self,
        cursor: Option<&str>,
        limit: Option<usize>,
        include_deleted: bool,
    ) -> Result<Page<Course>> {
        Ok(self.entity.list(cursor, limit, include_deleted).await?)
    }

    pub async fn for_class(&self, class_id: &ClassId) -> Result<Vec<Course>> {
        Ok(self
            .entity
            .get_by_index("class_id", class_id.as_str(), false)
            .await?)
    }

    pub async fn for_teacher(&self, teacher_id: &UserId) -> Result<Vec<Course>> {
        Ok(self
            .entity
            .get_by_index("teacher_id", teacher_id.as_str(), false)
            .await?)
    }

    pub async fn delete(&self, id: &CourseId) -> Result<bool> {
        Ok(self.entity.delete(id.as_str()).await?)
    }

    pub async fn delete_many(&self, ids: &[CourseId]) -> Result<usize> {
        let ids: Vec<String> = ids.iter().map(|id| id.as_str().to_string()).collect();
        Ok(self.entity.delete_many(&ids).await?)
    }

    pub async fn count(&self) -> Result<usize> {
        Ok(self.entity.count().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campusdb_store::test_utils::memory_backend;

    #[tokio::test]
    async fn test_courses_index_by_class_and_teacher() {
        let courses = CourseStore::new(memory_backend());
        courses.create(Course::new("m1", "Math", "c1", "t1")).await.unwrap();
        courses
            .create(Course::new("h1", "History", "c1", "t2"))
            .await
            .unwrap();
        courses.create(Course::new("m2", "Math", "c2", "t1")).await.unwrap();

        assert_eq!(courses.for_class(&ClassId::new("c1")).await.unwrap().len(), 2);
        assert_eq!(courses.for_teacher(&UserId::new("t1")).await.unwrap().len(), 2);

        assert!(courses.delete(&CourseId::new("m1")).await.unwrap());
        assert_eq!(courses.for_class(&ClassId::new("c1")).await.unwrap().len(), 1);
        assert_eq!(courses.count().await.unwrap(), 2);
    }
}
