//! Classes entity: homeroom groups led by one teacher.

use crate::error::{CoreError, Result};
use campusdb_commons::{ClassId, Document, UserId};
use campusdb_store::{EntityBinding, IndexedEntity, KvBackend, Page, SecondaryIndexDef};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Class {
    pub id: ClassId,
    pub name: String,
    pub teacher_id: UserId,
    pub room: Option<String>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
    pub deleted_at: Option<i64>,
}

impl Class {
    pub fn new(id: impl Into<ClassId>, name: &str, teacher_id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            name: name.to_string(),
            teacher_id: teacher_id.into(),
            room: None,
            created_at: None,
            updated_at: None,
            deleted_at: None,
        }
    }

    fn blank(id: &str) -> Self {
        Self::new(id, "", "")
    }
}

impl Document for Class {
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

/// Classes led by one teacher.
struct ClassTeacherIndex;

impl SecondaryIndexDef<Class> for ClassTeacherIndex {
    fn field(&self) -> &'static str {
        "teacher_id"
    }

    fn value(&self, class: &Class) -> Option<String> {
        Some(class.teacher_id.as_str().to_string())
    }
}

pub fn classes_binding() -> EntityBinding<Class> {
    EntityBinding::new("class", "classes", Class::blank)
        .with_secondary(Arc::new(ClassTeacherIndex))
}

pub struct ClassStore {
    entity: IndexedEntity<Class>,
}

impl ClassStore {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self {
            entity: IndexedEntity::new(backend, classes_binding()),
        }
    }

    pub fn with_seed(backend: Arc<dyn KvBackend>, seed: Vec<Class>) -> Self {
        Self {
            entity: IndexedEntity::new(backend, classes_binding().with_seed(seed)),
        }
    }

    pub async fn create(&self, class: Class) -> Result<Class> {
        if class.name.is_empty() {
            return Err(CoreError::InvalidInput("class name is required".into()));
        }
        Ok(self.entity.create(class).await?)
    }

    pub async fn get(&self, id: &ClassId) -> Result<Option<Class>> {
        Ok(self.entity.get(id.as_str()).await?)
    }

    pub async fn list(
        &self,
        cursor: Option<&str>,
        limit: Option<usize>,
        include_deleted: bool,
    ) -> Result<Page<Class>> {
        Ok(self.entity.list(cursor, limit, include_deleted).await?)
    }

    pub async fn for_teacher(&self, teacher_id: &UserId) -> Result<Vec<Class>> {
        Ok(self
            .entity
            .get_by_index("teacher_id", teacher_id.as_str(), false)
            .await?)
    }

    /// Hands the class to a different teacher.
    pub async fn reassign_teacher(&self, id: &ClassId, teacher_id: UserId) -> Result<Class> {
        Ok(self
            .entity
            .update(id.as_str(), move |mut class| {
                class.teacher_id = teacher_id.clone();
                class
            })
            .await?)
    }

    pub async fn soft_delete(&self, id: &ClassId) -> Result<bool> {
        Ok(self.entity.soft_delete_with_cleanup(id.as_str()).await?)
    }

    pub async fn restore(&self, id: &ClassId) -> Result<bool> {
        Ok(self.entity.restore_with_cleanup(id.as_str()).await?)
    }

    pub async fn delete(&self, id: &ClassId) -> Result<bool> {
        Ok(self.entity.delete(id.as_str()).await?)
    }

    pub async fn count(&self) -> Result<usize> {
        Ok(self.entity.count().await?)
    }

    pub async fn ensure_seed(&self) -> Result<usize> {
        Ok(self.entity.ensure_seed().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campusdb_store::test_utils::memory_backend;

    #[tokio::test]
    async fn test_create_requires_name() {
        let classes = ClassStore::new(memory_backend());
        let err = classes.create(Class::new("c1", "", "t1")).await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_teacher_lookup_follows_reassignment() {
        let classes = ClassStore::new(memory_backend());
        classes.create(Class::new("c1", "5A", "t1")).await.unwrap();
        classes.create(Class::new("c2", "5B", "t1")).await.unwrap();

        assert_eq!(classes.for_teacher(&UserId::new("t1")).await.unwrap().len(), 2);

        classes
            .reassign_teacher(&ClassId::new("c2"), UserId::new("t2"))
            .await
            .unwrap();
        assert_eq!(classes.for_teacher(&UserId::new("t1")).await.unwrap().len(), 1);
        assert_eq!(classes.for_teacher(&UserId::new("t2")).await.unwrap().len(), 1);
    }
}
