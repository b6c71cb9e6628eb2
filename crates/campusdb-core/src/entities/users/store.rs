//! Users store.

use super::indexes::users_binding;
use super::model::User;
use crate::error::{CoreError, Result};
use campusdb_commons::{ClassId, Role, UserId};
use campusdb_store::{IndexedEntity, KvBackend, Page};
use std::sync::Arc;

/// Store surface for the users entity.
pub struct UserStore {
    entity: IndexedEntity<User>,
}

impl UserStore {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self {
            entity: IndexedEntity::new(backend, users_binding()),
        }
    }

    /// Store with seed records for bootstrap via [`ensure_seed`](Self::ensure_seed).
    pub fn with_seed(backend: Arc<dyn KvBackend>, seed: Vec<User>) -> Self {
        Self {
            entity: IndexedEntity::new(backend, users_binding().with_seed(seed)),
        }
    }

    /// Creates a user. Fails when the ID is taken or a live user already has
    /// the email.
    pub async fn create(&self, user: User) -> Result<User> {
        if self
            .entity
            .exists_by_index("email", &user.email.to_lowercase())
            .await?
        {
            return Err(CoreError::AlreadyExists(format!(
                "user with email '{}'",
                user.email
            )));
        }
        Ok(self.entity.create(user).await?)
    }

    pub async fn get(&self, id: &UserId) -> Result<Option<User>> {
        Ok(self.entity.get(id.as_str()).await?)
    }

    /// Case-insensitive email lookup. Soft-deleted users are excluded.
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let matches = self
            .entity
            .get_by_index("email", &email.to_lowercase(), false)
            .await?;
        Ok(matches.into_iter().next())
    }

    pub async fn list(
        &self,
        cursor: Option<&str>,
        limit: Option<usize>,
        include_deleted: bool,
    ) -> Result<Page<User>> {
        Ok(self.entity.list(cursor, limit, include_deleted).await?)
    }

    pub async fn list_by_role(&self, role: Role) -> Result<Vec<User>> {
        Ok(self.entity.get_by_index("role", role.as_str(), false).await?)
    }

    pub async fn list_in_class(&self, class_id: &ClassId) -> Result<Vec<User>> {
        Ok(self
            .entity
            .get_by_index("class_id", class_id.as_str(), false)
            .await?)
    }

    /// Changes the display name.
    pub async fn rename(&self, id: &UserId, display_name: &str) -> Result<User> {
        let display_name = display_name.to_string();
        Ok(self
            .entity
            .update(id.as_str(), move |mut user| {
                user.display_name = display_name.clone();
                user
            })
            .await?)
    }

    /// Moves a student into a class (or out of any class with `None`),
    /// keeping the class index in sync.
    pub async fn assign_to_class(&self, id: &UserId, class_id: Option<ClassId>) -> Result<User> {
        Ok(self
            .entity
            .update(id.as_str(), move |mut user| {
                user.class_id = class_id.clone();
                user
            })
            .await?)
    }

    pub async fn soft_delete(&self, id: &UserId) -> Result<bool> {
        Ok(self.entity.soft_delete_with_cleanup(id.as_str()).await?)
    }

    pub async fn restore(&self, id: &UserId) -> Result<bool> {
        Ok(self.entity.restore_with_cleanup(id.as_str()).await?)
    }

    pub async fn delete(&self, id: &UserId) -> Result<bool> {
        Ok(self.entity.delete(id.as_str()).await?)
    }

    pub async fn delete_many(&self, ids: &[UserId]) -> Result<usize> {
        let ids: Vec<String> = ids.iter().map(|id| id.as_str().to_string()).collect();
        Ok(self.entity.delete_many(&ids).await?)
    }

    pub async fn count(&self) -> Result<usize> {
        Ok(self.entity.count().await?)
    }

    pub async fn count_by_role(&self, role: Role) -> Result<usize> {
        Ok(self.entity.count_by_index("role", role.as_str()).await?)
    }

    pub async fn ensure_seed(&self) -> Result<usize> {
        Ok(self.entity.ensure_seed().await?)
    }
}
