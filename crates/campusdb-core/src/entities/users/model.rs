//! User entity.

use campusdb_commons::{ClassId, Document, Role, UserId};
use serde::{Deserialize, Serialize};

/// A school user: student, teacher, or administrator.
///
/// ## Fields
/// - `id`: unique user identifier (e.g. "u_123456")
/// - `email`: contact address, unique across live users
/// - `display_name`: name shown in listings
/// - `role`: student, teacher, or admin
/// - `class_id`: homeroom class membership (students only)
/// - `created_at` / `updated_at` / `deleted_at`: Unix-millisecond lifecycle
///   timestamps stamped by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub class_id: Option<ClassId>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
    pub deleted_at: Option<i64>,
}

impl User {
    pub fn new(id: impl Into<UserId>, email: &str, display_name: &str, role: Role) -> Self {
        Self {
            id: id.into(),
            email: email.to_string(),
            display_name: display_name.to_string(),
            role,
            class_id: None,
            created_at: None,
            updated_at: None,
            deleted_at: None,
        }
    }

    pub fn in_class(mut self, class_id: impl Into<ClassId>) -> Self {
        self.class_id = Some(class_id.into());
        self
    }

    /// Initial state reported for an absent record.
    pub(crate) fn blank(id: &str) -> Self {
        Self::new(id, "", "", Role::Student)
    }
}

impl Document for User {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_serialization_round_trip() {
        let user = User::new("u1", "alice@school.test", "Alice", Role::Teacher);
        let json = serde_json::to_string(&user).unwrap();
        let back: User = serde_json::from_str(&json).unwrap();
        assert_eq!(user, back);
    }

    #[test]
    fn test_in_class_sets_membership() {
        let user = User::new("u1", "bob@school.test", "Bob", Role::Student).in_class("c1");
        assert_eq!(user.class_id, Some(ClassId::new("c1")));
    }
}
