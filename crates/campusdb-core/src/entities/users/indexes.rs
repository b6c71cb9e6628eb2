//! Users index definitions.

use super::model::User;
use campusdb_store::{EntityBinding, SecondaryIndexDef};
use std::sync::Arc;

/// Lookup by email (unique among live users).
///
/// Values are stored lowercase for case-insensitive matching.
pub struct UserEmailIndex;

impl SecondaryIndexDef<User> for UserEmailIndex {
    fn field(&self) -> &'static str {
        "email"
    }

    fn value(&self, user: &User) -> Option<String> {
        Some(user.email.to_lowercase())
    }
}

/// Query users by role.
pub struct UserRoleIndex;

impl SecondaryIndexDef<User> for UserRoleIndex {
    fn field(&self) -> &'static str {
        "role"
    }

    fn value(&self, user: &User) -> Option<String> {
        Some(user.role.as_str().to_string())
    }
}

/// Students of one homeroom class. Users without a class are not indexed.
pub struct UserClassIndex;

impl SecondaryIndexDef<User> for UserClassIndex {
    fn field(&self) -> &'static str {
        "class_id"
    }

    fn value(&self, user: &User) -> Option<String> {
        user.class_id.as_ref().map(|c| c.as_str().to_string())
    }
}

/// Binding for the users entity with its default index set.
pub fn users_binding() -> EntityBinding<User> {
    EntityBinding::new("user", "users", User::blank)
        .with_secondary(Arc::new(UserEmailIndex))
        .with_secondary(Arc::new(UserRoleIndex))
        .with_secondary(Arc::new(UserClassIndex))
}

#[cfg(test)]
mod tests {
    use super::*;
    use campusdb_commons::Role;

    #[test]
    fn test_email_index_lowercases() {
        let user = User::new("u1", "Alice@School.Test", "Alice", Role::Student);
        assert_eq!(
            UserEmailIndex.value(&user),
            Some("alice@school.test".to_string())
        );
    }

    #[test]
    fn test_class_index_skips_unassigned_users() {
        let user = User::new("u1", "a@b.c", "A", Role::Teacher);
        assert_eq!(UserClassIndex.value(&user), None);
        let user = user.in_class("c9");
        assert_eq!(UserClassIndex.value(&user), Some("c9".to_string()));
    }
}
