//! Entity bindings, one module per kind.

pub mod announcements;
pub mod classes;
pub mod courses;
pub mod grades;
pub mod users;
pub mod webhooks;
