//! Users entity.
//!
//! ## Indexes
//!
//! 1. **UserEmailIndex** — lookup by email (stored lowercase for
//!    case-insensitive matching), also used for uniqueness checks on create.
//! 2. **UserRoleIndex** — "all teachers", "all admins".
//! 3. **UserClassIndex** — students of one homeroom class; users without a
//!    class are simply not indexed.

mod indexes;
mod model;
mod store;

pub use indexes::users_binding;
pub use model::User;
pub use store::UserStore;
