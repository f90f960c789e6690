//! User domain entities.

pub mod model;
pub mod query;
pub mod role;

pub use model::{CreateUser, UpdateUser, User, UserProfile};
pub use query::UserQuery;
pub use role::UserRole;
