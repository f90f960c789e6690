//! # gatehouse-service
//!
//! User-facing services built on the principal cache. Reads are
//! cache-aside; writes go to the primary store first and then invalidate.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time.

pub mod context;
pub mod user;

pub use context::RequestContext;
pub use user::{AdminUserService, UpdateProfileRequest, UserService};
