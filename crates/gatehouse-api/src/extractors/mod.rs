//! Custom Axum extractors.

pub mod auth;
pub mod json;
pub mod path;

pub use auth::{AuthUser, bearer_token};
pub use json::JsonBody;
pub use path::parse_uuid;
