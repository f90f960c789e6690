//! Session lifecycle: register, login, refresh, logout.

pub mod manager;

pub use manager::{AuthSession, RefreshedTokens, RegisterRequest, SessionManager};
