//! # gatehouse-database
//!
//! PostgreSQL connection management and the user repository, with a
//! PostgreSQL implementation and an in-process one for development and tests.

pub mod connection;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::{MemoryUserRepository, PgUserRepository, UserRepository};
