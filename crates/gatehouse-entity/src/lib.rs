//! # gatehouse-entity
//!
//! Domain entity models for Gatehouse. Database entities derive
//! `sqlx::FromRow`; everything derives `Serialize` and `Deserialize` so it
//! can travel through the principal cache.

pub mod user;
