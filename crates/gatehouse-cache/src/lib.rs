//! # gatehouse-cache
//!
//! Key-value providers for Gatehouse. Two backends are available:
//!
//! - **memory**: In-process store using [moka](https://crates.io/crates/moka)
//!   with per-entry expiry
//! - **redis**: Redis-backed store using the [redis](https://crates.io/crates/redis) crate
//!
//! The provider is selected at runtime based on configuration. The same
//! [`CacheManager`] type backs both the principal cache and the token
//! revocation store.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod principal;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use principal::PrincipalCache;
pub use provider::CacheManager;
