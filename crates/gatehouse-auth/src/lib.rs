//! # gatehouse-auth
//!
//! The trust boundary of Gatehouse: who a caller is and whether a presented
//! token is still honoured.
//!
//! ## Modules
//!
//! - `credential`: email/password verification without user enumeration
//! - `jwt`: access/refresh token issuance and verification
//! - `revocation`: SHA-256 fingerprint denylist with self-expiring entries
//! - `password`: Argon2id hashing and password policy
//! - `session`: register, login, refresh, and logout flows

pub mod credential;
pub mod error;
pub mod jwt;
pub mod password;
pub mod principal;
pub mod revocation;
pub mod session;

pub use credential::CredentialVerifier;
pub use error::{AuthError, AuthResult, TokenRejection};
pub use jwt::{Claims, TokenIssuer, TokenPair, TokenType, TokenVerifier};
pub use password::{PasswordHasher, PasswordPolicy};
pub use principal::Principal;
pub use revocation::RevocationStore;
pub use session::SessionManager;
