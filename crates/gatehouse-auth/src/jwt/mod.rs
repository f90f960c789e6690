//! JWT token issuance, verification, and claims.

pub mod claims;
pub mod decoder;
pub mod encoder;

pub use claims::{Claims, TokenType};
pub use decoder::{TokenVerifier, VerifiedToken};
pub use encoder::{TokenIssuer, TokenPair};
