//! `stockroom-auth`: token boundary to the external authentication provider.
//!
//! The provider signs users in and issues HS256 tokens; this crate only
//! verifies them and hands back the identity they carry. It is decoupled from
//! HTTP and storage.

pub mod claims;
pub mod jwt;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtValidator, TokenError};
