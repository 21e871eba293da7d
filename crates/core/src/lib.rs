//! `stockroom-core`: ids, errors and validation shared by every domain crate.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod user;
pub mod validate;

pub use entity::{Entity, Owned};
pub use error::{DomainError, DomainResult};
pub use id::{PartyId, ProductId, SaleId, UserId};
pub use user::User;
