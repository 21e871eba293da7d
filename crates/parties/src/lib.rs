//! Parties module: customers and distributors.
//!
//! Both are contact records with the same shape; `PartyKind` tells them apart.

pub mod party;

pub use party::{Party, PartyDraft, PartyInput, PartyKind};
