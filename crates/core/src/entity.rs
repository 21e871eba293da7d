//! Entity traits: identity + ownership.

use crate::id::UserId;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}

/// An entity that belongs to exactly one user.
///
/// Stores use this to scope every read and write to the acting user.
pub trait Owned: Entity {
    fn owner(&self) -> UserId;
}
