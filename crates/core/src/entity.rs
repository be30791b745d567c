//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// A catalog product is an entity: a reloaded record with a different stock
/// figure is still the same product.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
