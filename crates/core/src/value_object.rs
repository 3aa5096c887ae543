//! Value object trait: equality by value, not identity.
//!
//! Value objects have **no identity**; they are defined entirely by their
//! attribute values. In this workspace `Money`, `Location` and `ProductState`
//! are value objects: two shelves at aisle 1 / shelf 2 are the same place.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// build a new value (e.g. `Money::with_markup_percent` returns a fresh amount).
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Location { aisle: u32, shelf: u32 }
///
/// impl ValueObject for Location {}
///
/// assert_eq!(Location { aisle: 1, shelf: 2 }, Location { aisle: 1, shelf: 2 });
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
