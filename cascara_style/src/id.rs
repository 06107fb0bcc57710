// Copyright 2025 the Cascara Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property slot identification.
//!
//! This module provides [`SlotIndex`] for runtime slot addressing and
//! [`StyleProp<T>`] for type-safe compile-time property handles.

use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;

/// A runtime slot index within a style type's property layout.
///
/// This is a lightweight handle (u16) addressing one property slot of a
/// [`StyleObject`](crate::StyleObject). Because a subtype's slots extend its
/// supertype's slots as a strict prefix, a slot index is valid for the type
/// that declared the property and for every subtype of it.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotIndex(u16);

impl SlotIndex {
    /// Creates a new slot index.
    ///
    /// This is typically handed out by
    /// [`StyleTypeBuilder::property`](crate::StyleTypeBuilder::property)
    /// rather than constructed directly.
    #[must_use]
    #[inline]
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Returns the underlying index.
    #[must_use]
    #[inline]
    pub const fn index(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SlotIndex").field(&self.0).finish()
    }
}

/// A typed handle to one declared property slot.
///
/// The handle pairs a [`SlotIndex`] with a phantom value type, so reads and
/// writes through it are checked against the declared type by the compiler
/// instead of failing at the slot:
///
/// ```rust
/// use cascara_style::{SharedStyle, StyleTypeRegistry};
///
/// let mut types = StyleTypeRegistry::new();
/// let mut text = types.declare("Text", None);
/// let size = text.property("size", 12.0_f64);
/// let text = text.build();
///
/// let style = SharedStyle::new(&types, text);
/// style.set(size, 16.0);
/// assert_eq!(style.get(size), 16.0);
/// ```
///
/// The phantom parameter costs nothing at runtime: a handle is the two-byte
/// slot index, freely copied and compared.
pub struct StyleProp<T> {
    index: SlotIndex,
    _marker: PhantomData<fn() -> T>,
}

impl<T> StyleProp<T> {
    /// Creates a typed handle from a slot index.
    ///
    /// The caller must ensure the slot at `index` was declared with value
    /// type `T`; mismatched types panic at the first typed access.
    #[must_use]
    #[inline]
    pub const fn from_index(index: SlotIndex) -> Self {
        Self {
            index,
            _marker: PhantomData,
        }
    }

    /// Returns the underlying slot index.
    #[must_use]
    #[inline]
    pub const fn index(self) -> SlotIndex {
        self.index
    }
}

// Hand-written impls: deriving would put unwanted bounds on `T`, and the
// handle is only the index.

impl<T> Copy for StyleProp<T> {}

impl<T> Clone for StyleProp<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for StyleProp<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for StyleProp<T> {}

impl<T> Hash for StyleProp<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T> fmt::Debug for StyleProp<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleProp")
            .field("index", &self.index)
            .field("type", &core::any::type_name::<T>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::string::String;

    #[test]
    fn slot_index_basics() {
        let index = SlotIndex::new(3);
        assert_eq!(index.index(), 3);
        assert_eq!(index, SlotIndex::new(3));
        assert_ne!(index, SlotIndex::new(4));
    }

    #[test]
    fn slot_index_debug() {
        assert_eq!(format!("{:?}", SlotIndex::new(3)), "SlotIndex(3)");
    }

    #[test]
    fn prop_copy_clone() {
        let prop: StyleProp<f64> = StyleProp::from_index(SlotIndex::new(1));
        let prop2 = prop;
        assert_eq!(prop, prop2);
    }

    #[test]
    fn prop_size() {
        use core::mem::size_of;
        assert_eq!(size_of::<SlotIndex>(), 2);
        assert_eq!(size_of::<StyleProp<f64>>(), 2);
        assert_eq!(size_of::<StyleProp<String>>(), 2);
    }
}
