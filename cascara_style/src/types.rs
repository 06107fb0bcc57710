// Copyright 2025 the Cascara Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Style type registration and covariance queries.
//!
//! Style types form a single-rooted inheritance chain via `extends` links. A
//! type's property layout is declared exactly once, at registration; a
//! subtype starts from its supertype's slots and appends its own, so slot
//! indices form a strict prefix and handles stay valid down the chain.

use alloc::vec::Vec;
use core::fmt;
use hashbrown::HashMap;

use crate::id::{SlotIndex, StyleProp};
use crate::slot::{ErasedSlot, StyleProperty};

/// A registered style type.
///
/// This is a lightweight handle (u16) into a [`StyleTypeRegistry`].
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StyleTypeId(u16);

impl StyleTypeId {
    /// Returns the underlying index of this type ID.
    #[must_use]
    #[inline]
    pub const fn index(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for StyleTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StyleTypeId").field(&self.0).finish()
    }
}

/// One declared property slot: its name and the prototype cloned into every
/// object of the type.
#[derive(Clone, Debug)]
struct SlotDecl {
    name: &'static str,
    prototype: ErasedSlot,
}

#[derive(Debug)]
struct TypeRegistration {
    name: &'static str,
    extends: Option<StyleTypeId>,
    /// Full layout: supertype slots first, own slots appended.
    slots: Vec<SlotDecl>,
}

/// A registry of style types and their property layouts.
///
/// Types are registered once at startup via [`declare`](Self::declare); the
/// registry then answers name, layout, and covariance queries for the
/// cascade.
///
/// # Example
///
/// ```rust
/// use cascara_style::StyleTypeRegistry;
///
/// let mut types = StyleTypeRegistry::new();
///
/// let mut text = types.declare("Text", None);
/// let color = text.property("color", 0x000000_u32);
/// let text = text.build();
///
/// // A subtype inherits the supertype's slots as a prefix.
/// let mut heading = types.declare("Heading", Some(text));
/// let level = heading.property("level", 1_u8);
/// let heading = heading.build();
///
/// assert_eq!(types.slot_count(text), 1);
/// assert_eq!(types.slot_count(heading), 2);
/// // `color` is usable on Heading objects too.
/// assert_eq!(types.slot_name(heading, color.index()), Some("color"));
/// assert_eq!(types.supertype_distance(heading, text), Some(1));
/// assert_eq!(types.supertype_distance(text, heading), None);
/// # let _ = level;
/// ```
#[derive(Debug, Default)]
pub struct StyleTypeRegistry {
    types: Vec<TypeRegistration>,
    by_name: HashMap<&'static str, StyleTypeId>,
}

impl StyleTypeRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begins declaring a new style type.
    ///
    /// The builder starts from the supertype's slot layout (if `extends` is
    /// given); call [`StyleTypeBuilder::property`] for each own property and
    /// [`StyleTypeBuilder::build`] to register.
    ///
    /// # Panics
    ///
    /// Panics if a type with the same name is already registered, or if more
    /// than 65,536 types are registered.
    pub fn declare(
        &mut self,
        name: &'static str,
        extends: Option<StyleTypeId>,
    ) -> StyleTypeBuilder<'_> {
        assert!(
            !self.by_name.contains_key(name),
            "style type '{name}' is already registered"
        );
        assert!(
            self.types.len() < u16::MAX as usize,
            "too many style types registered (max {})",
            u16::MAX
        );

        let slots = match extends {
            Some(supertype) => self.registration(supertype).slots.clone(),
            None => Vec::new(),
        };

        StyleTypeBuilder {
            registry: self,
            name,
            extends,
            slots,
        }
    }

    /// Returns the number of registered types.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if no types are registered.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Looks up a type by name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<StyleTypeId> {
        self.by_name.get(name).copied()
    }

    /// Returns the name of a type.
    #[must_use]
    pub fn name(&self, id: StyleTypeId) -> &'static str {
        self.registration(id).name
    }

    /// Returns the supertype a type extends, if any.
    #[must_use]
    pub fn extends(&self, id: StyleTypeId) -> Option<StyleTypeId> {
        self.registration(id).extends
    }

    /// Returns the number of property slots in a type's layout.
    #[must_use]
    pub fn slot_count(&self, id: StyleTypeId) -> usize {
        self.registration(id).slots.len()
    }

    /// Returns the declared name of a slot, or `None` if out of range.
    #[must_use]
    pub fn slot_name(&self, id: StyleTypeId, slot: SlotIndex) -> Option<&'static str> {
        self.registration(id)
            .slots
            .get(slot.index() as usize)
            .map(|decl| decl.name)
    }

    /// Returns the declared slot names in layout order.
    pub fn slot_names(&self, id: StyleTypeId) -> impl Iterator<Item = &'static str> + '_ {
        self.registration(id).slots.iter().map(|decl| decl.name)
    }

    /// Clones the declared prototype slots for a type, in layout order.
    ///
    /// This is how [`StyleObject`](crate::StyleObject) construction obtains
    /// its fixed slot vector.
    #[must_use]
    pub fn instantiate(&self, id: StyleTypeId) -> Vec<ErasedSlot> {
        self.registration(id)
            .slots
            .iter()
            .map(|decl| decl.prototype.clone())
            .collect()
    }

    /// Returns the number of `extends` hops from `ty` up to `supertype`.
    ///
    /// `Some(0)` means the types are identical; `None` means `supertype` is
    /// not reachable from `ty`, i.e. a rule declared for `supertype` can
    /// never apply to a target of type `ty`.
    #[must_use]
    pub fn supertype_distance(&self, ty: StyleTypeId, supertype: StyleTypeId) -> Option<u16> {
        let mut current = Some(ty);
        let mut distance: u16 = 0;
        while let Some(id) = current {
            if id == supertype {
                return Some(distance);
            }
            current = self.registration(id).extends;
            distance = distance.saturating_add(1);
        }
        None
    }

    fn registration(&self, id: StyleTypeId) -> &TypeRegistration {
        self.types
            .get(id.index() as usize)
            .unwrap_or_else(|| panic!("unknown style type {id:?}"))
    }
}

/// In-progress declaration of a style type.
///
/// Obtained from [`StyleTypeRegistry::declare`]. Property handles are handed
/// out as each property is declared; [`build`](Self::build) registers the
/// type and returns its ID.
pub struct StyleTypeBuilder<'r> {
    registry: &'r mut StyleTypeRegistry,
    name: &'static str,
    extends: Option<StyleTypeId>,
    slots: Vec<SlotDecl>,
}

impl<'r> StyleTypeBuilder<'r> {
    /// Declares a property with the given name and default value.
    ///
    /// Returns the typed handle used to address the slot on objects of this
    /// type and its subtypes.
    ///
    /// # Panics
    ///
    /// Panics if the name collides with a property already declared on this
    /// type or an inherited one, or if more than 65,536 slots are declared.
    pub fn property<T: Clone + PartialEq + 'static>(
        &mut self,
        name: &'static str,
        default: T,
    ) -> StyleProp<T> {
        assert!(
            self.slots.iter().all(|decl| decl.name != name),
            "style type '{}' already declares property '{name}'",
            self.name
        );
        assert!(
            self.slots.len() < u16::MAX as usize,
            "too many properties declared on style type '{}' (max {})",
            self.name,
            u16::MAX
        );

        #[expect(clippy::cast_possible_truncation, reason = "checked above")]
        let index = SlotIndex::new(self.slots.len() as u16);

        self.slots.push(SlotDecl {
            name,
            prototype: ErasedSlot::new(StyleProperty::new(default)),
        });

        StyleProp::from_index(index)
    }

    /// Registers the type and returns its ID.
    #[must_use]
    pub fn build(self) -> StyleTypeId {
        #[expect(clippy::cast_possible_truncation, reason = "checked in declare")]
        let id = StyleTypeId(self.registry.types.len() as u16);

        self.registry.types.push(TypeRegistration {
            name: self.name,
            extends: self.extends,
            slots: self.slots,
        });
        self.registry.by_name.insert(self.name, id);
        id
    }
}

impl fmt::Debug for StyleTypeBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleTypeBuilder")
            .field("name", &self.name)
            .field("extends", &self.extends)
            .field("slots", &self.slots.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn registry_declare_and_lookup() {
        let mut types = StyleTypeRegistry::new();
        let mut text = types.declare("Text", None);
        let _color = text.property("color", 0_u32);
        let text = text.build();

        assert_eq!(types.len(), 1);
        assert_eq!(types.by_name("Text"), Some(text));
        assert_eq!(types.by_name("Heading"), None);
        assert_eq!(types.name(text), "Text");
        assert_eq!(types.extends(text), None);
    }

    #[test]
    fn subtype_layout_is_prefix_extended() {
        let mut types = StyleTypeRegistry::new();

        let mut text = types.declare("Text", None);
        let color = text.property("color", 0_u32);
        let size = text.property("size", 12.0_f64);
        let text = text.build();

        let mut heading = types.declare("Heading", Some(text));
        let level = heading.property("level", 1_u8);
        let heading = heading.build();

        assert_eq!(types.slot_count(text), 2);
        assert_eq!(types.slot_count(heading), 3);
        assert_eq!(color.index().index(), 0);
        assert_eq!(size.index().index(), 1);
        assert_eq!(level.index().index(), 2);

        let names: Vec<_> = types.slot_names(heading).collect();
        assert_eq!(names, ["color", "size", "level"]);
    }

    #[test]
    fn supertype_distance_walks_extends_chain() {
        let mut types = StyleTypeRegistry::new();
        let base = types.declare("Base", None).build();
        let mid = types.declare("Mid", Some(base)).build();
        let leaf = types.declare("Leaf", Some(mid)).build();
        let other = types.declare("Other", None).build();

        assert_eq!(types.supertype_distance(leaf, leaf), Some(0));
        assert_eq!(types.supertype_distance(leaf, mid), Some(1));
        assert_eq!(types.supertype_distance(leaf, base), Some(2));
        assert_eq!(types.supertype_distance(base, leaf), None);
        assert_eq!(types.supertype_distance(leaf, other), None);
    }

    #[test]
    fn instantiate_clones_prototypes() {
        let mut types = StyleTypeRegistry::new();
        let mut text = types.declare("Text", None);
        let _size = text.property("size", 12.0_f64);
        let text = text.build();

        let slots = types.instantiate(text);
        assert_eq!(slots.len(), 1);
        assert!(!slots[0].is_explicit());
        assert_eq!(
            *slots[0]
                .as_property::<f64>()
                .unwrap()
                .default_value(),
            12.0
        );
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn duplicate_type_name_panics() {
        let mut types = StyleTypeRegistry::new();
        let _text = types.declare("Text", None).build();
        let _dup = types.declare("Text", None);
    }

    #[test]
    #[should_panic(expected = "already declares property")]
    fn duplicate_property_name_panics() {
        let mut types = StyleTypeRegistry::new();
        let mut text = types.declare("Text", None);
        let _a = text.property("color", 0_u32);
        let _b = text.property("color", 0_u32);
    }

    #[test]
    #[should_panic(expected = "already declares property")]
    fn duplicate_inherited_property_name_panics() {
        let mut types = StyleTypeRegistry::new();
        let mut text = types.declare("Text", None);
        let _color = text.property("color", 0_u32);
        let text = text.build();

        let mut heading = types.declare("Heading", Some(text));
        let _shadow = heading.property("color", 0_u32);
    }
}
