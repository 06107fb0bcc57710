// Copyright 2025 the Cascara Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Two-tier property slots and their type-erased storage.
//!
//! A [`StyleProperty`] holds three values: an immutable default, an optional
//! explicit (author-set) value, and a calculated value written by cascade
//! resolution. The calculated value falls back to the default whenever no
//! resolution has set it, so reading a slot never requires a fallback branch
//! in the caller.
//!
//! [`ErasedSlot`] stores a `StyleProperty<T>` behind a trait object so a
//! [`StyleObject`](crate::StyleObject) can hold a heterogeneous, ordered slot
//! vector. The erased surface exposes exactly the operations the cascade
//! needs; typed access goes through
//! [`as_property`](ErasedSlot::as_property).

use alloc::boxed::Box;
use core::any::{Any, TypeId};
use core::fmt;

/// One named, typed style slot.
///
/// Invariants:
///
/// - the calculated value equals the default whenever
///   [`is_calculated`](StyleProperty::is_calculated) is `false`;
/// - setting an explicit value also sets the calculated value, so a directly
///   assigned value is visible before any cascade runs.
///
/// All mutators return `true` iff the *calculated* output (what
/// [`calculated`](StyleProperty::calculated) returns) changed, compared by
/// value equality. The owning style object accumulates these bools into a
/// single `ModTag` bump; slots never notify on their own.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleProperty<T> {
    default: T,
    explicit: Option<T>,
    calculated: Option<T>,
}

impl<T: Clone + PartialEq + 'static> StyleProperty<T> {
    /// Creates a slot with the given default and nothing set.
    #[must_use]
    pub const fn new(default: T) -> Self {
        Self {
            default,
            explicit: None,
            calculated: None,
        }
    }

    /// Returns the default value.
    #[must_use]
    #[inline]
    pub fn default_value(&self) -> &T {
        &self.default
    }

    /// Returns the calculated value, falling back to the default.
    #[must_use]
    #[inline]
    pub fn calculated(&self) -> &T {
        self.calculated.as_ref().unwrap_or(&self.default)
    }

    /// Returns the explicit value, if one is set.
    #[must_use]
    #[inline]
    pub fn explicit(&self) -> Option<&T> {
        self.explicit.as_ref()
    }

    /// Returns `true` if an explicit value is set.
    #[must_use]
    #[inline]
    pub fn is_explicit(&self) -> bool {
        self.explicit.is_some()
    }

    /// Returns `true` if a calculated value is set.
    #[must_use]
    #[inline]
    pub fn is_calculated(&self) -> bool {
        self.calculated.is_some()
    }

    /// Sets the explicit value, which also becomes the calculated value.
    ///
    /// Returns `true` iff the calculated output changed.
    pub fn set(&mut self, value: T) -> bool {
        let changed = *self.calculated() != value;
        self.explicit = Some(value.clone());
        self.calculated = Some(value);
        changed
    }

    /// Resets the slot to its default: no explicit, no calculated value.
    ///
    /// Returns `true` iff the calculated output changed.
    pub fn clear(&mut self) -> bool {
        let changed = self
            .calculated
            .as_ref()
            .is_some_and(|current| *current != self.default);
        self.explicit = None;
        self.calculated = None;
        changed
    }

    /// Clears the calculated value unless an explicit override exists.
    ///
    /// Used by the cascade to revert a slot no candidate supplies. A local
    /// explicit value always wins over any cascade result, so a slot with an
    /// explicit value is left untouched.
    ///
    /// Returns `true` iff the calculated output changed.
    pub fn clear_calculated_if_not_explicit(&mut self) -> bool {
        if self.explicit.is_some() {
            return false;
        }
        let changed = self
            .calculated
            .as_ref()
            .is_some_and(|current| *current != self.default);
        self.calculated = None;
        changed
    }

    /// Sets the calculated value only; the cascade's write-back path.
    ///
    /// Returns `true` iff the calculated output changed.
    pub fn set_calculated(&mut self, value: T) -> bool {
        let changed = *self.calculated() != value;
        self.calculated = Some(value);
        changed
    }
}

/// A type-erased [`StyleProperty`] slot.
///
/// Slots are created from the declared prototype on the
/// [`StyleTypeRegistry`](crate::StyleTypeRegistry) and stored in order on
/// each [`StyleObject`](crate::StyleObject). The erased surface carries the
/// operations cascade resolution needs without knowing the value type.
pub struct ErasedSlot {
    inner: Box<dyn ErasedSlotOps>,
    type_id: TypeId,
}

impl ErasedSlot {
    /// Creates an erased slot from a typed property.
    #[must_use]
    pub fn new<T: Clone + PartialEq + 'static>(property: StyleProperty<T>) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            inner: Box::new(property),
        }
    }

    /// Returns the [`TypeId`] of the slot's value type.
    #[must_use]
    #[inline]
    pub fn value_type(&self) -> TypeId {
        self.type_id
    }

    /// Attempts to view the slot as a typed property.
    ///
    /// Returns `None` if the slot's value type is not `T`.
    #[must_use]
    pub fn as_property<T: Clone + PartialEq + 'static>(&self) -> Option<&StyleProperty<T>> {
        self.inner.as_any().downcast_ref()
    }

    /// Attempts to view the slot as a typed property, mutably.
    #[must_use]
    pub fn as_property_mut<T: Clone + PartialEq + 'static>(
        &mut self,
    ) -> Option<&mut StyleProperty<T>> {
        self.inner.as_any_mut().downcast_mut()
    }

    /// Returns `true` if an explicit value is set.
    #[must_use]
    #[inline]
    pub fn is_explicit(&self) -> bool {
        self.inner.is_explicit()
    }

    /// Returns `true` if a calculated value is set.
    #[must_use]
    #[inline]
    pub fn is_calculated(&self) -> bool {
        self.inner.is_calculated()
    }

    /// Resets the slot to its default. Returns `true` iff the calculated
    /// output changed.
    pub fn clear(&mut self) -> bool {
        self.inner.clear()
    }

    /// Clears the calculated value unless an explicit override exists.
    /// Returns `true` iff the calculated output changed.
    pub fn clear_calculated_if_not_explicit(&mut self) -> bool {
        self.inner.clear_calculated_if_not_explicit()
    }

    /// Copies `source`'s explicit value into this slot's calculated value.
    ///
    /// This is the cascade's cross-candidate transfer. Returns `true` iff the
    /// calculated output changed. If `source` has no explicit value or a
    /// different value type, the slot is left untouched and `false` is
    /// returned; with the prefix slot layout neither happens for candidates
    /// the cascade admits.
    pub fn assign_calculated_from(&mut self, source: &Self) -> bool {
        if self.type_id != source.type_id {
            return false;
        }
        self.inner.assign_calculated_from(source.inner.as_ref())
    }
}

impl Clone for ErasedSlot {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone_boxed(),
            type_id: self.type_id,
        }
    }
}

impl fmt::Debug for ErasedSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedSlot")
            .field("value_type", &self.type_id)
            .field("explicit", &self.is_explicit())
            .field("calculated", &self.is_calculated())
            .finish_non_exhaustive()
    }
}

/// Trait object surface for erased slots.
trait ErasedSlotOps: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn clone_boxed(&self) -> Box<dyn ErasedSlotOps>;
    fn is_explicit(&self) -> bool;
    fn is_calculated(&self) -> bool;
    fn clear(&mut self) -> bool;
    fn clear_calculated_if_not_explicit(&mut self) -> bool;
    fn assign_calculated_from(&mut self, source: &dyn ErasedSlotOps) -> bool;
}

impl<T: Clone + PartialEq + 'static> ErasedSlotOps for StyleProperty<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn clone_boxed(&self) -> Box<dyn ErasedSlotOps> {
        Box::new(self.clone())
    }

    fn is_explicit(&self) -> bool {
        Self::is_explicit(self)
    }

    fn is_calculated(&self) -> bool {
        Self::is_calculated(self)
    }

    fn clear(&mut self) -> bool {
        Self::clear(self)
    }

    fn clear_calculated_if_not_explicit(&mut self) -> bool {
        Self::clear_calculated_if_not_explicit(self)
    }

    fn assign_calculated_from(&mut self, source: &dyn ErasedSlotOps) -> bool {
        let Some(source) = source.as_any().downcast_ref::<Self>() else {
            return false;
        };
        match source.explicit() {
            Some(value) => self.set_calculated(value.clone()),
            None => false,
        }
    }
}
