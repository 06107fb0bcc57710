// Copyright 2025 the Cascara Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Style objects and their shared handle.
//!
//! A [`StyleObject`] is an ordered, fixed collection of property slots plus a
//! [`ModTag`] and a [`ChangeSignal`]. The slot set is cloned from the type's
//! declared layout at construction and never grows or shrinks afterwards.
//!
//! [`SharedStyle`] is the handle the rest of the system passes around:
//! `Rc<RefCell<StyleObject>>` behind a newtype, with typed accessors that
//! maintain the tag/signal invariants. Everything is single-threaded; the
//! `RefCell` discipline is "shared borrows while walking, one mutable borrow
//! for write-back".

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Ref, RefCell, RefMut};
use core::fmt;
use smallvec::SmallVec;

use cascara_modtag::{ChangeSignal, ListenerId, ModTag};

use crate::filter::StyleFilter;
use crate::id::StyleProp;
use crate::slot::{ErasedSlot, StyleProperty};
use crate::types::{StyleTypeId, StyleTypeRegistry};

/// Inline slot capacity; most style types declare fewer than 8 properties.
const INLINE_SLOTS: usize = 8;

/// An ordered, fixed collection of property slots with change tracking.
///
/// The `mod_tag` increases by exactly one per call that changes at least one
/// calculated value, and never decreases. The `priority` and `filter` fields
/// are authored defaults consumed by
/// [`StyleRule::of`](crate::StyleRule::of); placement metadata on an explicit
/// rule always wins over them.
#[derive(Debug)]
pub struct StyleObject {
    type_id: StyleTypeId,
    slots: SmallVec<[ErasedSlot; INLINE_SLOTS]>,
    mod_tag: ModTag,
    changed: ChangeSignal,
    priority: f32,
    filter: StyleFilter,
}

impl StyleObject {
    /// Creates an object of the given type with all slots at their defaults.
    ///
    /// # Panics
    ///
    /// Panics if `type_id` is not registered in `types`.
    #[must_use]
    pub fn new(types: &StyleTypeRegistry, type_id: StyleTypeId) -> Self {
        Self {
            type_id,
            slots: SmallVec::from_vec(types.instantiate(type_id)),
            mod_tag: ModTag::new(),
            changed: ChangeSignal::new(),
            priority: 0.0,
            filter: StyleFilter::Always,
        }
    }

    /// Returns the object's style type.
    #[must_use]
    #[inline]
    pub fn type_id(&self) -> StyleTypeId {
        self.type_id
    }

    /// Returns the current modification tag.
    #[must_use]
    #[inline]
    pub fn mod_tag(&self) -> ModTag {
        self.mod_tag
    }

    /// Returns the authored default priority.
    #[must_use]
    #[inline]
    pub fn priority(&self) -> f32 {
        self.priority
    }

    /// Sets the authored default priority.
    #[inline]
    pub fn set_priority(&mut self, priority: f32) {
        self.priority = priority;
    }

    /// Returns the authored default filter.
    #[must_use]
    #[inline]
    pub fn filter(&self) -> &StyleFilter {
        &self.filter
    }

    /// Sets the authored default filter.
    #[inline]
    pub fn set_filter(&mut self, filter: StyleFilter) {
        self.filter = filter;
    }

    /// Returns the number of property slots.
    #[must_use]
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Returns the slot at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[must_use]
    #[inline]
    pub fn slot(&self, index: usize) -> &ErasedSlot {
        &self.slots[index]
    }

    /// Returns the slot at `index`, mutably.
    ///
    /// Mutating a slot directly does not bump the mod tag; callers that
    /// change a calculated value must follow up with
    /// [`mark_changed`](Self::mark_changed).
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[must_use]
    #[inline]
    pub fn slot_mut(&mut self, index: usize) -> &mut ErasedSlot {
        &mut self.slots[index]
    }

    /// Returns the typed property at the handle's slot.
    ///
    /// # Panics
    ///
    /// Panics if the handle does not belong to this object's type layout or
    /// names a different value type (a configuration error).
    #[must_use]
    pub fn property<T: Clone + PartialEq + 'static>(
        &self,
        prop: StyleProp<T>,
    ) -> &StyleProperty<T> {
        self.slots
            .get(prop.index().index() as usize)
            .and_then(ErasedSlot::as_property)
            .unwrap_or_else(|| {
                panic!(
                    "no {} slot at {:?} on style type {:?}",
                    core::any::type_name::<T>(),
                    prop.index(),
                    self.type_id
                )
            })
    }

    /// Sets a property's explicit value.
    ///
    /// Bumps the mod tag iff the calculated output changed. Returns `true`
    /// on change so shared handles can fire the change signal after
    /// releasing their borrow.
    ///
    /// # Panics
    ///
    /// Panics if the handle does not belong to this object's type layout.
    pub fn set<T: Clone + PartialEq + 'static>(&mut self, prop: StyleProp<T>, value: T) -> bool {
        let changed = self.property_mut(prop).set(value);
        if changed {
            self.mark_changed();
        }
        changed
    }

    /// Resets a property to its default (no explicit, no calculated value).
    ///
    /// Bumps the mod tag iff the calculated output changed.
    ///
    /// # Panics
    ///
    /// Panics if the handle does not belong to this object's type layout.
    pub fn clear<T: Clone + PartialEq + 'static>(&mut self, prop: StyleProp<T>) -> bool {
        let changed = self.property_mut(prop).clear();
        if changed {
            self.mark_changed();
        }
        changed
    }

    /// Bumps the mod tag by exactly one.
    ///
    /// Used by cascade resolution after accumulating per-slot change bools,
    /// so one calculation never bumps the tag more than once.
    #[inline]
    pub fn mark_changed(&mut self) {
        self.mod_tag.increment();
    }

    /// Returns the change signal for subscription management.
    #[must_use]
    #[inline]
    pub fn changed(&mut self) -> &mut ChangeSignal {
        &mut self.changed
    }

    /// Clones the current change-listener list for borrow-safe delivery.
    #[must_use]
    pub fn changed_snapshot(&self) -> Vec<Rc<dyn Fn()>> {
        self.changed.snapshot()
    }

    fn property_mut<T: Clone + PartialEq + 'static>(
        &mut self,
        prop: StyleProp<T>,
    ) -> &mut StyleProperty<T> {
        let type_id = self.type_id;
        self.slots
            .get_mut(prop.index().index() as usize)
            .and_then(ErasedSlot::as_property_mut)
            .unwrap_or_else(|| {
                panic!(
                    "no {} slot at {:?} on style type {:?}",
                    core::any::type_name::<T>(),
                    prop.index(),
                    type_id
                )
            })
    }
}

/// A shared, single-threaded handle to a [`StyleObject`].
///
/// Cloning is cheap (`Rc`). The typed accessors keep the invariants: an
/// explicit set is visible immediately, the mod tag bumps once per changing
/// call, and the change signal fires after interior borrows are released.
///
/// # Example
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
/// let before = style.mod_tag();
///
/// style.set(size, 16.0);
/// assert_eq!(style.get(size), 16.0);
/// assert_ne!(style.mod_tag(), before);
///
/// // Setting the same value again is a no-op.
/// let tag = style.mod_tag();
/// style.set(size, 16.0);
/// assert_eq!(style.mod_tag(), tag);
/// ```
#[derive(Clone)]
pub struct SharedStyle {
    inner: Rc<RefCell<StyleObject>>,
}

impl SharedStyle {
    /// Creates a new object of the given type and wraps it.
    #[must_use]
    pub fn new(types: &StyleTypeRegistry, type_id: StyleTypeId) -> Self {
        Self::from_object(StyleObject::new(types, type_id))
    }

    /// Wraps an existing object.
    #[must_use]
    pub fn from_object(object: StyleObject) -> Self {
        Self {
            inner: Rc::new(RefCell::new(object)),
        }
    }

    /// Returns `true` if both handles refer to the same object.
    #[must_use]
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Borrows the underlying object.
    ///
    /// # Panics
    ///
    /// Panics if the object is mutably borrowed.
    #[must_use]
    pub fn borrow(&self) -> Ref<'_, StyleObject> {
        self.inner.borrow()
    }

    /// Mutably borrows the underlying object.
    ///
    /// Callers that change calculated values through this borrow are
    /// responsible for firing [`emit_changed`](Self::emit_changed) after the
    /// borrow is released.
    ///
    /// # Panics
    ///
    /// Panics if the object is already borrowed.
    #[must_use]
    pub fn borrow_mut(&self) -> RefMut<'_, StyleObject> {
        self.inner.borrow_mut()
    }

    /// Returns the object's style type.
    #[must_use]
    pub fn type_id(&self) -> StyleTypeId {
        self.inner.borrow().type_id()
    }

    /// Returns the current modification tag.
    #[must_use]
    pub fn mod_tag(&self) -> ModTag {
        self.inner.borrow().mod_tag()
    }

    /// Returns a clone of a property's calculated value.
    pub fn get<T: Clone + PartialEq + 'static>(&self, prop: StyleProp<T>) -> T {
        self.inner.borrow().property(prop).calculated().clone()
    }

    /// Returns `true` if the property has an explicit value.
    #[must_use]
    pub fn is_explicit<T: Clone + PartialEq + 'static>(&self, prop: StyleProp<T>) -> bool {
        self.inner.borrow().property(prop).is_explicit()
    }

    /// Returns `true` if the property has a calculated value.
    #[must_use]
    pub fn is_calculated<T: Clone + PartialEq + 'static>(&self, prop: StyleProp<T>) -> bool {
        self.inner.borrow().property(prop).is_calculated()
    }

    /// Sets a property's explicit value, firing the change signal on change.
    pub fn set<T: Clone + PartialEq + 'static>(&self, prop: StyleProp<T>, value: T) {
        let changed = self.inner.borrow_mut().set(prop, value);
        if changed {
            self.emit_changed();
        }
    }

    /// Resets a property to its default, firing the change signal on change.
    pub fn clear<T: Clone + PartialEq + 'static>(&self, prop: StyleProp<T>) {
        let changed = self.inner.borrow_mut().clear(prop);
        if changed {
            self.emit_changed();
        }
    }

    /// Registers a change listener.
    pub fn subscribe(&self, listener: Rc<dyn Fn()>) -> ListenerId {
        self.inner.borrow_mut().changed().subscribe(listener)
    }

    /// Removes a change listener. Returns `true` if it existed.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.inner.borrow_mut().changed().unsubscribe(id)
    }

    /// Fires the change signal.
    ///
    /// The listener list is snapshotted before delivery, so listeners may
    /// freely borrow the object.
    pub fn emit_changed(&self) {
        let listeners = self.inner.borrow().changed_snapshot();
        for listener in &listeners {
            listener();
        }
    }
}

impl fmt::Debug for SharedStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(object) => f.debug_tuple("SharedStyle").field(&*object).finish(),
            Err(_) => f.write_str("SharedStyle(<borrowed>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::StyleProp;
    use core::cell::Cell;

    fn text_type(types: &mut StyleTypeRegistry) -> (StyleTypeId, StyleProp<u32>, StyleProp<f64>) {
        let mut text = types.declare("Text", None);
        let color = text.property("color", 0x000000_u32);
        let size = text.property("size", 12.0_f64);
        (text.build(), color, size)
    }

    #[test]
    fn object_starts_at_defaults() {
        let mut types = StyleTypeRegistry::new();
        let (text, color, size) = text_type(&mut types);

        let object = StyleObject::new(&types, text);
        assert_eq!(object.slot_count(), 2);
        assert_eq!(*object.property(color).calculated(), 0x000000);
        assert_eq!(*object.property(size).calculated(), 12.0);
        assert_eq!(object.mod_tag(), ModTag::new());
    }

    #[test]
    fn object_set_bumps_tag_once_per_change() {
        let mut types = StyleTypeRegistry::new();
        let (text, color, _) = text_type(&mut types);

        let mut object = StyleObject::new(&types, text);
        assert!(object.set(color, 0xFF0000));
        assert_eq!(object.mod_tag().value(), 1);

        // Same value: no change, no bump.
        assert!(!object.set(color, 0xFF0000));
        assert_eq!(object.mod_tag().value(), 1);

        assert!(object.clear(color));
        assert_eq!(object.mod_tag().value(), 2);
    }

    #[test]
    #[should_panic(expected = "slot at")]
    fn object_wrong_typed_handle_panics() {
        let mut types = StyleTypeRegistry::new();
        let (text, color, _) = text_type(&mut types);

        let object = StyleObject::new(&types, text);
        // Forge a handle at color's index with the wrong type.
        let wrong: StyleProp<f64> = StyleProp::from_index(color.index());
        let _ = object.property(wrong);
    }

    #[test]
    fn shared_style_set_fires_signal_on_change_only() {
        let mut types = StyleTypeRegistry::new();
        let (text, color, _) = text_type(&mut types);

        let style = SharedStyle::new(&types, text);
        let fired = Rc::new(Cell::new(0_u32));

        let fired2 = fired.clone();
        style.subscribe(Rc::new(move || fired2.set(fired2.get() + 1)));

        style.set(color, 0xFF0000);
        assert_eq!(fired.get(), 1);

        style.set(color, 0xFF0000);
        assert_eq!(fired.get(), 1);

        style.clear(color);
        assert_eq!(fired.get(), 2);
    }

    #[test]
    fn shared_style_listener_may_read_the_style() {
        let mut types = StyleTypeRegistry::new();
        let (text, color, _) = text_type(&mut types);

        let style = SharedStyle::new(&types, text);
        let seen = Rc::new(Cell::new(0_u32));

        let style2 = style.clone();
        let seen2 = seen.clone();
        style.subscribe(Rc::new(move || seen2.set(style2.get(color))));

        style.set(color, 0x00FF00);
        assert_eq!(seen.get(), 0x00FF00);
    }

    #[test]
    fn shared_style_unsubscribe() {
        let mut types = StyleTypeRegistry::new();
        let (text, color, _) = text_type(&mut types);

        let style = SharedStyle::new(&types, text);
        let fired = Rc::new(Cell::new(0_u32));

        let fired2 = fired.clone();
        let id = style.subscribe(Rc::new(move || fired2.set(fired2.get() + 1)));
        assert!(style.unsubscribe(id));
        assert!(!style.unsubscribe(id));

        style.set(color, 0xFF0000);
        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn shared_style_ptr_eq() {
        let mut types = StyleTypeRegistry::new();
        let (text, _, _) = text_type(&mut types);

        let a = SharedStyle::new(&types, text);
        let b = a.clone();
        let c = SharedStyle::new(&types, text);

        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
    }
}
