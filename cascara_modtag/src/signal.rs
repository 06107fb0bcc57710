// Copyright 2025 the Cascara Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Explicit synchronous change-notification lists.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

/// A handle identifying a single subscription on a [`ChangeSignal`].
///
/// Returned by [`ChangeSignal::subscribe`] and consumed by
/// [`ChangeSignal::unsubscribe`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u32);

/// An explicit, synchronous callback list.
///
/// `ChangeSignal` is the owned replacement for an ambient observer framework:
/// the owner of a mutable value holds the signal and fires it when the value's
/// [`ModTag`](crate::ModTag) is bumped. Delivery is synchronous on the owning
/// thread; there is no cross-thread machinery.
///
/// Listeners are `Rc<dyn Fn()>` so the owner can snapshot the list and invoke
/// callbacks after releasing any interior-mutability borrows it holds. See
/// [`snapshot`](ChangeSignal::snapshot).
///
/// # Example
///
/// ```rust
/// use cascara_modtag::ChangeSignal;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let mut signal = ChangeSignal::new();
/// let fired = Rc::new(Cell::new(0_u32));
///
/// let fired2 = fired.clone();
/// let id = signal.subscribe(Rc::new(move || fired2.set(fired2.get() + 1)));
///
/// signal.emit();
/// assert_eq!(fired.get(), 1);
///
/// assert!(signal.unsubscribe(id));
/// signal.emit();
/// assert_eq!(fired.get(), 1);
/// ```
#[derive(Default)]
pub struct ChangeSignal {
    listeners: Vec<(ListenerId, Rc<dyn Fn()>)>,
    next_id: u32,
}

impl ChangeSignal {
    /// Creates an empty signal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of registered listeners.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Returns `true` if no listeners are registered.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Registers a listener and returns its subscription handle.
    pub fn subscribe(&mut self, listener: Rc<dyn Fn()>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.listeners.push((id, listener));
        id
    }

    /// Removes a listener.
    ///
    /// Returns `true` if the subscription existed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        match self.listeners.iter().position(|(lid, _)| *lid == id) {
            Some(index) => {
                self.listeners.remove(index);
                true
            }
            None => false,
        }
    }

    /// Invokes all listeners in subscription order.
    pub fn emit(&self) {
        for (_, listener) in &self.listeners {
            listener();
        }
    }

    /// Clones the current listener list.
    ///
    /// Owners that keep the signal behind a `RefCell` should snapshot the
    /// list, release the borrow, and then invoke the callbacks, so listeners
    /// may read the owner without a borrow conflict.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Rc<dyn Fn()>> {
        self.listeners
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect()
    }
}

impl fmt::Debug for ChangeSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeSignal")
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    #[test]
    fn signal_empty() {
        let signal = ChangeSignal::new();
        assert!(signal.is_empty());
        assert_eq!(signal.len(), 0);
        signal.emit();
    }

    #[test]
    fn signal_subscribe_emit() {
        let mut signal = ChangeSignal::new();
        let count = Rc::new(Cell::new(0_u32));

        let count2 = count.clone();
        signal.subscribe(Rc::new(move || count2.set(count2.get() + 1)));

        signal.emit();
        signal.emit();
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn signal_unsubscribe() {
        let mut signal = ChangeSignal::new();
        let count = Rc::new(Cell::new(0_u32));

        let count2 = count.clone();
        let id = signal.subscribe(Rc::new(move || count2.set(count2.get() + 1)));

        assert!(signal.unsubscribe(id));
        assert!(!signal.unsubscribe(id));

        signal.emit();
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn signal_delivery_order_is_subscription_order() {
        let mut signal = ChangeSignal::new();
        let order = Rc::new(Cell::new(0_u32));

        let o1 = order.clone();
        signal.subscribe(Rc::new(move || {
            assert_eq!(o1.get(), 0);
            o1.set(1);
        }));
        let o2 = order.clone();
        signal.subscribe(Rc::new(move || {
            assert_eq!(o2.get(), 1);
            o2.set(2);
        }));

        signal.emit();
        assert_eq!(order.get(), 2);
    }

    #[test]
    fn signal_snapshot_outlives_list_mutation() {
        let mut signal = ChangeSignal::new();
        let count = Rc::new(Cell::new(0_u32));

        let count2 = count.clone();
        let id = signal.subscribe(Rc::new(move || count2.set(count2.get() + 1)));

        let snapshot = signal.snapshot();
        signal.unsubscribe(id);

        for listener in &snapshot {
            listener();
        }
        assert_eq!(count.get(), 1);
    }
}
