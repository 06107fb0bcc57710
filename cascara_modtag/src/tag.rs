// Copyright 2025 the Cascara Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Monotonic version tags and cached-snapshot watches.

use core::fmt;

/// A monotonically increasing version counter.
///
/// A `ModTag` is attached to a mutable value (a style object, a rule list) and
/// incremented whenever the value changes in an observable way. Consumers hold
/// a [`ModTagWatch`] and compare snapshots instead of comparing values, which
/// makes "did anything change since last frame?" a single integer compare.
///
/// The counter only ever moves forward. Equal tags mean "no observed change";
/// unequal tags mean at least one change happened in between.
///
/// # Example
///
/// ```rust
/// use cascara_modtag::ModTag;
///
/// let mut tag = ModTag::new();
/// let before = tag;
/// tag.increment();
/// assert_ne!(tag, before);
/// ```
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModTag(u64);

impl ModTag {
    /// Creates a new tag at version zero.
    #[must_use]
    #[inline]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Returns the raw version number.
    #[must_use]
    #[inline]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Bumps the tag by exactly one.
    #[inline]
    pub fn increment(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }
}

impl fmt::Debug for ModTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ModTag").field(&self.0).finish()
    }
}

/// A cached snapshot of a [`ModTag`] for cheap change detection.
///
/// A fresh watch has no snapshot, so its first [`set`](ModTagWatch::set)
/// always reports a change. This gives newly registered consumers an initial
/// delivery before settling into change-only behavior.
///
/// # Example
///
/// ```rust
/// use cascara_modtag::{ModTag, ModTagWatch};
///
/// let mut tag = ModTag::new();
/// let mut watch = ModTagWatch::new();
///
/// assert!(watch.set(tag));      // initial observation
/// assert!(!watch.set(tag));     // no change
/// tag.increment();
/// assert!(watch.set(tag));      // changed
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ModTagWatch {
    last: Option<u64>,
}

impl ModTagWatch {
    /// Creates a watch with no snapshot.
    #[must_use]
    #[inline]
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Records the given tag and returns `true` iff it differs from the
    /// previous snapshot (or no snapshot existed).
    pub fn set(&mut self, tag: ModTag) -> bool {
        let changed = self.last != Some(tag.value());
        self.last = Some(tag.value());
        changed
    }

    /// Returns `true` if the watch has observed a tag at least once.
    #[must_use]
    #[inline]
    pub const fn is_set(&self) -> bool {
        self.last.is_some()
    }

    /// Forgets the snapshot, so the next [`set`](ModTagWatch::set) reports a
    /// change again.
    #[inline]
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn tag_starts_at_zero() {
        let tag = ModTag::new();
        assert_eq!(tag.value(), 0);
        assert_eq!(tag, ModTag::default());
    }

    #[test]
    fn tag_increments_by_one() {
        let mut tag = ModTag::new();
        tag.increment();
        assert_eq!(tag.value(), 1);
        tag.increment();
        assert_eq!(tag.value(), 2);
    }

    #[test]
    fn tag_debug() {
        let tag = ModTag::new();
        assert_eq!(format!("{:?}", tag), "ModTag(0)");
    }

    #[test]
    fn watch_initial_set_reports_change() {
        let tag = ModTag::new();
        let mut watch = ModTagWatch::new();
        assert!(!watch.is_set());
        assert!(watch.set(tag));
        assert!(watch.is_set());
    }

    #[test]
    fn watch_detects_changes_only() {
        let mut tag = ModTag::new();
        let mut watch = ModTagWatch::new();

        assert!(watch.set(tag));
        assert!(!watch.set(tag));
        assert!(!watch.set(tag));

        tag.increment();
        assert!(watch.set(tag));
        assert!(!watch.set(tag));
    }

    #[test]
    fn watch_reset_forgets_snapshot() {
        let tag = ModTag::new();
        let mut watch = ModTagWatch::new();

        assert!(watch.set(tag));
        watch.reset();
        assert!(!watch.is_set());
        assert!(watch.set(tag));
    }
}
