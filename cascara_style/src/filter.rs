// Copyright 2025 the Cascara Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Style tags and rule filter predicates.
//!
//! A filter decides whether a rule applies to a given host node. Filters
//! match against a [`FilterInputs`] snapshot of the host rather than the node
//! itself, which keeps the cascade free of node-type generics at this layer.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;
use core::iter::FromIterator;

/// A marker attached to a node, used purely for rule-filter matching.
///
/// Tags are application-defined and intentionally unbounded, analogous to a
/// CSS class.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StyleTag(pub u32);

/// An owned, sorted, deduplicated set of style tags.
///
/// This representation is optimized for small sets and unbounded
/// vocabularies: membership is O(log n), subset checks are O(n+m) via a
/// merge walk.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagSet(Box<[StyleTag]>);

impl TagSet {
    /// Constructs a set from an iterator, sorting and deduplicating.
    #[must_use]
    pub fn from_tags(iter: impl IntoIterator<Item = StyleTag>) -> Self {
        let mut tags: Vec<StyleTag> = iter.into_iter().collect();
        tags.sort();
        tags.dedup();
        Self(tags.into_boxed_slice())
    }

    /// Returns `true` if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of tags in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the set as a sorted slice.
    #[must_use]
    pub fn as_slice(&self) -> &[StyleTag] {
        &self.0
    }

    /// Returns `true` if this set contains the given tag.
    #[must_use]
    pub fn contains(&self, tag: StyleTag) -> bool {
        self.0.binary_search(&tag).is_ok()
    }

    /// Returns `true` if every tag in this set appears in `other`.
    ///
    /// `other` must be sorted and deduplicated.
    #[must_use]
    pub fn is_subset_of_slice(&self, other: &[StyleTag]) -> bool {
        is_subset(&self.0, other)
    }
}

impl FromIterator<StyleTag> for TagSet {
    fn from_iter<I: IntoIterator<Item = StyleTag>>(iter: I) -> Self {
        Self::from_tags(iter)
    }
}

/// A borrowed snapshot of the filter-relevant state of a host node.
///
/// The `tags` slice must be sorted and deduplicated.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FilterInputs<'a> {
    /// Sorted, unique style tags on the host.
    pub tags: &'a [StyleTag],
}

impl FilterInputs<'static> {
    /// Empty filter inputs (no tags).
    pub const EMPTY: Self = Self { tags: &[] };
}

impl<'a> FilterInputs<'a> {
    /// Constructs filter inputs from a borrowed tag slice.
    ///
    /// # Panics (debug only)
    ///
    /// Panics in debug builds if the slice is not sorted and deduplicated.
    #[must_use]
    pub fn new(tags: &'a [StyleTag]) -> Self {
        debug_assert!(is_sorted_unique(tags), "`tags` must be sorted and unique");
        Self { tags }
    }
}

/// A rule filter predicate over [`FilterInputs`].
///
/// The default filter is [`Always`](StyleFilter::Always).
///
/// # Example
///
/// ```rust
/// use cascara_style::{FilterInputs, StyleFilter, StyleTag, TagSet};
///
/// const PRIMARY: StyleTag = StyleTag(1);
/// const DANGER: StyleTag = StyleTag(2);
///
/// let filter = StyleFilter::Tags(TagSet::from_tags([PRIMARY]));
///
/// let tags = [PRIMARY, DANGER];
/// assert!(filter.matches(&FilterInputs::new(&tags)));
/// assert!(!filter.matches(&FilterInputs::EMPTY));
/// ```
#[derive(Clone, Default)]
pub enum StyleFilter {
    /// Matches every host.
    #[default]
    Always,
    /// Matches hosts carrying all listed tags.
    Tags(TagSet),
    /// An arbitrary predicate over the host snapshot.
    Custom(Rc<dyn Fn(&FilterInputs<'_>) -> bool>),
}

impl StyleFilter {
    /// Returns `true` if this filter accepts the given host snapshot.
    #[must_use]
    pub fn matches(&self, inputs: &FilterInputs<'_>) -> bool {
        match self {
            Self::Always => true,
            Self::Tags(required) => required.is_subset_of_slice(inputs.tags),
            Self::Custom(predicate) => predicate(inputs),
        }
    }
}

impl PartialEq for StyleFilter {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Always, Self::Always) => true,
            (Self::Tags(a), Self::Tags(b)) => a == b,
            // Custom predicates compare by identity.
            (Self::Custom(a), Self::Custom(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for StyleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => f.write_str("Always"),
            Self::Tags(tags) => f.debug_tuple("Tags").field(tags).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

fn is_sorted_unique(slice: &[StyleTag]) -> bool {
    slice
        .windows(2)
        .all(|w| w[0].cmp(&w[1]) == core::cmp::Ordering::Less)
}

fn is_subset(needles: &[StyleTag], haystack: &[StyleTag]) -> bool {
    if needles.is_empty() {
        return true;
    }
    if haystack.is_empty() {
        return false;
    }

    let mut i = 0;
    let mut j = 0;
    while i < needles.len() && j < haystack.len() {
        match needles[i].cmp(&haystack[j]) {
            core::cmp::Ordering::Less => return false,
            core::cmp::Ordering::Equal => {
                i += 1;
                j += 1;
            }
            core::cmp::Ordering::Greater => j += 1,
        }
    }
    i == needles.len()
}
