// Copyright 2025 the Cascara Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Style rules: a placement of a style onto a node.

use core::fmt;

use crate::filter::{FilterInputs, StyleFilter};
use crate::object::SharedStyle;

/// A placement of a [`SharedStyle`] onto a node, with placement-local
/// priority and filter.
///
/// The rule's priority and filter belong to the placement, not the style:
/// the same style may be attached to several nodes under different
/// priorities and filters. [`StyleRule::of`] copies the style's authored
/// defaults into the placement at construction time; changing the style's
/// defaults afterwards does not affect existing rules.
#[derive(Clone, Debug)]
pub struct StyleRule {
    style: SharedStyle,
    filter: StyleFilter,
    priority: f32,
}

impl StyleRule {
    /// Creates a rule with an explicit filter and priority.
    #[must_use]
    pub fn new(style: SharedStyle, filter: StyleFilter, priority: f32) -> Self {
        Self {
            style,
            filter,
            priority,
        }
    }

    /// Creates a rule adopting the style's authored default priority and
    /// filter.
    #[must_use]
    pub fn of(style: SharedStyle) -> Self {
        let (filter, priority) = {
            let object = style.borrow();
            (object.filter().clone(), object.priority())
        };
        Self {
            style,
            filter,
            priority,
        }
    }

    /// Returns the placed style.
    #[must_use]
    #[inline]
    pub fn style(&self) -> &SharedStyle {
        &self.style
    }

    /// Returns the placement's filter.
    #[must_use]
    #[inline]
    pub fn filter(&self) -> &StyleFilter {
        &self.filter
    }

    /// Returns the placement's priority.
    #[must_use]
    #[inline]
    pub fn priority(&self) -> f32 {
        self.priority
    }

    /// Returns `true` if the rule's filter accepts the given host snapshot.
    #[must_use]
    pub fn matches(&self, inputs: &FilterInputs<'_>) -> bool {
        self.filter.matches(inputs)
    }
}

impl PartialEq for StyleRule {
    /// Rules are equal when they place the same style object (by identity)
    /// with the same priority and filter.
    fn eq(&self, other: &Self) -> bool {
        self.style.ptr_eq(&other.style)
            && self.priority.to_bits() == other.priority.to_bits()
            && self.filter == other.filter
    }
}

impl fmt::Display for StyleRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rule(priority: {}, filter: {:?})",
            self.priority, self.filter
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{StyleTag, TagSet};
    use crate::types::StyleTypeRegistry;

    fn style() -> SharedStyle {
        let mut types = StyleTypeRegistry::new();
        let mut text = types.declare("Text", None);
        let _ = text.property("size", 12.0_f64);
        let text = text.build();
        SharedStyle::new(&types, text)
    }

    #[test]
    fn of_adopts_authored_defaults() {
        let style = style();
        {
            let mut object = style.borrow_mut();
            object.set_priority(5.0);
            object.set_filter(StyleFilter::Tags(TagSet::from_tags([StyleTag(1)])));
        }

        let rule = StyleRule::of(style);
        assert_eq!(rule.priority(), 5.0);
        assert_eq!(
            *rule.filter(),
            StyleFilter::Tags(TagSet::from_tags([StyleTag(1)]))
        );
    }

    #[test]
    fn of_snapshots_defaults_at_construction() {
        let style = style();
        let rule = StyleRule::of(style.clone());

        style.borrow_mut().set_priority(9.0);
        assert_eq!(rule.priority(), 0.0);
    }

    #[test]
    fn matches_delegates_to_filter() {
        let style = style();
        let rule = StyleRule::new(
            style,
            StyleFilter::Tags(TagSet::from_tags([StyleTag(2)])),
            0.0,
        );

        let tags = [StyleTag(1), StyleTag(2)];
        assert!(rule.matches(&FilterInputs::new(&tags)));
        assert!(!rule.matches(&FilterInputs::EMPTY));
    }

    #[test]
    fn equality_is_identity_priority_filter() {
        let style = style();
        let a = StyleRule::new(style.clone(), StyleFilter::Always, 1.0);
        let b = StyleRule::new(style.clone(), StyleFilter::Always, 1.0);
        assert_eq!(a, b);

        let other_priority = StyleRule::new(style.clone(), StyleFilter::Always, 2.0);
        assert_ne!(a, other_priority);

        let other_style = StyleRule::new(self::style(), StyleFilter::Always, 1.0);
        assert_ne!(a, other_style);

        let _ = style;
    }
}
