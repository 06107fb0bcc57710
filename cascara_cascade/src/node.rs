// Copyright 2025 the Cascara Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The tree-side contract consumed by cascade resolution.
//!
//! The cascade does not own or know the application's tree. It sees nodes
//! through [`StyleableNode`] and reaches ancestors through a key-based
//! [`NodeLookup`], so the style-parent relation may diverge from the display
//! tree (e.g. popups styled as if inside their anchor's subtree).

use cascara_style::{StyleRule, StyleTag};

/// What cascade resolution needs to know about one tree node.
///
/// `style_parent` is a key, not a reference: the ancestry walk treats it as
/// read-only borrowed access via [`NodeLookup`] and never mutates an ancestor
/// while walking it. The relation must be acyclic.
pub trait StyleableNode<K: Copy> {
    /// This node's key.
    fn key(&self) -> K;

    /// The key of the node's style-parent, if any.
    fn style_parent(&self) -> Option<K>;

    /// The node's style tags, sorted and deduplicated.
    fn style_tags(&self) -> &[StyleTag];

    /// The node's locally declared style rules, in declaration order.
    fn style_rules(&self) -> &[StyleRule];
}

/// Resolves a node key to a borrowed node during the ancestry walk.
///
/// The blanket implementation lets callers pass a closure over whatever owns
/// the tree (a slab, an arena, a map):
///
/// ```rust,ignore
/// let lookup = |key: usize| tree.get(key);
/// calculator.calculate(&types, &host, &target, &lookup, None);
/// ```
pub trait NodeLookup<'a, K: Copy + 'a> {
    /// The node type this lookup yields.
    type Node: StyleableNode<K> + 'a;

    /// Looks up the node for `key`.
    fn node(&self, key: K) -> Option<&'a Self::Node>;
}

impl<'a, K, N, F> NodeLookup<'a, K> for F
where
    K: Copy + 'a,
    N: StyleableNode<K> + 'a,
    F: Fn(K) -> Option<&'a N>,
{
    type Node = N;

    #[inline]
    fn node(&self, key: K) -> Option<&'a N> {
        self(key)
    }
}
