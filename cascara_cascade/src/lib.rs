// Copyright 2025 the Cascara Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Style cascade resolution for live component trees.
//!
//! This crate computes, for any node in a UI tree, the final calculated
//! values of its bound style objects from the priority- and filter-qualified
//! rules declared on the node's style-parent ancestry. It is the engine
//! behind `cascara_style`'s data model: rules are constructed
//! programmatically, matched with type covariance, ordered by a multi-key
//! precedence sort, and resolved first-match-wins per property.
//!
//! The tree itself stays on the application's side of the fence: nodes are
//! seen through the [`StyleableNode`] trait and reached by key through a
//! [`NodeLookup`], so the style-parent relation is free to diverge from the
//! display tree.
//!
//! # Example
//!
//! ```rust
//! use cascara_cascade::{CascadeCalculator, StyleableNode};
//! use cascara_style::{SharedStyle, StyleFilter, StyleRule, StyleTag, StyleTypeRegistry};
//!
//! struct Node {
//!     key: usize,
//!     parent: Option<usize>,
//!     rules: Vec<StyleRule>,
//! }
//!
//! impl StyleableNode<usize> for Node {
//!     fn key(&self) -> usize {
//!         self.key
//!     }
//!     fn style_parent(&self) -> Option<usize> {
//!         self.parent
//!     }
//!     fn style_tags(&self) -> &[StyleTag] {
//!         &[]
//!     }
//!     fn style_rules(&self) -> &[StyleRule] {
//!         &self.rules
//!     }
//! }
//!
//! let mut types = StyleTypeRegistry::new();
//! let mut text = types.declare("Text", None);
//! let color = text.property("color", 0x000000_u32);
//! let text = text.build();
//!
//! // The root publishes a blue text style for its subtree.
//! let blue = SharedStyle::new(&types, text);
//! blue.set(color, 0x0000FF);
//!
//! let mut root = Node { key: 0, parent: None, rules: Vec::new() };
//! root.rules.push(StyleRule::new(blue, StyleFilter::Always, 0.0));
//! let child = Node { key: 1, parent: Some(0), rules: Vec::new() };
//! let nodes = vec![root, child];
//!
//! // The child's bound text style picks the color up from the root.
//! let bound = SharedStyle::new(&types, text);
//! let lookup = |key: usize| nodes.get(key);
//! let mut calculator = CascadeCalculator::new();
//! calculator.calculate(&types, &nodes[1], &bound, &lookup, None);
//! assert_eq!(bound.get(color), 0x0000FF);
//! ```
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

mod calculate;
mod node;
mod registry;
mod trace;

pub use calculate::{CascadeCalculator, MAX_STYLE_DEPTH};
pub use node::{NodeLookup, StyleableNode};
pub use registry::StyleRegistry;
pub use trace::{CandidateRecord, CascadeTrace};
