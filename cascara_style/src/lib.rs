// Copyright 2025 the Cascara Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cascara Style: typed style objects, properties, and rules.
//!
//! This crate provides the data model consumed by `cascara_cascade`:
//!
//! - **Style types** ([`StyleTypeRegistry`], [`StyleTypeId`]): named style
//!   types with single-inheritance `extends` chains. A type's property set is
//!   declared exactly once at registration; a subtype's slots extend its
//!   supertype's slots as a strict prefix, so property handles obtained for a
//!   supertype remain valid for every subtype object.
//! - **Properties** ([`StyleProperty`], [`StyleProp`]): one named, typed slot
//!   holding a default, an optional explicit (author-set) value, and a
//!   computed calculated value. The calculated value always falls back to the
//!   default when no resolution has set it.
//! - **Style objects** ([`StyleObject`], [`SharedStyle`]): an ordered, fixed
//!   collection of property slots plus a [`ModTag`](cascara_modtag::ModTag)
//!   and a change signal. `SharedStyle` is the single-threaded shared handle
//!   used by rules and registries.
//! - **Filters and rules** ([`StyleFilter`], [`StyleRule`], [`StyleTag`]):
//!   the declarative unit placed on a tree node, binding a style object to a
//!   filter predicate and a priority for application to descendants.
//!
//! ## Quick Start
//!
//! ```rust
//! use cascara_style::{SharedStyle, StyleTypeRegistry};
//!
//! let mut types = StyleTypeRegistry::new();
//! let mut text = types.declare("Text", None);
//! let color = text.property("color", 0x000000_u32);
//! let size = text.property("size", 12.0_f64);
//! let text = text.build();
//!
//! let style = SharedStyle::new(&types, text);
//!
//! // Nothing set: calculated values fall back to defaults.
//! assert_eq!(style.get(color), 0x000000);
//!
//! // An explicit value is visible immediately, before any cascade runs.
//! style.set(size, 16.0);
//! assert_eq!(style.get(size), 16.0);
//! ```
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

mod filter;
mod id;
mod object;
mod rule;
mod slot;
mod types;

pub use filter::{FilterInputs, StyleFilter, StyleTag, TagSet};
pub use id::{SlotIndex, StyleProp};
pub use object::{SharedStyle, StyleObject};
pub use rule::StyleRule;
pub use slot::{ErasedSlot, StyleProperty};
pub use types::{StyleTypeBuilder, StyleTypeId, StyleTypeRegistry};
