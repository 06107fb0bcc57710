// Copyright 2025 the Cascara Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cascara Mod Tag: monotonic version counters and change notification.
//!
//! This crate provides the leaf utilities the rest of cascara builds its
//! incremental-change detection on:
//!
//! - **Version counters** ([`ModTag`]): a monotonically increasing counter
//!   attached to a mutable value. Bumping the tag is the entire cost of
//!   recording "something changed"; no deep comparison is involved.
//! - **Change watches** ([`ModTagWatch`]): a cached snapshot of a tag that
//!   answers "has this changed since I last looked?" in O(1).
//! - **Change signals** ([`ChangeSignal`]): an explicit, synchronous callback
//!   list for owners that need to push a change notification to registered
//!   consumers. Delivery happens on the owning thread only.
//!
//! ## Quick Start
//!
//! ```rust
//! use cascara_modtag::{ModTag, ModTagWatch};
//!
//! let mut tag = ModTag::new();
//! let mut watch = ModTagWatch::new();
//!
//! // A fresh watch has no snapshot, so the first check reports a change.
//! assert!(watch.set(tag));
//! assert!(!watch.set(tag));
//!
//! tag.increment();
//! assert!(watch.set(tag));
//! assert!(!watch.set(tag));
//! ```
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

mod signal;
mod tag;

pub use signal::{ChangeSignal, ListenerId};
pub use tag::{ModTag, ModTagWatch};
