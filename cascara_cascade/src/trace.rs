// Copyright 2025 the Cascara Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The "why did this value win" introspection side-channel.
//!
//! A [`CascadeTrace`] records, for one
//! [`calculate`](crate::CascadeCalculator::calculate) call, the final ordered
//! candidate list and which candidate supplied each property slot. The trace
//! is passed as `Option<&mut CascadeTrace<K>>`; resolution does zero trace
//! work when it is `None`.

use alloc::vec::Vec;

/// One entry in the ordered candidate list, highest precedence first.
///
/// Index 0 is always the cascade target itself (its explicit values outrank
/// every rule); it carries no `rule_index`.
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateRecord<K> {
    /// The node the candidate came from.
    pub node: K,
    /// Hop count from the host along the style-parent chain (host = 0).
    pub depth: u16,
    /// The placement priority the candidate was ordered under.
    pub priority: f32,
    /// The rule's position in its node's rule list, or `None` for the
    /// cascade target itself.
    pub rule_index: Option<u32>,
}

/// Recorded outcome of one cascade calculation.
///
/// Reused across calls: resolution clears it at the start of each traced
/// calculation, so a long-lived trace never accumulates stale entries.
#[derive(Clone, Debug, Default)]
pub struct CascadeTrace<K> {
    candidates: Vec<CandidateRecord<K>>,
    properties: Vec<(&'static str, Option<usize>)>,
}

impl<K> CascadeTrace<K> {
    /// Creates an empty trace.
    #[must_use]
    pub fn new() -> Self {
        Self {
            candidates: Vec::new(),
            properties: Vec::new(),
        }
    }

    /// The ordered candidate list, highest precedence first.
    #[must_use]
    pub fn candidates(&self) -> &[CandidateRecord<K>] {
        &self.candidates
    }

    /// Per-slot outcomes in declaration order: the slot's declared name and
    /// the index into [`candidates`](Self::candidates) that supplied its
    /// value, or `None` if no candidate supplied it (reverted to default).
    #[must_use]
    pub fn properties(&self) -> &[(&'static str, Option<usize>)] {
        &self.properties
    }

    /// Looks up which candidate supplied the named property.
    ///
    /// Returns `None` if the property is not in the trace; `Some(None)` means
    /// the property was unsupplied.
    #[must_use]
    pub fn supplier(&self, name: &str) -> Option<Option<usize>> {
        self.properties
            .iter()
            .find(|(slot, _)| *slot == name)
            .map(|(_, supplier)| *supplier)
    }

    pub(crate) fn clear(&mut self) {
        self.candidates.clear();
        self.properties.clear();
    }

    pub(crate) fn push_candidate(&mut self, record: CandidateRecord<K>) {
        self.candidates.push(record);
    }

    pub(crate) fn push_property(&mut self, name: &'static str, supplier: Option<usize>) {
        self.properties.push((name, supplier));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supplier_lookup() {
        let mut trace: CascadeTrace<u32> = CascadeTrace::new();
        trace.push_property("color", Some(2));
        trace.push_property("size", None);

        assert_eq!(trace.supplier("color"), Some(Some(2)));
        assert_eq!(trace.supplier("size"), Some(None));
        assert_eq!(trace.supplier("weight"), None);
    }

    #[test]
    fn clear_resets_both_lists() {
        let mut trace: CascadeTrace<u32> = CascadeTrace::new();
        trace.push_candidate(CandidateRecord {
            node: 1,
            depth: 0,
            priority: 0.0,
            rule_index: None,
        });
        trace.push_property("color", Some(0));

        trace.clear();
        assert!(trace.candidates().is_empty());
        assert!(trace.properties().is_empty());
    }
}
