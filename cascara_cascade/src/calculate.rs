// Copyright 2025 the Cascara Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cascade resolution: collect, order, and apply matching rules.

use core::cmp::Ordering;
use smallvec::SmallVec;

use cascara_style::{FilterInputs, SharedStyle, SlotIndex, StyleTypeId, StyleTypeRegistry};

use crate::node::{NodeLookup, StyleableNode};
use crate::trace::{CandidateRecord, CascadeTrace};

/// Hard bound on the style-parent walk. A well-formed tree never gets close;
/// exceeding it means the style-parent links form a cycle.
pub const MAX_STYLE_DEPTH: u16 = 256;

/// Inline candidate capacity; typical cascades see a handful of rules.
const INLINE_CANDIDATES: usize = 8;

/// One admitted rule, with the keys it was ordered under.
#[derive(Debug)]
struct Candidate<K> {
    style: SharedStyle,
    node: K,
    depth: u16,
    priority: f32,
    type_distance: u16,
    rule_index: u32,
}

impl<K> Candidate<K> {
    /// Total precedence order, highest first. `Less` means `self` outranks
    /// `other`: priority descending, then proximity (depth ascending), then
    /// type specificity (distance ascending), then later declaration first.
    fn precedence(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then(self.depth.cmp(&other.depth))
            .then(self.type_distance.cmp(&other.type_distance))
            .then(other.rule_index.cmp(&self.rule_index))
    }
}

/// The cascade algorithm plus its reusable candidate scratch.
///
/// One calculator serves any number of [`calculate`](Self::calculate) calls;
/// the scratch buffer is reset at the start of each call, so steady-state
/// calculation does not allocate for typical rule counts.
///
/// The candidate list it builds is ordered highest precedence first. The
/// cascade target itself is always the implicit first candidate: a target's
/// own explicit values outrank every rule, whatever its priority. Rules that
/// place the target's own style object on an ancestor are skipped during
/// collection for the same reason.
#[derive(Debug)]
pub struct CascadeCalculator<K> {
    candidates: SmallVec<[Candidate<K>; INLINE_CANDIDATES]>,
}

impl<K: Copy> Default for CascadeCalculator<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy> CascadeCalculator<K> {
    /// Creates a calculator with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            candidates: SmallVec::new(),
        }
    }

    /// Resolves `out`'s calculated values from the rules visible to `host`.
    ///
    /// Walks the style-parent chain from `host` upward (including `host`
    /// itself), admits each rule whose style type is `out`'s type or a
    /// supertype of it and whose filter accepts `host`, orders the
    /// candidates, and resolves each property slot independently: the first
    /// candidate with an explicit value for the slot supplies it; a slot no
    /// candidate supplies reverts to its default. `out`'s own explicit
    /// values always win.
    ///
    /// Returns `true` iff at least one calculated value changed; `out`'s
    /// mod tag is bumped exactly once and its change signal fired in that
    /// case. Recalculating with no intervening mutation is a no-op and
    /// returns `false`.
    ///
    /// When `trace` is given, the ordered candidate list and each slot's
    /// supplier are recorded; resolution behavior is identical either way.
    ///
    /// # Panics
    ///
    /// Panics if the style-parent chain exceeds [`MAX_STYLE_DEPTH`] hops,
    /// which indicates a cycle in the style-parent links.
    pub fn calculate<'a, H, L>(
        &mut self,
        types: &StyleTypeRegistry,
        host: &H,
        out: &SharedStyle,
        lookup: &L,
        mut trace: Option<&mut CascadeTrace<K>>,
    ) -> bool
    where
        K: 'a,
        H: StyleableNode<K>,
        L: NodeLookup<'a, K>,
    {
        let out_type = out.type_id();
        let inputs = FilterInputs::new(host.style_tags());

        self.candidates.clear();
        self.collect_from(types, out, out_type, &inputs, host, 0);

        let mut depth: u16 = 1;
        let mut current = host.style_parent();
        while let Some(key) = current {
            assert!(
                depth <= MAX_STYLE_DEPTH,
                "style-parent chain exceeded {MAX_STYLE_DEPTH} hops; \
                 style-parent links must be acyclic"
            );
            let Some(node) = lookup.node(key) else { break };
            self.collect_from(types, out, out_type, &inputs, node, depth);
            current = node.style_parent();
            depth += 1;
        }

        if let Some(trace) = trace.as_deref_mut() {
            trace.clear();
            trace.push_candidate(CandidateRecord {
                node: host.key(),
                depth: 0,
                priority: out.borrow().priority(),
                rule_index: None,
            });
            for candidate in &self.candidates {
                trace.push_candidate(CandidateRecord {
                    node: candidate.node,
                    depth: candidate.depth,
                    priority: candidate.priority,
                    rule_index: Some(candidate.rule_index),
                });
            }
        }

        let mut changed = false;
        {
            let mut target = out.borrow_mut();
            for slot_index in 0..target.slot_count() {
                let mut supplier: Option<usize> = None;

                if target.slot(slot_index).is_explicit() {
                    // The target's own explicit value wins; leave it alone.
                    supplier = Some(0);
                } else {
                    for (position, candidate) in self.candidates.iter().enumerate() {
                        let source = candidate.style.borrow();
                        if slot_index < source.slot_count()
                            && source.slot(slot_index).is_explicit()
                        {
                            changed |= target
                                .slot_mut(slot_index)
                                .assign_calculated_from(source.slot(slot_index));
                            supplier = Some(position + 1);
                            break;
                        }
                    }
                    if supplier.is_none() {
                        changed |= target.slot_mut(slot_index).clear_calculated_if_not_explicit();
                    }
                }

                if let Some(trace) = trace.as_deref_mut() {
                    #[expect(
                        clippy::cast_possible_truncation,
                        reason = "layouts are capped at u16::MAX slots"
                    )]
                    let name = types
                        .slot_name(out_type, SlotIndex::new(slot_index as u16))
                        .unwrap_or("<unknown>");
                    trace.push_property(name, supplier);
                }
            }

            if changed {
                target.mark_changed();
            }
        }

        if changed {
            out.emit_changed();
        }
        changed
    }

    /// Admits the matching rules of one ancestor into the ordered scratch.
    fn collect_from<N: StyleableNode<K>>(
        &mut self,
        types: &StyleTypeRegistry,
        out: &SharedStyle,
        out_type: StyleTypeId,
        inputs: &FilterInputs<'_>,
        node: &N,
        depth: u16,
    ) {
        for (rule_index, rule) in node.style_rules().iter().enumerate() {
            // The target is already the implicit first candidate.
            if rule.style().ptr_eq(out) {
                continue;
            }
            let Some(type_distance) = types.supertype_distance(out_type, rule.style().type_id())
            else {
                continue;
            };
            if !rule.matches(inputs) {
                continue;
            }

            #[expect(
                clippy::cast_possible_truncation,
                reason = "per-node rule lists are far below u32::MAX"
            )]
            let candidate = Candidate {
                style: rule.style().clone(),
                node: node.key(),
                depth,
                priority: rule.priority(),
                type_distance,
                rule_index: rule_index as u32,
            };

            // Sorted insertion; equal keys land after existing entries, so
            // discovery order is preserved on exact ties.
            let position = self
                .candidates
                .partition_point(|existing| existing.precedence(&candidate) != Ordering::Greater);
            self.candidates.insert(position, candidate);
        }
    }
}
