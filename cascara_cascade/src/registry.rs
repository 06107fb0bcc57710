// Copyright 2025 the Cascara Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node style bookkeeping: bound targets, placed rules, and watchers.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::Cell;
use core::fmt;

use cascara_modtag::{ListenerId, ModTagWatch};
use cascara_style::{SharedStyle, StyleRule, StyleTag, StyleTypeRegistry};

use crate::calculate::CascadeCalculator;
use crate::node::{NodeLookup, StyleableNode};
use crate::trace::CascadeTrace;

/// A registered change watcher, ordered by descending priority.
struct Watcher {
    style: SharedStyle,
    priority: f32,
    watch: ModTagWatch,
    callback: Box<dyn FnMut()>,
}

/// Owns one node's bound style objects, placed rules, and change watchers,
/// and drives their re-validation.
///
/// Binding a style subscribes to its change signal; so does placing a rule.
/// Any of those signals, or any rule-list mutation, marks the node as
/// needing restyle. [`validate_styles`](Self::validate_styles) then
/// recalculates every bound style in bind order, polls the watchers once,
/// and returns the node to the clean state.
///
/// Watchers fire in descending priority order, ties broken by registration
/// order. A freshly registered watcher has no mod-tag snapshot yet, so it
/// fires on the first validation after registration.
pub struct StyleRegistry<K> {
    bound: Vec<SharedStyle>,
    bound_listeners: Vec<ListenerId>,
    rules: Vec<StyleRule>,
    rule_listeners: Vec<ListenerId>,
    watchers: Vec<Watcher>,
    restyle: Rc<Cell<bool>>,
    calculator: CascadeCalculator<K>,
}

impl<K: Copy> Default for StyleRegistry<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy> StyleRegistry<K> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bound: Vec::new(),
            bound_listeners: Vec::new(),
            rules: Vec::new(),
            rule_listeners: Vec::new(),
            watchers: Vec::new(),
            restyle: Rc::new(Cell::new(false)),
            calculator: CascadeCalculator::new(),
        }
    }

    /// Registers a style object as a calculation target.
    ///
    /// Subscribes to the style's change signal so that direct mutation marks
    /// the node as needing restyle. Returns the style back for chaining.
    pub fn bind(&mut self, style: SharedStyle) -> SharedStyle {
        let flag = self.restyle.clone();
        let listener = style.subscribe(Rc::new(move || flag.set(true)));
        self.bound.push(style.clone());
        self.bound_listeners.push(listener);
        self.restyle.set(true);
        style
    }

    /// Reverses [`bind`](Self::bind), dropping the style's watchers too.
    ///
    /// Returns `true` if the style was bound.
    pub fn unbind(&mut self, style: &SharedStyle) -> bool {
        let Some(position) = self.bound.iter().position(|bound| bound.ptr_eq(style)) else {
            return false;
        };
        let removed = self.bound.remove(position);
        removed.unsubscribe(self.bound_listeners.remove(position));
        self.watchers.retain(|watcher| !watcher.style.ptr_eq(style));
        self.restyle.set(true);
        true
    }

    /// The bound style objects, in bind order.
    #[must_use]
    pub fn bound(&self) -> &[SharedStyle] {
        &self.bound
    }

    /// Places a rule on this node, for application to descendants.
    ///
    /// Subscribes to the rule's style so that editing a published style also
    /// triggers downstream re-cascade.
    pub fn add_rule(&mut self, rule: StyleRule) {
        let flag = self.restyle.clone();
        let listener = rule.style().subscribe(Rc::new(move || flag.set(true)));
        self.rules.push(rule);
        self.rule_listeners.push(listener);
        self.restyle.set(true);
    }

    /// Removes the first rule equal to `rule`, unsubscribing from its style.
    ///
    /// Returns `true` if a rule was removed.
    pub fn remove_rule(&mut self, rule: &StyleRule) -> bool {
        let Some(position) = self.rules.iter().position(|existing| existing == rule) else {
            return false;
        };
        let removed = self.rules.remove(position);
        removed
            .style()
            .unsubscribe(self.rule_listeners.remove(position));
        self.restyle.set(true);
        true
    }

    /// Replaces the first rule equal to `old` with `new`, in place.
    ///
    /// Preserves the rule's position in the declaration order. Returns
    /// `true` if a rule was replaced.
    pub fn replace_rule(&mut self, old: &StyleRule, new: StyleRule) -> bool {
        let Some(position) = self.rules.iter().position(|existing| existing == old) else {
            return false;
        };
        self.rules[position]
            .style()
            .unsubscribe(self.rule_listeners[position]);
        let flag = self.restyle.clone();
        self.rule_listeners[position] = new.style().subscribe(Rc::new(move || flag.set(true)));
        self.rules[position] = new;
        self.restyle.set(true);
        true
    }

    /// The placed rules, in declaration order.
    #[must_use]
    pub fn rules(&self) -> &[StyleRule] {
        &self.rules
    }

    /// Registers a watcher on a bound style.
    ///
    /// The callback fires during [`validate_styles`](Self::validate_styles)
    /// whenever the style's mod tag changed since the watcher last ran, and
    /// once on the first validation after registration.
    ///
    /// # Panics
    ///
    /// Panics if `style` is not bound to this registry.
    pub fn watch(&mut self, style: &SharedStyle, priority: f32, callback: impl FnMut() + 'static) {
        assert!(
            self.bound.iter().any(|bound| bound.ptr_eq(style)),
            "cannot watch a style that is not bound"
        );
        let position = self
            .watchers
            .partition_point(|watcher| watcher.priority.total_cmp(&priority).is_ge());
        self.watchers.insert(
            position,
            Watcher {
                style: style.clone(),
                priority,
                watch: ModTagWatch::new(),
                callback: Box::new(callback),
            },
        );
    }

    /// Removes all watchers on the given style.
    ///
    /// Returns `true` if any watcher was removed.
    pub fn unwatch(&mut self, style: &SharedStyle) -> bool {
        let before = self.watchers.len();
        self.watchers.retain(|watcher| !watcher.style.ptr_eq(style));
        self.watchers.len() != before
    }

    /// Returns `true` if the node needs a restyle pass.
    #[must_use]
    pub fn needs_restyle(&self) -> bool {
        self.restyle.get()
    }

    /// Marks the node as needing restyle.
    ///
    /// Called by the host when filter-relevant state outside the registry
    /// changes: a style tag was added or removed here or on an ancestor, or
    /// the consulted ancestry itself changed shape.
    pub fn mark_needs_restyle(&self) {
        self.restyle.set(true);
    }

    /// Recalculates every bound style and polls the watchers once.
    ///
    /// `host_key`, `style_parent`, and `tags` describe the owning node;
    /// ancestors are reached through `lookup`. The registry's own placed
    /// rules take part in the host's cascade, so a node's rules apply to its
    /// own bound styles as well as to descendants. Bound styles resolve in
    /// bind order; `tags` must be sorted and deduplicated.
    ///
    /// The needs-restyle flag is cleared after recalculation and before the
    /// watchers run: recalculation-driven change signals re-set it through
    /// the bound-style listeners but describe changes this pass already
    /// processed, while a mutation made inside a watcher callback has not
    /// been processed and must leave the node dirty for the next pass.
    pub fn validate_styles<'a, L>(
        &mut self,
        types: &StyleTypeRegistry,
        host_key: K,
        style_parent: Option<K>,
        tags: &[StyleTag],
        lookup: &L,
    ) where
        K: 'a,
        L: NodeLookup<'a, K>,
    {
        let host = HostView {
            key: host_key,
            parent: style_parent,
            tags,
            rules: &self.rules,
        };
        for style in &self.bound {
            let _ = self.calculator.calculate(
                types,
                &host,
                style,
                lookup,
                None::<&mut CascadeTrace<K>>,
            );
        }

        self.restyle.set(false);

        for watcher in &mut self.watchers {
            if watcher.watch.set(watcher.style.mod_tag()) {
                (watcher.callback)();
            }
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for StyleRegistry<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleRegistry")
            .field("bound", &self.bound.len())
            .field("rules", &self.rules.len())
            .field("watchers", &self.watchers.len())
            .field("needs_restyle", &self.restyle.get())
            .finish_non_exhaustive()
    }
}

/// The owning node as seen by the cascade: registry-held rules plus
/// host-supplied key, parent, and tags.
struct HostView<'a, K> {
    key: K,
    parent: Option<K>,
    tags: &'a [StyleTag],
    rules: &'a [StyleRule],
}

impl<K: Copy> StyleableNode<K> for HostView<'_, K> {
    fn key(&self) -> K {
        self.key
    }

    fn style_parent(&self) -> Option<K> {
        self.parent
    }

    fn style_tags(&self) -> &[StyleTag] {
        self.tags
    }

    fn style_rules(&self) -> &[StyleRule] {
        self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;
    use cascara_style::{StyleFilter, StyleProp, StyleTypeId};

    struct Node {
        key: usize,
        parent: Option<usize>,
        tags: Vec<StyleTag>,
        rules: Vec<StyleRule>,
    }

    impl StyleableNode<usize> for Node {
        fn key(&self) -> usize {
            self.key
        }

        fn style_parent(&self) -> Option<usize> {
            self.parent
        }

        fn style_tags(&self) -> &[StyleTag] {
            &self.tags
        }

        fn style_rules(&self) -> &[StyleRule] {
            &self.rules
        }
    }

    fn text_type(types: &mut StyleTypeRegistry) -> (StyleTypeId, StyleProp<u32>) {
        let mut text = types.declare("Text", None);
        let color = text.property("color", 0x000000_u32);
        (text.build(), color)
    }

    #[test]
    fn bind_marks_dirty_and_returns_the_style() {
        let mut types = StyleTypeRegistry::new();
        let (text, _) = text_type(&mut types);

        let mut registry: StyleRegistry<usize> = StyleRegistry::new();
        assert!(!registry.needs_restyle());

        let style = registry.bind(SharedStyle::new(&types, text));
        assert!(registry.needs_restyle());
        assert_eq!(registry.bound().len(), 1);
        assert!(registry.bound()[0].ptr_eq(&style));
    }

    #[test]
    fn direct_set_on_bound_style_marks_dirty() {
        let mut types = StyleTypeRegistry::new();
        let (text, color) = text_type(&mut types);

        let mut registry: StyleRegistry<usize> = StyleRegistry::new();
        let style = registry.bind(SharedStyle::new(&types, text));

        let nodes: Vec<Node> = Vec::new();
        let lookup = |key: usize| nodes.get(key);
        registry.validate_styles(&types, 0, None, &[], &lookup);
        assert!(!registry.needs_restyle());

        style.set(color, 0xFF0000);
        assert!(registry.needs_restyle());
    }

    #[test]
    fn editing_a_published_rule_style_marks_dirty() {
        let mut types = StyleTypeRegistry::new();
        let (text, color) = text_type(&mut types);

        let mut registry: StyleRegistry<usize> = StyleRegistry::new();
        let published = SharedStyle::new(&types, text);
        registry.add_rule(StyleRule::new(published.clone(), StyleFilter::Always, 0.0));

        let nodes: Vec<Node> = Vec::new();
        let lookup = |key: usize| nodes.get(key);
        registry.validate_styles(&types, 0, None, &[], &lookup);
        assert!(!registry.needs_restyle());

        published.set(color, 0xFF0000);
        assert!(registry.needs_restyle());
    }

    #[test]
    fn remove_rule_unsubscribes() {
        let mut types = StyleTypeRegistry::new();
        let (text, color) = text_type(&mut types);

        let mut registry: StyleRegistry<usize> = StyleRegistry::new();
        let published = SharedStyle::new(&types, text);
        let rule = StyleRule::new(published.clone(), StyleFilter::Always, 0.0);
        registry.add_rule(rule.clone());
        assert!(registry.remove_rule(&rule));
        assert!(!registry.remove_rule(&rule));
        assert!(registry.rules().is_empty());

        let nodes: Vec<Node> = Vec::new();
        let lookup = |key: usize| nodes.get(key);
        registry.validate_styles(&types, 0, None, &[], &lookup);

        // The removed rule's style no longer dirties the registry.
        published.set(color, 0xFF0000);
        assert!(!registry.needs_restyle());
    }

    #[test]
    fn replace_rule_preserves_position() {
        let mut types = StyleTypeRegistry::new();
        let (text, _) = text_type(&mut types);

        let mut registry: StyleRegistry<usize> = StyleRegistry::new();
        let first = StyleRule::new(SharedStyle::new(&types, text), StyleFilter::Always, 1.0);
        let second = StyleRule::new(SharedStyle::new(&types, text), StyleFilter::Always, 2.0);
        registry.add_rule(first.clone());
        registry.add_rule(second);

        let replacement = StyleRule::new(SharedStyle::new(&types, text), StyleFilter::Always, 3.0);
        assert!(registry.replace_rule(&first, replacement.clone()));
        assert_eq!(registry.rules()[0], replacement);
        assert_eq!(registry.rules().len(), 2);
    }

    #[test]
    fn own_rules_apply_to_own_bound_styles() {
        let mut types = StyleTypeRegistry::new();
        let (text, color) = text_type(&mut types);

        let mut registry: StyleRegistry<usize> = StyleRegistry::new();
        let published = SharedStyle::new(&types, text);
        published.set(color, 0x00FF00);
        registry.add_rule(StyleRule::new(published, StyleFilter::Always, 0.0));

        let target = registry.bind(SharedStyle::new(&types, text));

        let nodes: Vec<Node> = Vec::new();
        let lookup = |key: usize| nodes.get(key);
        registry.validate_styles(&types, 0, None, &[], &lookup);
        assert_eq!(target.get(color), 0x00FF00);
    }

    #[test]
    #[should_panic(expected = "not bound")]
    fn watch_unbound_style_panics() {
        let mut types = StyleTypeRegistry::new();
        let (text, _) = text_type(&mut types);

        let mut registry: StyleRegistry<usize> = StyleRegistry::new();
        let style = SharedStyle::new(&types, text);
        registry.watch(&style, 0.0, || {});
    }

    #[test]
    fn watchers_fire_in_priority_then_registration_order() {
        let mut types = StyleTypeRegistry::new();
        let (text, color) = text_type(&mut types);

        let mut registry: StyleRegistry<usize> = StyleRegistry::new();
        let style = registry.bind(SharedStyle::new(&types, text));

        let order = Rc::new(core::cell::RefCell::new(Vec::new()));
        for (label, priority) in [("low", 0.0), ("high", 10.0), ("also-low", 0.0)] {
            let order = order.clone();
            registry.watch(&style, priority, move || order.borrow_mut().push(label));
        }

        style.set(color, 0xFF0000);
        let nodes: Vec<Node> = Vec::new();
        let lookup = |key: usize| nodes.get(key);
        registry.validate_styles(&types, 0, None, &[], &lookup);

        assert_eq!(*order.borrow(), vec!["high", "low", "also-low"]);
    }

    #[test]
    fn watcher_fires_once_per_change_and_initially() {
        let mut types = StyleTypeRegistry::new();
        let (text, color) = text_type(&mut types);

        let mut registry: StyleRegistry<usize> = StyleRegistry::new();
        let style = registry.bind(SharedStyle::new(&types, text));

        let fired = Rc::new(Cell::new(0_u32));
        let fired2 = fired.clone();
        registry.watch(&style, 0.0, move || fired2.set(fired2.get() + 1));

        let nodes: Vec<Node> = Vec::new();
        let lookup = |key: usize| nodes.get(key);

        // Initial delivery: a fresh watcher has no snapshot.
        registry.validate_styles(&types, 0, None, &[], &lookup);
        assert_eq!(fired.get(), 1);

        // No change, no delivery.
        registry.validate_styles(&types, 0, None, &[], &lookup);
        assert_eq!(fired.get(), 1);

        style.set(color, 0xFF0000);
        registry.validate_styles(&types, 0, None, &[], &lookup);
        assert_eq!(fired.get(), 2);
    }

    #[test]
    fn watcher_mutation_leaves_node_dirty() {
        let mut types = StyleTypeRegistry::new();
        let (text, color) = text_type(&mut types);

        let mut registry: StyleRegistry<usize> = StyleRegistry::new();
        let style = registry.bind(SharedStyle::new(&types, text));

        let mutator = style.clone();
        registry.watch(&style, 0.0, move || mutator.set(color, 0xFF0000));

        let nodes: Vec<Node> = Vec::new();
        let lookup = |key: usize| nodes.get(key);

        // The initial delivery mutates the style mid-pass; that change has
        // not been processed yet, so the node must come out dirty.
        registry.validate_styles(&types, 0, None, &[], &lookup);
        assert_eq!(style.get(color), 0xFF0000);
        assert!(registry.needs_restyle());

        // The next pass processes it and settles.
        registry.validate_styles(&types, 0, None, &[], &lookup);
        assert!(!registry.needs_restyle());
    }

    #[test]
    fn nan_watcher_priority_orders_deterministically() {
        let mut types = StyleTypeRegistry::new();
        let (text, _) = text_type(&mut types);

        let mut registry: StyleRegistry<usize> = StyleRegistry::new();
        let style = registry.bind(SharedStyle::new(&types, text));

        let order = Rc::new(core::cell::RefCell::new(Vec::new()));
        for (label, priority) in [("one", 1.0), ("nan", f32::NAN), ("two", 2.0)] {
            let order = order.clone();
            registry.watch(&style, priority, move || order.borrow_mut().push(label));
        }

        let nodes: Vec<Node> = Vec::new();
        let lookup = |key: usize| nodes.get(key);
        registry.validate_styles(&types, 0, None, &[], &lookup);

        // `total_cmp` places NaN above every finite priority.
        assert_eq!(*order.borrow(), vec!["nan", "two", "one"]);
    }

    #[test]
    fn unbind_drops_watchers_and_listener() {
        let mut types = StyleTypeRegistry::new();
        let (text, color) = text_type(&mut types);

        let mut registry: StyleRegistry<usize> = StyleRegistry::new();
        let style = registry.bind(SharedStyle::new(&types, text));
        registry.watch(&style, 0.0, || {});

        assert!(registry.unbind(&style));
        assert!(!registry.unbind(&style));
        assert!(registry.bound().is_empty());
        assert!(!registry.unwatch(&style));

        let nodes: Vec<Node> = Vec::new();
        let lookup = |key: usize| nodes.get(key);
        registry.validate_styles(&types, 0, None, &[], &lookup);

        style.set(color, 0xFF0000);
        assert!(!registry.needs_restyle());
    }

    #[test]
    fn validate_clears_the_dirty_flag() {
        let mut types = StyleTypeRegistry::new();
        let (text, _) = text_type(&mut types);

        let mut registry: StyleRegistry<usize> = StyleRegistry::new();
        let _ = registry.bind(SharedStyle::new(&types, text));
        registry.mark_needs_restyle();

        let nodes: Vec<Node> = Vec::new();
        let lookup = |key: usize| nodes.get(key);
        registry.validate_styles(&types, 0, None, &[], &lookup);
        assert!(!registry.needs_restyle());
    }
}
