//! EventDelegator - Delegated dispatch with selector matching
//!
//! One native listener per (container, event type) pair, fanning out to
//! per-selector bindings. Bindings are keyed by (container identity,
//! event type, selector), so re-registering on every render, the
//! natural shape when renders rebuild subtrees, replaces the previous
//! binding instead of duplicating dispatch.
//!
//! Matching is configurable per binding:
//!
//! - [`MatchMode::Exact`] - the event's original target must itself
//!   match the selector (the default).
//! - [`MatchMode::Closest`] - the closest ancestor-or-self of the
//!   target matching the selector, as long as it sits within the
//!   container.
//!
//! `ignore_within` is the guard-exclusion option: events whose target
//! sits inside a descendant matching the ignore selector (below the
//! matched element) are dropped, so a row handler can skip clicks that
//! land on the row's buttons.
//!
//! Failures inside callbacks are not caught here; they propagate to the
//! host like any native listener panic.
//!
//! # Example
//!
//! ```
//! use spark_dom::{BindingOptions, Element, EventDelegator, MatchMode};
//!
//! let list = Element::create("ul");
//! let delegator = EventDelegator::new();
//! delegator
//!     .on(&list, "click", "li.task", |_event, row| {
//!         println!("clicked row {:?}", row.id());
//!     },
//!     BindingOptions::new()
//!         .mode(MatchMode::Closest)
//!         .ignore_within("button"))
//!     .unwrap();
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use bitflags::bitflags;
use tracing::trace;

use crate::dom::{Element, EventContext, ListenerId, NodeId, Selector, WeakElement};
use crate::error::DomError;

bitflags! {
    /// Options applied to the event *before* the callback runs.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DispatchOptions: u8 {
        const NONE = 0;
        /// Suppress the host's default action.
        const PREVENT_DEFAULT = 1 << 0;
        /// Halt propagation to ancestors of the container.
        const STOP_PROPAGATION = 1 << 1;
    }
}

/// How the triggering element is matched against the binding selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// The original target must itself match.
    #[default]
    Exact,
    /// Closest ancestor-or-self of the target, within the container.
    Closest,
}

/// Per-binding configuration.
#[derive(Debug, Clone, Default)]
pub struct BindingOptions {
    flags: DispatchOptions,
    mode: MatchMode,
    ignore_within: Option<String>,
}

impl BindingOptions {
    pub fn new() -> BindingOptions {
        BindingOptions::default()
    }

    pub fn prevent_default(mut self) -> BindingOptions {
        self.flags |= DispatchOptions::PREVENT_DEFAULT;
        self
    }

    pub fn stop_propagation(mut self) -> BindingOptions {
        self.flags |= DispatchOptions::STOP_PROPAGATION;
        self
    }

    pub fn mode(mut self, mode: MatchMode) -> BindingOptions {
        self.mode = mode;
        self
    }

    /// Drop events whose target sits under a descendant matching
    /// `selector` (below the matched element).
    pub fn ignore_within(mut self, selector: &str) -> BindingOptions {
        self.ignore_within = Some(selector.to_string());
        self
    }
}

/// Callback receives the event context and the matched element (the
/// target in [`MatchMode::Exact`], the matched ancestor in
/// [`MatchMode::Closest`]).
type DelegateFn = dyn Fn(&EventContext, &Element);

#[derive(Clone)]
struct Binding {
    selector: Selector,
    callback: Rc<DelegateFn>,
    flags: DispatchOptions,
    mode: MatchMode,
    ignore_within: Option<Selector>,
    seq: u64,
}

type BindingKey = (NodeId, String);

struct DelegatorInner {
    /// (container, event type) → selector string → binding.
    bindings: HashMap<BindingKey, HashMap<String, Binding>>,
    /// The one native listener installed per (container, event type).
    native: HashMap<BindingKey, (WeakElement, ListenerId)>,
    next_seq: u64,
}

/// Delegated event binder. Cheap to clone; clones share the registry.
#[derive(Clone)]
pub struct EventDelegator {
    inner: Rc<RefCell<DelegatorInner>>,
}

impl Default for EventDelegator {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDelegator {
    pub fn new() -> EventDelegator {
        EventDelegator {
            inner: Rc::new(RefCell::new(DelegatorInner {
                bindings: HashMap::new(),
                native: HashMap::new(),
                next_seq: 0,
            })),
        }
    }

    /// Register a delegated binding. Re-registering the same
    /// (container, event type, selector) replaces the previous binding.
    pub fn on<F>(
        &self,
        container: &Element,
        event_type: &str,
        selector: &str,
        callback: F,
        options: BindingOptions,
    ) -> Result<(), DomError>
    where
        F: Fn(&EventContext, &Element) + 'static,
    {
        let parsed_selector = Selector::parse(selector)?;
        let ignore_within = options
            .ignore_within
            .as_deref()
            .map(Selector::parse)
            .transpose()?;

        let key: BindingKey = (container.node_id(), event_type.to_string());
        let mut inner = self.inner.borrow_mut();
        let seq = inner.next_seq;
        inner.next_seq += 1;

        inner.bindings.entry(key.clone()).or_default().insert(
            selector.to_string(),
            Binding {
                selector: parsed_selector,
                callback: Rc::new(callback),
                flags: options.flags,
                mode: options.mode,
                ignore_within,
                seq,
            },
        );

        if !inner.native.contains_key(&key) {
            let listener_id = self.install_native(container, &key);
            inner.native.insert(key, (container.downgrade(), listener_id));
        }
        Ok(())
    }

    /// Remove one binding; the native listener is uninstalled when the
    /// last binding for its (container, event type) pair goes away.
    pub fn off(&self, container: &Element, event_type: &str, selector: &str) {
        let key: BindingKey = (container.node_id(), event_type.to_string());
        let mut inner = self.inner.borrow_mut();

        let emptied = match inner.bindings.get_mut(&key) {
            Some(for_key) => {
                for_key.remove(selector);
                for_key.is_empty()
            }
            None => false,
        };
        if emptied {
            inner.bindings.remove(&key);
            if let Some((weak, listener_id)) = inner.native.remove(&key)
                && let Some(container) = weak.upgrade()
            {
                container.remove_listener(event_type, listener_id);
            }
        }
    }

    /// Number of live bindings (for tests and diagnostics).
    pub fn binding_count(&self) -> usize {
        self.inner
            .borrow()
            .bindings
            .values()
            .map(|for_key| for_key.len())
            .sum()
    }

    fn install_native(&self, container: &Element, key: &BindingKey) -> ListenerId {
        let inner_weak = Rc::downgrade(&self.inner);
        let container_weak = container.downgrade();
        let key = key.clone();
        let event_type = key.1.clone();

        container.add_listener(&event_type, move |context| {
            let Some(inner) = inner_weak.upgrade() else { return };
            let Some(container) = container_weak.upgrade() else { return };

            // Snapshot in registration order; callbacks may re-bind.
            let mut bindings: Vec<Binding> = {
                let inner = inner.borrow();
                inner
                    .bindings
                    .get(&key)
                    .map(|for_key| for_key.values().cloned().collect())
                    .unwrap_or_default()
            };
            bindings.sort_by_key(|binding| binding.seq);

            let target = context.target();
            for binding in bindings {
                let Some(matched) = match_binding(&binding, &target, &container) else {
                    continue;
                };
                if guarded(&binding, &target, &matched) {
                    trace!(event_type = context.event_type(), "delegated event ignored by guard");
                    continue;
                }

                if binding.flags.contains(DispatchOptions::PREVENT_DEFAULT) {
                    context.prevent_default();
                }
                if binding.flags.contains(DispatchOptions::STOP_PROPAGATION) {
                    context.stop_propagation();
                }
                (binding.callback)(context, &matched);
            }
        })
    }
}

/// The element a binding dispatches against, if any.
fn match_binding(binding: &Binding, target: &Element, container: &Element) -> Option<Element> {
    match binding.mode {
        MatchMode::Exact => target
            .matches_selector(&binding.selector)
            .then(|| target.clone()),
        MatchMode::Closest => target
            .closest_matching(&binding.selector)
            .filter(|matched| within(matched, container)),
    }
}

/// Whether the target sits under an ignored descendant: any node from
/// the target up to (excluding) the matched element matching the ignore
/// selector suppresses the binding.
fn guarded(binding: &Binding, target: &Element, matched: &Element) -> bool {
    let Some(ignore) = &binding.ignore_within else {
        return false;
    };
    let mut current = Some(target.clone());
    while let Some(element) = current {
        if element.same_node(matched) {
            return false;
        }
        if element.matches_selector(ignore) {
            return true;
        }
        current = element.parent();
    }
    false
}

/// Descendant-or-self containment.
fn within(element: &Element, container: &Element) -> bool {
    let mut current = Some(element.clone());
    while let Some(node) = current {
        if node.same_node(container) {
            return true;
        }
        current = node.parent();
    }
    false
}

// =============================================================================
// Tests
// =============================================================================
