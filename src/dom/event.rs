//! Event - Bubbling dispatch over the element tree
//!
//! [`Element::dispatch`] builds an [`EventContext`] and walks from the
//! target to the root, running each node's listeners in install order.
//! Listeners can suppress the default action or halt further bubbling;
//! the returned context exposes both flags so callers (and tests) can
//! observe what happened.
//!
//! Listener panics are not caught: a failing callback propagates to the
//! host, matching native event-dispatch error semantics.

use std::cell::Cell;
use std::rc::Rc;

use tracing::trace;

use super::element::Element;

struct EventData {
    event_type: String,
    target: Element,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
}

/// Shared context for one dispatched event.
#[derive(Clone)]
pub struct EventContext {
    data: Rc<EventData>,
}

impl EventContext {
    fn new(event_type: &str, target: Element) -> EventContext {
        EventContext {
            data: Rc::new(EventData {
                event_type: event_type.to_string(),
                target,
                default_prevented: Cell::new(false),
                propagation_stopped: Cell::new(false),
            }),
        }
    }

    /// The event type this context was dispatched with.
    pub fn event_type(&self) -> &str {
        &self.data.event_type
    }

    /// The element the event originated on. Stable for the whole
    /// bubbling pass; listeners on ancestors still see the original
    /// target.
    pub fn target(&self) -> Element {
        self.data.target.clone()
    }

    /// Suppress the host's default action for this event.
    pub fn prevent_default(&self) {
        self.data.default_prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.data.default_prevented.get()
    }

    /// Halt bubbling: remaining listeners on the current node still run,
    /// ancestor nodes do not see the event.
    pub fn stop_propagation(&self) {
        self.data.propagation_stopped.set(true);
    }

    pub fn propagation_stopped(&self) -> bool {
        self.data.propagation_stopped.get()
    }
}

impl Element {
    /// Dispatch an event of `event_type` with this element as target,
    /// bubbling to the root. Returns the context for flag inspection.
    pub fn dispatch(&self, event_type: &str) -> EventContext {
        let context = EventContext::new(event_type, self.clone());
        trace!(event_type, target = %self.tag(), "dispatch");

        let mut node = Some(self.clone());
        while let Some(current) = node {
            // Snapshot so listeners can re-bind during the pass.
            for listener in current.listeners_for(event_type) {
                listener(&context);
            }
            if context.propagation_stopped() {
                break;
            }
            node = current.parent();
        }
        context
    }
}

// =============================================================================
// Tests
// =============================================================================
