//! StateStore - Reactive state container
//!
//! Holds a mapping of string keys to JSON values, mutated only through
//! `set`/`update`, with ordered subscriber notification and optional
//! synchronous persistence through the storage port.
//!
//! # Contracts
//!
//! - Every mutation replaces the state snapshot atomically and fires
//!   every subscriber exactly once, in subscription order, with the full
//!   merged state.
//! - Notification iterates a snapshot of the subscriber list: a callback
//!   unsubscribing (or subscribing) mid-pass does not affect the pass.
//! - When persistence is enabled, the storage write happens before
//!   subscribers run, so a subscriber's read-back observes the persisted
//!   value.
//! - A corrupt persisted blob never fails construction: the store falls
//!   back to the supplied initial state and logs a warning.
//!
//! # Example
//!
//! ```
//! use spark_dom::{MemoryStorage, PersistDescriptor, StateStore};
//! use serde_json::json;
//!
//! let storage = MemoryStorage::new();
//! let store = StateStore::with_persistence(
//!     spark_dom::state_map(&[("count", json!(0))]),
//!     PersistDescriptor::new("app-state"),
//!     storage.clone(),
//! );
//!
//! let id = store.subscribe(|state| {
//!     println!("count is now {}", state["count"]);
//! });
//! store.set("count", json!(1));
//! store.unsubscribe(id);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;
use tracing::{trace, warn};

use crate::platform::StorageHook;

/// The store's state shape: string keys to JSON values.
pub type StateMap = serde_json::Map<String, Value>;

/// Build a [`StateMap`] from key/value pairs. Convenience for
/// constructors and tests.
pub fn state_map(pairs: &[(&str, Value)]) -> StateMap {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}

/// Persistence descriptor: which storage key the full state serializes
/// under. Presence of the descriptor is what enables persistence.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PersistDescriptor {
    pub key: String,
}

impl PersistDescriptor {
    pub fn new(key: &str) -> PersistDescriptor {
        PersistDescriptor { key: key.to_string() }
    }
}

/// Token returned by [`StateStore::subscribe`]; removal is by this
/// identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type SubscriberFn = dyn Fn(&StateMap);

struct StoreInner {
    state: StateMap,
    subscribers: Vec<(SubscriptionId, Rc<SubscriberFn>)>,
    next_id: u64,
    persistence: Option<(PersistDescriptor, Rc<dyn StorageHook>)>,
}

/// Reactive state container. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct StateStore {
    inner: Rc<RefCell<StoreInner>>,
}

impl StateStore {
    /// Create a store with no persistence.
    pub fn new(initial: StateMap) -> StateStore {
        StateStore {
            inner: Rc::new(RefCell::new(StoreInner {
                state: initial,
                subscribers: Vec::new(),
                next_id: 0,
                persistence: None,
            })),
        }
    }

    /// Create a persisted store: rehydrate from storage under the
    /// descriptor's key, falling back to `initial` when the key is
    /// absent or the blob does not parse as a JSON object.
    pub fn with_persistence(
        initial: StateMap,
        descriptor: PersistDescriptor,
        storage: Rc<dyn StorageHook>,
    ) -> StateStore {
        let state = match storage.get(&descriptor.key) {
            Some(blob) => match serde_json::from_str::<Value>(&blob) {
                Ok(Value::Object(map)) => map,
                Ok(_) => {
                    warn!(key = %descriptor.key, "persisted state is not an object, using initial state");
                    initial
                }
                Err(error) => {
                    warn!(key = %descriptor.key, %error, "persisted state corrupt, using initial state");
                    initial
                }
            },
            None => initial,
        };

        StateStore {
            inner: Rc::new(RefCell::new(StoreInner {
                state,
                subscribers: Vec::new(),
                next_id: 0,
                persistence: Some((descriptor, storage)),
            })),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Current value under `key`, if any. No side effects.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.borrow().state.get(key).cloned()
    }

    /// Read-only clone of the full state.
    pub fn snapshot(&self) -> StateMap {
        self.inner.borrow().state.clone()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Replace one field (created on first write), persist, notify.
    pub fn set(&self, key: &str, value: Value) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.state.insert(key.to_string(), value);
        }
        self.persist();
        self.notify();
    }

    /// Shallow-merge `partial` into the state (unrelated keys are
    /// preserved), persist, notify. The primary mutation path for
    /// components.
    pub fn update(&self, partial: StateMap) {
        {
            let mut inner = self.inner.borrow_mut();
            for (key, value) in partial {
                inner.state.insert(key, value);
            }
        }
        self.persist();
        self.notify();
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Register a notification target. Does not invoke it immediately.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StateMap) + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        inner.subscribers.push((id, Rc::new(callback)));
        id
    }

    /// Remove a subscription. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.inner
            .borrow_mut()
            .subscribers
            .retain(|(subscription_id, _)| *subscription_id != id);
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Synchronous write of the full state under the persistence key.
    /// Runs before notification so subscriber read-backs see it.
    fn persist(&self) {
        let write = {
            let inner = self.inner.borrow();
            inner.persistence.as_ref().map(|(descriptor, storage)| {
                let blob = Value::Object(inner.state.clone()).to_string();
                (descriptor.key.clone(), storage.clone(), blob)
            })
        };
        if let Some((key, storage, blob)) = write {
            storage.set(&key, &blob);
        }
    }

    fn notify(&self) {
        // Snapshot both the subscriber list and the state before running
        // callbacks: a callback may subscribe, unsubscribe, or mutate the
        // store without invalidating this pass.
        let (subscribers, state) = {
            let inner = self.inner.borrow();
            let subscribers: Vec<Rc<SubscriberFn>> =
                inner.subscribers.iter().map(|(_, cb)| cb.clone()).collect();
            (subscribers, inner.state.clone())
        };
        trace!(subscribers = subscribers.len(), "notify");
        for subscriber in subscribers {
            subscriber(&state);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
