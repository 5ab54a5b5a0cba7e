//! Storage Port - Key-value string persistence
//!
//! The store's persistence contract: get a string by key, set a string
//! under a key. The key-space is process-wide and not namespaced by the
//! framework; collisions are the caller's responsibility.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Key-value string storage, the shape of `localStorage`.
///
/// Writes are synchronous and blocking from the caller's perspective.
pub trait StorageHook {
    /// Read the string stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Write `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str);

    /// Remove the entry under `key`, if any.
    fn remove(&self, key: &str);
}

// =============================================================================
// In-memory double
// =============================================================================

/// In-memory [`StorageHook`] double.
///
/// Shared via `Rc` so a test can hold the same storage a store writes to
/// and inspect (or corrupt) it directly.
#[derive(Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl StorageHook for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

// =============================================================================
// Tests
// =============================================================================
