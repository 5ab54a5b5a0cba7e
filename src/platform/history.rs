//! History Port - Push-state navigation and pop-state notification
//!
//! The router's view of browser history: push an entry, read the current
//! path, and hear about host-initiated back/forward movement.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Pop-state listener. Receives the path that became current.
pub type PopCallback = Box<dyn Fn(String)>;

/// Browser history surface.
pub trait HistoryHook {
    /// Push a new entry for `path` and make it current. Does not notify
    /// pop listeners; a push is caller-initiated, not host-initiated.
    fn push(&self, path: &str);

    /// The path of the current entry.
    fn current(&self) -> String;

    /// Register a pop-state listener, fired on host-initiated
    /// back/forward movement.
    fn on_pop(&self, callback: PopCallback);
}

// =============================================================================
// In-memory double
// =============================================================================

/// In-memory [`HistoryHook`] double with an explicit entry stack.
///
/// `back()` and `forward()` move the cursor and fire pop listeners,
/// modeling the browser's back/forward buttons.
pub struct MemoryHistory {
    entries: RefCell<Vec<String>>,
    cursor: Cell<usize>,
    pop_listeners: RefCell<Vec<PopCallback>>,
}

impl MemoryHistory {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            entries: RefCell::new(vec!["/".to_string()]),
            cursor: Cell::new(0),
            pop_listeners: RefCell::new(Vec::new()),
        })
    }

    /// Total number of entries (for asserting on pushes).
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        false // There is always at least the initial entry.
    }

    /// Simulate the back button. No-op at the oldest entry.
    pub fn back(&self) {
        let cursor = self.cursor.get();
        if cursor == 0 {
            return;
        }
        self.cursor.set(cursor - 1);
        self.fire_pop();
    }

    /// Simulate the forward button. No-op at the newest entry.
    pub fn forward(&self) {
        let cursor = self.cursor.get();
        if cursor + 1 >= self.entries.borrow().len() {
            return;
        }
        self.cursor.set(cursor + 1);
        self.fire_pop();
    }

    fn fire_pop(&self) {
        let path = self.current();
        // Snapshot count, not the boxes: listeners may not be cloned.
        // Holding the borrow across calls is fine as long as listeners
        // do not register new listeners mid-pop.
        for listener in self.pop_listeners.borrow().iter() {
            listener(path.clone());
        }
    }
}

impl HistoryHook for MemoryHistory {
    fn push(&self, path: &str) {
        let cursor = self.cursor.get();
        let mut entries = self.entries.borrow_mut();
        // Pushing from a back-navigated position drops the forward tail.
        entries.truncate(cursor + 1);
        entries.push(path.to_string());
        self.cursor.set(cursor + 1);
    }

    fn current(&self) -> String {
        self.entries.borrow()[self.cursor.get()].clone()
    }

    fn on_pop(&self, callback: PopCallback) {
        self.pop_listeners.borrow_mut().push(callback);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_current() {
        let history = MemoryHistory::new();
        assert_eq!(history.current(), "/");

        history.push("/a");
        history.push("/b");
        assert_eq!(history.current(), "/b");
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_back_forward_fire_pop() {
        let history = MemoryHistory::new();
        history.push("/a");
        history.push("/b");

        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        history.on_pop(Box::new(move |path| {
            seen_clone.borrow_mut().push(path);
        }));

        history.back();
        assert_eq!(history.current(), "/a");
        history.forward();
        assert_eq!(history.current(), "/b");
        assert_eq!(*seen.borrow(), vec!["/a".to_string(), "/b".to_string()]);
    }

    #[test]
    fn test_push_after_back_drops_forward_tail() {
        let history = MemoryHistory::new();
        history.push("/a");
        history.push("/b");
        history.back();

        history.push("/c");
        assert_eq!(history.current(), "/c");
        assert_eq!(history.len(), 3); // "/", "/a", "/c"

        history.forward(); // Nothing ahead.
        assert_eq!(history.current(), "/c");
    }

    #[test]
    fn test_back_at_root_is_noop() {
        let history = MemoryHistory::new();
        let fired = Rc::new(Cell::new(0));
        let fired_clone = fired.clone();
        history.on_pop(Box::new(move |_| fired_clone.set(fired_clone.get() + 1)));

        history.back();
        assert_eq!(history.current(), "/");
        assert_eq!(fired.get(), 0);
    }
}
