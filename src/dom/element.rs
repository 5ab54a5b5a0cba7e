//! Element - Shared in-memory DOM node
//!
//! `Element` is a cheap `Rc` handle onto a node: tag, attributes, style
//! map, text, children, `Weak` parent, and per-event-type listeners.
//! Cloning a handle never copies the node; identity is pointer identity
//! ([`Element::same_node`]).
//!
//! Renders rebuild subtrees wholesale: [`Element::clear`] drops every
//! child (detaching their parent links) and the renderer appends a fresh
//! subtree. There is no diffing anywhere in this crate.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use tracing::warn;

use super::event::EventContext;
use super::selector::Selector;
use crate::error::DomError;

/// Listener installed on an element for one event type.
pub type ListenerFn = dyn Fn(&EventContext);

/// Token returned by [`Element::add_listener`], used for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u64);

/// Opaque node identity, usable as a map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

pub(crate) struct ElementNode {
    tag: String,
    attributes: RefCell<HashMap<String, String>>,
    styles: RefCell<HashMap<String, String>>,
    text: RefCell<String>,
    children: RefCell<Vec<Element>>,
    parent: RefCell<Weak<ElementNode>>,
    listeners: RefCell<HashMap<String, Vec<(ListenerId, Rc<ListenerFn>)>>>,
    next_listener_id: Cell<u64>,
}

/// Handle to a node in the in-memory element tree.
#[derive(Clone)]
pub struct Element {
    node: Rc<ElementNode>,
}

/// Non-owning element handle. The delegator stores these so holding a
/// binding never keeps a detached subtree alive.
#[derive(Clone)]
pub struct WeakElement {
    node: Weak<ElementNode>,
}

impl WeakElement {
    pub fn upgrade(&self) -> Option<Element> {
        self.node.upgrade().map(|node| Element { node })
    }
}

impl Element {
    /// Create a detached element with the given tag.
    pub fn create(tag: &str) -> Element {
        Element {
            node: Rc::new(ElementNode {
                tag: tag.to_ascii_lowercase(),
                attributes: RefCell::new(HashMap::new()),
                styles: RefCell::new(HashMap::new()),
                text: RefCell::new(String::new()),
                children: RefCell::new(Vec::new()),
                parent: RefCell::new(Weak::new()),
                listeners: RefCell::new(HashMap::new()),
                next_listener_id: Cell::new(0),
            }),
        }
    }

    // =========================================================================
    // Identity
    // =========================================================================

    /// Pointer identity: do both handles refer to the same node?
    pub fn same_node(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }

    /// Stable identity key for this node (map key for registries).
    pub fn node_id(&self) -> NodeId {
        NodeId(Rc::as_ptr(&self.node) as usize)
    }

    /// Non-owning handle to this node.
    pub fn downgrade(&self) -> WeakElement {
        WeakElement { node: Rc::downgrade(&self.node) }
    }

    // =========================================================================
    // Attributes, styles, text
    // =========================================================================

    /// The (lowercased) tag name.
    pub fn tag(&self) -> String {
        self.node.tag.clone()
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        self.node
            .attributes
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.node.attributes.borrow().get(name).cloned()
    }

    /// The `id` attribute, if set.
    pub fn id(&self) -> Option<String> {
        self.attribute("id")
    }

    /// Whether the `class` attribute contains `class_name` as a
    /// whitespace-separated token.
    pub fn has_class(&self, class_name: &str) -> bool {
        match self.attribute("class") {
            Some(classes) => classes.split_whitespace().any(|c| c == class_name),
            None => false,
        }
    }

    pub fn set_style(&self, property: &str, value: &str) {
        self.node
            .styles
            .borrow_mut()
            .insert(property.to_string(), value.to_string());
    }

    pub fn style(&self, property: &str) -> Option<String> {
        self.node.styles.borrow().get(property).cloned()
    }

    pub fn set_text(&self, text: &str) {
        *self.node.text.borrow_mut() = text.to_string();
    }

    pub fn text(&self) -> String {
        self.node.text.borrow().clone()
    }

    // =========================================================================
    // Tree structure
    // =========================================================================

    /// Append `child`, detaching it from any previous parent first.
    ///
    /// Appending an ancestor of `self` would create a cycle; the call is
    /// ignored with a warning instead.
    pub fn append(&self, child: &Element) {
        if self.same_node(child) || self.is_descendant_of(child) {
            warn!(tag = %child.tag(), "append ignored: would create a cycle");
            return;
        }
        if let Some(old_parent) = child.parent() {
            old_parent.remove_child(child);
        }
        *child.node.parent.borrow_mut() = Rc::downgrade(&self.node);
        self.node.children.borrow_mut().push(child.clone());
    }

    /// Remove `child` from this element's children, if present.
    pub fn remove_child(&self, child: &Element) {
        let mut children = self.node.children.borrow_mut();
        if let Some(position) = children.iter().position(|c| c.same_node(child)) {
            children.remove(position);
            *child.node.parent.borrow_mut() = Weak::new();
        }
    }

    /// Drop the entire child subtree, detaching parent links.
    pub fn clear(&self) {
        let children: Vec<Element> = self.node.children.borrow_mut().drain(..).collect();
        for child in &children {
            *child.node.parent.borrow_mut() = Weak::new();
        }
    }

    pub fn children(&self) -> Vec<Element> {
        self.node.children.borrow().clone()
    }

    pub fn child_count(&self) -> usize {
        self.node.children.borrow().len()
    }

    pub fn parent(&self) -> Option<Element> {
        self.node.parent.borrow().upgrade().map(|node| Element { node })
    }

    fn is_descendant_of(&self, ancestor: &Element) -> bool {
        let mut current = self.parent();
        while let Some(element) = current {
            if element.same_node(ancestor) {
                return true;
            }
            current = element.parent();
        }
        false
    }

    // =========================================================================
    // Selector queries
    // =========================================================================

    /// Whether this element itself matches `selector`.
    pub fn matches(&self, selector: &str) -> Result<bool, DomError> {
        Ok(Selector::parse(selector)?.matches(self))
    }

    pub(crate) fn matches_selector(&self, selector: &Selector) -> bool {
        selector.matches(self)
    }

    /// Closest matching element: self first, then ancestors.
    pub fn closest(&self, selector: &str) -> Result<Option<Element>, DomError> {
        Ok(self.closest_matching(&Selector::parse(selector)?))
    }

    pub(crate) fn closest_matching(&self, selector: &Selector) -> Option<Element> {
        let mut current = Some(self.clone());
        while let Some(element) = current {
            if selector.matches(&element) {
                return Some(element);
            }
            current = element.parent();
        }
        None
    }

    /// First descendant (depth-first, excluding self) matching `selector`.
    pub fn find(&self, selector: &str) -> Result<Option<Element>, DomError> {
        let selector = Selector::parse(selector)?;
        Ok(self.find_matching(&selector))
    }

    fn find_matching(&self, selector: &Selector) -> Option<Element> {
        for child in self.children() {
            if selector.matches(&child) {
                return Some(child);
            }
            if let Some(found) = child.find_matching(selector) {
                return Some(found);
            }
        }
        None
    }

    /// All descendants (depth-first, excluding self) matching `selector`.
    pub fn find_all(&self, selector: &str) -> Result<Vec<Element>, DomError> {
        let selector = Selector::parse(selector)?;
        let mut found = Vec::new();
        self.collect_matching(&selector, &mut found);
        Ok(found)
    }

    fn collect_matching(&self, selector: &Selector, found: &mut Vec<Element>) {
        for child in self.children() {
            if selector.matches(&child) {
                found.push(child.clone());
            }
            child.collect_matching(selector, found);
        }
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    /// Install a listener for `event_type`. Listeners run in install
    /// order during dispatch; the returned id removes it.
    pub fn add_listener<F>(&self, event_type: &str, listener: F) -> ListenerId
    where
        F: Fn(&EventContext) + 'static,
    {
        let id = ListenerId(self.node.next_listener_id.get());
        self.node.next_listener_id.set(id.0 + 1);
        self.node
            .listeners
            .borrow_mut()
            .entry(event_type.to_string())
            .or_default()
            .push((id, Rc::new(listener)));
        id
    }

    /// Remove a previously installed listener.
    pub fn remove_listener(&self, event_type: &str, id: ListenerId) {
        let mut listeners = self.node.listeners.borrow_mut();
        if let Some(for_type) = listeners.get_mut(event_type) {
            for_type.retain(|(listener_id, _)| *listener_id != id);
            if for_type.is_empty() {
                listeners.remove(event_type);
            }
        }
    }

    /// Snapshot of this node's listeners for one event type. Dispatch
    /// iterates the snapshot so listeners can re-bind without
    /// invalidating the in-flight pass.
    pub(crate) fn listeners_for(&self, event_type: &str) -> Vec<Rc<ListenerFn>> {
        self.node
            .listeners
            .borrow()
            .get(event_type)
            .map(|for_type| for_type.iter().map(|(_, l)| l.clone()).collect())
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Element")
            .field("tag", &self.node.tag)
            .field("id", &self.id())
            .field("children", &self.child_count())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
