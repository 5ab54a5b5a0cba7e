//! # spark-dom
//!
//! Reactive client-side UI framework core for Rust.
//!
//! Four collaborating units: a reactive state container, a component
//! base with batched re-rendering, a delegated event dispatcher, and a
//! history-based router. Everything the host would normally provide
//! (storage, frame scheduling, history) is injected through the
//! [`platform`] ports, so the whole framework runs deterministically
//! without a browser.
//!
//! ## Data flow
//!
//! ```text
//! interaction → EventDelegator → handler → StateStore / set_state
//!             → coalesced render (next frame) → rebuild DOM subtree
//! ```
//!
//! The [`Router`] sits above components, swapping which one is active
//! per path.
//!
//! ## Contracts
//!
//! - N state changes inside one frame window produce exactly one
//!   render, which observes the fully merged state.
//! - Store subscribers fire exactly once per mutation, in subscription
//!   order; persistence writes land before notification.
//! - Renders rebuild their subtree wholesale; there is no diffing.
//!
//! ## Modules
//!
//! - [`platform`] - Injected host ports (storage, frames, history) and
//!   their in-memory doubles
//! - [`dom`] - Element tree, selector matching, bubbling dispatch
//! - [`store`] - Reactive state container with optional persistence
//! - [`component`] - Render trait and coalescing scheduler
//! - [`events`] - Delegated event binder
//! - [`router`] - History-driven path-to-component routing

pub mod component;
pub mod dom;
pub mod error;
pub mod events;
pub mod platform;
pub mod router;
pub mod store;

// Re-export commonly used items
pub use component::{ComponentCore, ComponentHandle, DynComponent, Render};

pub use dom::{Element, EventContext, ListenerId, NodeId, Selector, WeakElement};

pub use error::{DomError, RouterError};

pub use events::{BindingOptions, DispatchOptions, EventDelegator, MatchMode};

pub use platform::{
    FrameCallback, FrameHook, HistoryHook, ManualFrames, MemoryHistory, MemoryStorage,
    PopCallback, StorageHook,
};

pub use router::{Router, normalize_path};

pub use store::{PersistDescriptor, StateMap, StateStore, SubscriptionId, state_map};
