//! Component - Coalesced render scheduling
//!
//! A component owns local state and a scheduling flag. `set_state`
//! merges synchronously and schedules at most one render on the next
//! frame: N calls inside one scheduling window produce exactly one
//! render, which observes the fully merged state.
//!
//! The scheduled callback clears the flag *before* invoking `render`,
//! so a state change made during render legally starts a new
//! Idle → RenderPending cycle instead of being dropped.
//!
//! "Render must be overridden" is enforced at compile time: [`Render`]
//! has no default implementation.
//!
//! Renders are not idempotent with respect to the DOM: each invocation
//! is expected to clear and fully rebuild its container subtree. That is
//! a deliberate simplicity trade-off, not an omission.
//!
//! # Example
//!
//! ```
//! use spark_dom::{ComponentCore, ComponentHandle, Element, ManualFrames, Render, state_map};
//! use serde_json::json;
//!
//! struct Counter {
//!     core: ComponentCore,
//!     container: Element,
//! }
//!
//! impl Render for Counter {
//!     fn core(&self) -> &ComponentCore { &self.core }
//!     fn core_mut(&mut self) -> &mut ComponentCore { &mut self.core }
//!
//!     fn render(&mut self) {
//!         self.container.clear();
//!         let label = Element::create("span");
//!         label.set_text(&self.core.state()["count"].to_string());
//!         self.container.append(&label);
//!     }
//! }
//!
//! let frames = ManualFrames::new();
//! let counter = ComponentHandle::new(Counter {
//!     core: ComponentCore::with_state(frames.clone(), state_map(&[("count", json!(0))])),
//!     container: Element::create("div"),
//! });
//!
//! counter.set_state(state_map(&[("count", json!(1))]));
//! counter.set_state(state_map(&[("count", json!(2))]));
//! frames.run_frame(); // one render, sees count == 2
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::trace;

use crate::platform::FrameHook;
use crate::store::StateMap;

/// The one operation every component must implement, plus access to its
/// embedded [`ComponentCore`].
pub trait Render {
    fn core(&self) -> &ComponentCore;
    fn core_mut(&mut self) -> &mut ComponentCore;

    /// Rebuild this component's DOM subtree from current state.
    fn render(&mut self);
}

/// Type-erased shared component reference, the shape the router holds.
pub type DynComponent = Rc<RefCell<dyn Render>>;

type Waker = Rc<dyn Fn()>;

/// Per-component state and scheduling plumbing, embedded by concrete
/// components.
pub struct ComponentCore {
    state: StateMap,
    scheduled: Rc<Cell<bool>>,
    frames: Rc<dyn FrameHook>,
    // Installed by ComponentHandle::new; knows how to queue a render of
    // the owning component without keeping it alive.
    waker: RefCell<Option<Waker>>,
}

impl ComponentCore {
    pub fn new(frames: Rc<dyn FrameHook>) -> ComponentCore {
        Self::with_state(frames, StateMap::new())
    }

    pub fn with_state(frames: Rc<dyn FrameHook>, initial: StateMap) -> ComponentCore {
        ComponentCore {
            state: initial,
            scheduled: Rc::new(Cell::new(false)),
            frames,
            waker: RefCell::new(None),
        }
    }

    /// Current local state.
    pub fn state(&self) -> &StateMap {
        &self.state
    }

    /// Merge `partial` into local state synchronously, then schedule a
    /// coalesced render.
    pub fn set_state(&mut self, partial: StateMap) {
        for (key, value) in partial {
            self.state.insert(key, value);
        }
        self.schedule_render();
    }

    /// Schedule a render if one is not already pending. Safe to call
    /// from inside `render`: the pending flag was cleared before the
    /// render started, so this begins a fresh cycle.
    pub fn schedule_render(&self) {
        let waker = self.waker.borrow().clone();
        match waker {
            Some(waker) => waker(),
            // Core not wrapped in a ComponentHandle yet; nothing can
            // run the render, so there is nothing to schedule.
            None => trace!("schedule_render before handle wiring; ignored"),
        }
    }

    /// True between a first `set_state` and the start of the scheduled
    /// render callback.
    pub fn render_pending(&self) -> bool {
        self.scheduled.get()
    }

    fn install_waker(&self, waker: Waker) {
        *self.waker.borrow_mut() = Some(waker);
    }

    fn scheduled_flag(&self) -> Rc<Cell<bool>> {
        self.scheduled.clone()
    }

    fn frames(&self) -> Rc<dyn FrameHook> {
        self.frames.clone()
    }
}

/// Shared handle to a component, wiring its core to the frame hook.
///
/// Cheap to clone. Dropping every handle (and every [`DynComponent`]
/// reference) discards the component; a frame that fires afterwards is
/// a no-op. There is no explicit teardown hook.
pub struct ComponentHandle<C: Render + 'static> {
    inner: Rc<RefCell<C>>,
}

impl<C: Render + 'static> Clone for ComponentHandle<C> {
    fn clone(&self) -> Self {
        ComponentHandle { inner: self.inner.clone() }
    }
}

impl<C: Render + 'static> ComponentHandle<C> {
    /// Wrap a component and install its scheduling waker.
    pub fn new(component: C) -> ComponentHandle<C> {
        let inner = Rc::new(RefCell::new(component));
        let (scheduled, frames) = {
            let component = inner.borrow();
            (component.core().scheduled_flag(), component.core().frames())
        };

        let weak = Rc::downgrade(&inner);
        let waker: Waker = Rc::new(move || {
            if scheduled.get() {
                // Already pending; this call is absorbed into it.
                return;
            }
            scheduled.set(true);
            trace!("render scheduled");

            let scheduled = scheduled.clone();
            let weak = weak.clone();
            frames.request_frame(Box::new(move || {
                // Clear before rendering so a set_state made during
                // render schedules a new, separate render.
                scheduled.set(false);
                if let Some(component) = weak.upgrade() {
                    component.borrow_mut().render();
                }
            }));
        });

        inner.borrow().core().install_waker(waker);
        ComponentHandle { inner }
    }

    /// Merge into component state and schedule a coalesced render.
    ///
    /// Must not be called from inside this component's own `render`
    /// (use [`ComponentCore::set_state`] on `self` there instead).
    pub fn set_state(&self, partial: StateMap) {
        self.inner.borrow_mut().core_mut().set_state(partial);
    }

    /// Clone of the component's current local state.
    pub fn state(&self) -> StateMap {
        self.inner.borrow().core().state().clone()
    }

    pub fn render_pending(&self) -> bool {
        self.inner.borrow().core().render_pending()
    }

    /// Invoke `render` immediately, bypassing the scheduler. The
    /// router's load path uses this.
    pub fn render_now(&self) {
        self.inner.borrow_mut().render();
    }

    /// Run `f` with a shared borrow of the component.
    pub fn with<R>(&self, f: impl FnOnce(&C) -> R) -> R {
        f(&self.inner.borrow())
    }

    /// Run `f` with an exclusive borrow of the component.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut C) -> R) -> R {
        f(&mut self.inner.borrow_mut())
    }

    /// Type-erased shared reference for the route table.
    pub fn as_dyn(&self) -> DynComponent {
        self.inner.clone()
    }
}

// =============================================================================
// Tests
// =============================================================================
