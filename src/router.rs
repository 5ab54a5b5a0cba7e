//! Router - Path-to-component navigation over the history port
//!
//! Exact-string route table: normalized path → shared component
//! reference. `navigate` pushes one history entry and loads the route;
//! host-initiated back/forward (heard via the pop subscription taken at
//! construction) loads the current path without pushing.
//!
//! Matching is exact only: no patterns, params, or nested routes. A
//! missing route is reported and recovered: logged, `RouteNotFound`
//! returned, no DOM change.
//!
//! # Example
//!
//! ```
//! use spark_dom::{MemoryHistory, Router};
//! # use spark_dom::{ComponentCore, ComponentHandle, ManualFrames, Render};
//! # struct Page { core: ComponentCore }
//! # impl Render for Page {
//! #     fn core(&self) -> &ComponentCore { &self.core }
//! #     fn core_mut(&mut self) -> &mut ComponentCore { &mut self.core }
//! #     fn render(&mut self) {}
//! # }
//!
//! let history = MemoryHistory::new();
//! let router = Router::new(history.clone());
//! # let frames = ManualFrames::new();
//! # let page = ComponentHandle::new(Page { core: ComponentCore::new(frames) });
//! router.add_route("/tasks", page.as_dyn());
//! router.navigate("/tasks").unwrap();
//! history.back(); // re-renders whatever "/" maps to, or logs RouteNotFound
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, error};

use crate::component::DynComponent;
use crate::error::RouterError;
use crate::platform::HistoryHook;

/// Normalize a path for route-table keying: leading `/` guaranteed,
/// trailing slashes stripped (except the root itself).
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return "/".to_string();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

struct RouterInner {
    routes: HashMap<String, DynComponent>,
    history: Rc<dyn HistoryHook>,
}

/// History-driven path-to-component router. Holds shared references
/// only; it never constructs or destroys components.
#[derive(Clone)]
pub struct Router {
    inner: Rc<RefCell<RouterInner>>,
}

impl Router {
    /// Create a router and subscribe to pop-state events. Back/forward
    /// movement re-runs the load path for the then-current location
    /// without pushing a new entry.
    pub fn new(history: Rc<dyn HistoryHook>) -> Router {
        let router = Router {
            inner: Rc::new(RefCell::new(RouterInner {
                routes: HashMap::new(),
                history: history.clone(),
            })),
        };

        let weak = Rc::downgrade(&router.inner);
        history.on_pop(Box::new(move |path| {
            if let Some(inner) = weak.upgrade() {
                // Already logged inside; pop has no caller to hand an
                // error to.
                let _ = Self::load(&inner, &path);
            }
        }));
        router
    }

    /// Register `component` under `path`. A later call with the same
    /// (normalized) path replaces the mapping.
    pub fn add_route(&self, path: &str, component: DynComponent) {
        let path = normalize_path(path);
        debug!(%path, "route registered");
        self.inner.borrow_mut().routes.insert(path, component);
    }

    /// Push one history entry for `path`, then load its route.
    pub fn navigate(&self, path: &str) -> Result<(), RouterError> {
        let path = normalize_path(path);
        self.inner.borrow().history.push(&path);
        Self::load(&self.inner, &path)
    }

    /// Load the route for `path` without touching history: invoke the
    /// mapped component's render entry point, or report `RouteNotFound`.
    pub fn load_route(&self, path: &str) -> Result<(), RouterError> {
        Self::load(&self.inner, &normalize_path(path))
    }

    /// The path of the current history entry.
    pub fn current_path(&self) -> String {
        self.inner.borrow().history.current()
    }

    fn load(inner: &Rc<RefCell<RouterInner>>, path: &str) -> Result<(), RouterError> {
        // Take the component out of the borrow before rendering: the
        // render may navigate again.
        let component = inner.borrow().routes.get(path).cloned();
        match component {
            Some(component) => {
                debug!(%path, "loading route");
                component.borrow_mut().render();
                Ok(())
            }
            None => {
                error!(%path, "route not found");
                Err(RouterError::RouteNotFound { path: path.to_string() })
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{ComponentCore, ComponentHandle, Render};
    use crate::platform::{ManualFrames, MemoryHistory};
    use std::cell::Cell;

    struct Page {
        core: ComponentCore,
        renders: Rc<Cell<usize>>,
    }

    impl Render for Page {
        fn core(&self) -> &ComponentCore {
            &self.core
        }
        fn core_mut(&mut self) -> &mut ComponentCore {
            &mut self.core
        }
        fn render(&mut self) {
            self.renders.set(self.renders.get() + 1);
        }
    }

    fn page(frames: &Rc<ManualFrames>) -> (ComponentHandle<Page>, Rc<Cell<usize>>) {
        let renders = Rc::new(Cell::new(0));
        let handle = ComponentHandle::new(Page {
            core: ComponentCore::new(frames.clone()),
            renders: renders.clone(),
        });
        (handle, renders)
    }

    #[test]
    fn test_navigate_renders_once_and_pushes_once() {
        let frames = ManualFrames::new();
        let history = MemoryHistory::new();
        let router = Router::new(history.clone());
        let (handle, renders) = page(&frames);

        router.add_route("/x", handle.as_dyn());
        let before = history.len();

        router.navigate("/x").unwrap();
        assert_eq!(renders.get(), 1);
        assert_eq!(history.len(), before + 1);
        assert_eq!(history.current(), "/x");
    }

    #[test]
    fn test_navigate_missing_route_is_route_not_found() {
        let history = MemoryHistory::new();
        let router = Router::new(history);

        let result = router.navigate("/missing");
        assert_eq!(
            result,
            Err(RouterError::RouteNotFound { path: "/missing".to_string() })
        );
    }

    #[test]
    fn test_add_route_replaces_mapping() {
        let frames = ManualFrames::new();
        let history = MemoryHistory::new();
        let router = Router::new(history);

        let (first, first_renders) = page(&frames);
        let (second, second_renders) = page(&frames);

        router.add_route("/x", first.as_dyn());
        router.add_route("/x", second.as_dyn());

        router.navigate("/x").unwrap();
        assert_eq!(first_renders.get(), 0);
        assert_eq!(second_renders.get(), 1);
    }

    #[test]
    fn test_back_forward_reload_without_pushing() {
        let frames = ManualFrames::new();
        let history = MemoryHistory::new();
        let router = Router::new(history.clone());

        let (home, home_renders) = page(&frames);
        let (about, about_renders) = page(&frames);
        router.add_route("/", home.as_dyn());
        router.add_route("/about", about.as_dyn());

        router.navigate("/about").unwrap();
        let entries = history.len();

        history.back();
        assert_eq!(home_renders.get(), 1);
        history.forward();
        assert_eq!(about_renders.get(), 2);
        // Pop navigation never pushes.
        assert_eq!(history.len(), entries);
    }

    #[test]
    fn test_path_normalization() {
        assert_eq!(normalize_path("/x/"), "/x");
        assert_eq!(normalize_path("x"), "/x");
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("  /tasks/  "), "/tasks");

        let frames = ManualFrames::new();
        let history = MemoryHistory::new();
        let router = Router::new(history);
        let (handle, renders) = page(&frames);

        router.add_route("/tasks/", handle.as_dyn());
        router.navigate("tasks").unwrap();
        assert_eq!(renders.get(), 1);
    }

    #[test]
    fn test_exact_match_only() {
        let frames = ManualFrames::new();
        let history = MemoryHistory::new();
        let router = Router::new(history);
        let (handle, _renders) = page(&frames);

        router.add_route("/tasks", handle.as_dyn());
        assert!(router.navigate("/tasks/1").is_err());
        assert!(router.navigate("/task").is_err());
    }

    #[test]
    fn test_pop_with_unregistered_path_is_quiet() {
        let history = MemoryHistory::new();
        // Keep the router alive; the pop handler only holds a weak ref.
        let _router = Router::new(history.clone());

        history.push("/nowhere");
        history.back(); // Loads "/": unregistered, logged, no panic.
    }
}
