//! End-to-end data flow: delegated click → store mutation → coalesced
//! render → rebuilt subtree, with routing and persistence on top.
//!
//! Everything runs against the in-memory platform doubles; frames are
//! pumped manually so every scheduling window is explicit.

use std::cell::Cell;
use std::rc::Rc;

use serde_json::{Value, json};
use spark_dom::{
    BindingOptions, ComponentCore, ComponentHandle, Element, EventDelegator, HistoryHook,
    ManualFrames, MatchMode, MemoryHistory, MemoryStorage, PersistDescriptor, Render, Router,
    RouterError, StateStore, state_map,
};

/// Todo-list component: renders its store's tasks as `li.task` rows,
/// each with a delete button, and re-registers its delegated bindings
/// on every render (the delegator's keyed registry keeps that safe).
struct TaskList {
    core: ComponentCore,
    container: Element,
    store: StateStore,
    delegator: EventDelegator,
    renders: Rc<Cell<usize>>,
}

impl TaskList {
    fn new(
        frames: Rc<ManualFrames>,
        container: Element,
        store: StateStore,
        delegator: EventDelegator,
    ) -> (ComponentHandle<TaskList>, Rc<Cell<usize>>) {
        let renders = Rc::new(Cell::new(0));
        let handle = ComponentHandle::new(TaskList {
            core: ComponentCore::with_state(frames, store.snapshot()),
            container,
            store,
            delegator,
            renders: renders.clone(),
        });

        // Store changes flow into component state, which schedules a
        // coalesced render.
        let store = handle.with(|c| c.store.clone());
        let handle_clone = handle.clone();
        store.subscribe(move |state| handle_clone.set_state(state.clone()));

        (handle, renders)
    }

    fn tasks(&self) -> Vec<Value> {
        self.core
            .state()
            .get("tasks")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    }
}

impl Render for TaskList {
    fn core(&self) -> &ComponentCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn render(&mut self) {
        self.renders.set(self.renders.get() + 1);
        self.container.clear();

        let list = Element::create("ul");
        for task in self.tasks() {
            let row = Element::create("li");
            let done = task["done"].as_bool().unwrap_or(false);
            row.set_attribute("class", if done { "task done" } else { "task" });
            row.set_attribute("id", &format!("task-{}", task["id"]));
            row.set_text(task["text"].as_str().unwrap_or(""));

            let delete = Element::create("button");
            delete.set_attribute("class", "delete");
            row.append(&delete);
            list.append(&row);
        }
        self.container.append(&list);

        // Row click toggles done; clicks landing on the delete button
        // are excluded by the guard.
        let store = self.store.clone();
        self.delegator
            .on(&self.container, "click", "li.task", move |_, row| {
                let id = row_task_id(row);
                let tasks = toggle_done(&store, id);
                store.update(state_map(&[("tasks", Value::Array(tasks))]));
            },
            BindingOptions::new()
                .mode(MatchMode::Closest)
                .ignore_within("button"))
            .expect("valid selector");

        let store = self.store.clone();
        self.delegator
            .on(&self.container, "click", "button.delete", move |_, button| {
                let id = button.closest("li.task").unwrap().map(|row| row_task_id(&row));
                let Some(id) = id else { return };
                let tasks: Vec<Value> = store
                    .get("tasks")
                    .and_then(|t| t.as_array().cloned())
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|task| task["id"] != json!(id))
                    .collect();
                store.update(state_map(&[("tasks", Value::Array(tasks))]));
            },
            BindingOptions::new().mode(MatchMode::Closest))
            .expect("valid selector");
    }
}

fn row_task_id(row: &Element) -> i64 {
    row.id()
        .and_then(|id| id.strip_prefix("task-").map(str::to_string))
        .and_then(|id| id.parse().ok())
        .unwrap_or(-1)
}

fn toggle_done(store: &StateStore, id: i64) -> Vec<Value> {
    store
        .get("tasks")
        .and_then(|t| t.as_array().cloned())
        .unwrap_or_default()
        .into_iter()
        .map(|mut task| {
            if task["id"] == json!(id) {
                let done = task["done"].as_bool().unwrap_or(false);
                task["done"] = json!(!done);
            }
            task
        })
        .collect()
}

struct Fixture {
    frames: Rc<ManualFrames>,
    storage: Rc<MemoryStorage>,
    container: Element,
    store: StateStore,
    handle: ComponentHandle<TaskList>,
    renders: Rc<Cell<usize>>,
}

fn fixture() -> Fixture {
    let frames = ManualFrames::new();
    let storage = MemoryStorage::new();
    let container = Element::create("div");
    container.set_attribute("id", "app");

    let store = StateStore::with_persistence(
        state_map(&[
            ("tasks", json!([
                {"id": 1, "text": "write tests", "done": false},
                {"id": 2, "text": "ship", "done": false},
            ])),
            ("page", json!(1)),
        ]),
        PersistDescriptor::new("todo-state"),
        storage.clone(),
    );

    let (handle, renders) = TaskList::new(
        frames.clone(),
        container.clone(),
        store.clone(),
        EventDelegator::new(),
    );

    Fixture { frames, storage, container, store, handle, renders }
}

fn row(fixture: &Fixture, id: i64) -> Element {
    fixture
        .container
        .find(&format!("#task-{id}"))
        .unwrap()
        .expect("row exists")
}

#[test]
fn click_toggles_task_through_store_and_rerenders_once() {
    let f = fixture();
    f.handle.render_now();
    assert_eq!(f.renders.get(), 1);

    // Click the first row: delegated handler mutates the store, the
    // subscriber schedules a render.
    row(&f, 1).dispatch("click");
    assert_eq!(f.renders.get(), 1); // Deferred to the next frame.
    assert_eq!(f.frames.run_frame(), 1);
    assert_eq!(f.renders.get(), 2);

    assert!(row(&f, 1).has_class("done"));
    assert!(!row(&f, 2).has_class("done"));
    assert_eq!(f.store.get("tasks").unwrap()[0]["done"], json!(true));
}

#[test]
fn rapid_mutations_coalesce_into_one_render() {
    let f = fixture();
    f.handle.render_now();

    row(&f, 1).dispatch("click");
    row(&f, 2).dispatch("click");
    f.store.update(state_map(&[("page", json!(2))]));

    // Three mutations, one scheduling window, one render.
    assert_eq!(f.frames.run_frame(), 1);
    assert_eq!(f.renders.get(), 2);
    assert!(row(&f, 1).has_class("done"));
    assert!(row(&f, 2).has_class("done"));
    assert_eq!(f.handle.state().get("page"), Some(&json!(2)));
}

#[test]
fn delete_button_is_guarded_from_row_toggle() {
    let f = fixture();
    f.handle.render_now();

    // The click lands on the button inside the row: the row's toggle
    // binding is guarded, the delete binding fires.
    row(&f, 1).find("button.delete").unwrap().unwrap().dispatch("click");
    f.frames.run_frame();

    let tasks = f.store.get("tasks").unwrap();
    assert_eq!(tasks.as_array().unwrap().len(), 1);
    assert_eq!(tasks[0]["id"], json!(2));
    // Task 2 was not toggled by the guarded row binding.
    assert_eq!(tasks[0]["done"], json!(false));
    assert!(f.container.find("#task-1").unwrap().is_none());
}

#[test]
fn rebinding_across_renders_does_not_double_dispatch() {
    let f = fixture();
    f.handle.render_now();
    f.handle.render_now();
    f.handle.render_now();

    // Three renders re-registered the same binding keys three times.
    row(&f, 1).dispatch("click");
    f.frames.run_frame();

    // A duplicated binding would toggle twice, landing back on false.
    assert_eq!(f.store.get("tasks").unwrap()[0]["done"], json!(true));
}

#[test]
fn state_survives_store_reconstruction() {
    let f = fixture();
    f.handle.render_now();
    row(&f, 1).dispatch("click");
    f.frames.run_frame();

    // A fresh store under the same key rehydrates the toggled state.
    let rehydrated = StateStore::with_persistence(
        state_map(&[("tasks", json!([]))]),
        PersistDescriptor::new("todo-state"),
        f.storage.clone(),
    );
    assert_eq!(rehydrated.get("tasks").unwrap()[0]["done"], json!(true));
}

#[test]
fn router_drives_the_component_and_history() {
    let f = fixture();
    let history = MemoryHistory::new();
    let router = Router::new(history.clone());
    router.add_route("/tasks", f.handle.as_dyn());

    router.navigate("/tasks").unwrap();
    assert_eq!(f.renders.get(), 1);
    assert_eq!(history.current(), "/tasks");
    assert_eq!(history.len(), 2);

    assert_eq!(
        router.navigate("/missing"),
        Err(RouterError::RouteNotFound { path: "/missing".to_string() })
    );
    assert_eq!(f.renders.get(), 1); // No render for a missing route.

    // Back to /tasks re-renders without pushing.
    history.back();
    assert_eq!(f.renders.get(), 2);
    assert_eq!(history.len(), 3);
}
