//! Todo demo - every core unit wired together.
//!
//! A persisted task store, a list component with delegated click
//! handlers (row toggle guarded against its delete button), a second
//! route, and a manually pumped frame loop standing in for the host's
//! repaint callback.
//!
//! Run with `cargo run --example todo`.

use serde_json::{Value, json};
use spark_dom::{
    BindingOptions, ComponentCore, ComponentHandle, Element, EventDelegator, ManualFrames,
    MatchMode, MemoryHistory, MemoryStorage, PersistDescriptor, Render, Router, StateStore,
    StorageHook, state_map,
};

struct TaskList {
    core: ComponentCore,
    container: Element,
    store: StateStore,
    delegator: EventDelegator,
}

impl Render for TaskList {
    fn core(&self) -> &ComponentCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn render(&mut self) {
        self.container.clear();

        let heading = Element::create("h1");
        heading.set_text("Tasks");
        self.container.append(&heading);

        let list = Element::create("ul");
        let tasks = self
            .core
            .state()
            .get("tasks")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        for task in tasks {
            let row = Element::create("li");
            let done = task["done"].as_bool().unwrap_or(false);
            row.set_attribute("class", if done { "task done" } else { "task" });
            row.set_attribute("id", &format!("task-{}", task["id"]));
            row.set_text(task["text"].as_str().unwrap_or(""));
            if done {
                row.set_style("text-decoration", "line-through");
            }

            let delete = Element::create("button");
            delete.set_attribute("class", "delete");
            delete.set_text("x");
            row.append(&delete);
            list.append(&row);
        }
        self.container.append(&list);

        let store = self.store.clone();
        self.delegator
            .on(&self.container, "click", "li.task", move |_, row| {
                let id = task_id(row);
                let tasks = map_tasks(&store, |mut task| {
                    if task["id"] == json!(id) {
                        let done = task["done"].as_bool().unwrap_or(false);
                        task["done"] = json!(!done);
                    }
                    task
                });
                store.update(state_map(&[("tasks", Value::Array(tasks))]));
            },
            BindingOptions::new()
                .mode(MatchMode::Closest)
                .ignore_within("button"))
            .expect("selector");

        let store = self.store.clone();
        self.delegator
            .on(&self.container, "click", "button.delete", move |_, button| {
                let Ok(Some(row)) = button.closest("li.task") else { return };
                let id = task_id(&row);
                let tasks: Vec<Value> = map_tasks(&store, |task| task)
                    .into_iter()
                    .filter(|task| task["id"] != json!(id))
                    .collect();
                store.update(state_map(&[("tasks", Value::Array(tasks))]));
            },
            BindingOptions::new().mode(MatchMode::Closest))
            .expect("selector");
    }
}

struct AboutPage {
    core: ComponentCore,
    container: Element,
}

impl Render for AboutPage {
    fn core(&self) -> &ComponentCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn render(&mut self) {
        self.container.clear();
        let text = Element::create("p");
        text.set_text("A todo list, rebuilt from state on every render.");
        self.container.append(&text);
    }
}

fn task_id(row: &Element) -> i64 {
    row.id()
        .and_then(|id| id.strip_prefix("task-").map(str::to_string))
        .and_then(|id| id.parse().ok())
        .unwrap_or(-1)
}

fn map_tasks(store: &StateStore, f: impl FnMut(Value) -> Value) -> Vec<Value> {
    store
        .get("tasks")
        .and_then(|tasks| tasks.as_array().cloned())
        .unwrap_or_default()
        .into_iter()
        .map(f)
        .collect()
}

fn print_tree(element: &Element, depth: usize) {
    let indent = "  ".repeat(depth);
    let class = element
        .attribute("class")
        .map(|c| format!(" class={c:?}"))
        .unwrap_or_default();
    let text = element.text();
    let text = if text.is_empty() { String::new() } else { format!(" {text:?}") };
    println!("{indent}<{}{class}>{text}", element.tag());
    for child in element.children() {
        print_tree(&child, depth + 1);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let frames = ManualFrames::new();
    let storage = MemoryStorage::new();
    let history = MemoryHistory::new();
    let container = Element::create("div");
    container.set_attribute("id", "app");

    let store = StateStore::with_persistence(
        state_map(&[("tasks", json!([
            {"id": 1, "text": "learn the framework", "done": false},
            {"id": 2, "text": "build the demo", "done": false},
        ]))]),
        PersistDescriptor::new("todo-state"),
        storage.clone(),
    );

    let tasks = ComponentHandle::new(TaskList {
        core: ComponentCore::with_state(frames.clone(), store.snapshot()),
        container: container.clone(),
        store: store.clone(),
        delegator: EventDelegator::new(),
    });
    let about = ComponentHandle::new(AboutPage {
        core: ComponentCore::new(frames.clone()),
        container: container.clone(),
    });

    let tasks_clone = tasks.clone();
    store.subscribe(move |state| tasks_clone.set_state(state.clone()));

    let router = Router::new(history.clone());
    router.add_route("/", tasks.as_dyn());
    router.add_route("/about", about.as_dyn());

    router.navigate("/").expect("route registered");
    println!("-- initial render");
    print_tree(&container, 0);

    // Toggle task 1 and delete task 2, then pump one frame: the two
    // mutations coalesce into a single re-render.
    if let Ok(Some(row)) = container.find("#task-1") {
        row.dispatch("click");
    }
    if let Ok(Some(row)) = container.find("#task-2") {
        if let Ok(Some(delete)) = row.find("button.delete") {
            delete.dispatch("click");
        }
    }
    let renders = frames.run_frame();
    println!("-- after click + delete ({renders} coalesced render)");
    print_tree(&container, 0);

    router.navigate("/about").expect("route registered");
    println!("-- /about");
    print_tree(&container, 0);

    history.back();
    println!("-- back to / (history pop, no push)");
    print_tree(&container, 0);

    println!(
        "-- persisted blob under \"todo-state\": {}",
        storage.get("todo-state").unwrap_or_default()
    );
}
