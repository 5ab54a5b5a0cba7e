//! DOM Module - In-memory element tree and event surface
//!
//! The element-construction helper the rendering layer consumes, grown
//! just enough that delegated dispatch is real: a shared element tree,
//! simple selector matching, and bubbling event dispatch with
//! default-action and propagation flags.
//!
//! This is a facade over "the host document", not a browser: no layout,
//! no styling semantics, no namespaces. Selectors are deliberately
//! simple (`tag`, `#id`, `.class`, `tag.class`, `*`).

mod element;
mod event;
mod selector;

pub use element::*;
pub use event::*;
pub use selector::*;
