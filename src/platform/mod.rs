//! Platform Module - Injected host surface
//!
//! The framework never touches host globals directly. Everything the
//! browser would normally provide is injected as a trait object at
//! construction time:
//!
//! - **Storage** - key-value string store (the `localStorage` shape)
//! - **Frames** - "run before next repaint" scheduling hook
//! - **History** - push-state navigation and pop-state notification
//!
//! Each port ships with a deterministic in-memory double so the whole
//! framework runs (and is tested) without a host environment.

mod frames;
mod history;
mod storage;

pub use frames::*;
pub use history::*;
pub use storage::*;
