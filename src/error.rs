//! Error types for the framework core.
//!
//! Recoverable conditions (missing route, corrupt persisted state) are
//! logged where they happen; the enums here exist so callers that *want*
//! to react can match on them.

use thiserror::Error;

/// Errors from the DOM facade.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    /// A selector string could not be parsed.
    ///
    /// Only simple selectors are supported: `tag`, `#id`, `.class`,
    /// `tag.class` and `*`.
    #[error("invalid selector: {0:?}")]
    InvalidSelector(String),
}

/// Errors from the router.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// Navigation targeted a path with no registered route.
    ///
    /// Non-fatal: the router logs it and leaves the DOM untouched.
    #[error("route not found: {path}")]
    RouteNotFound { path: String },
}
