//! Common error types used across the workspace.
//!
//! Refusing to start irrigation while it rains is a policy outcome, not an
//! error; it never shows up here.

/// Base error for the facility core.
#[derive(Debug, thiserror::Error)]
pub enum FacilityError {
    /// A referenced node, device kind or alert does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The engine has been shut down (or its task has exited).
    #[error("facility engine is not running")]
    Unavailable,
}

/// A lookup by textual identifier matched nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} not found: {id}")]
pub struct NotFoundError {
    /// Kind of thing that was looked up (e.g. `"Node"`).
    pub entity: &'static str,
    /// The identifier as received.
    pub id: String,
}
