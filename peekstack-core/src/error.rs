//! Error types for stack operations.

use thiserror::Error;

use crate::ViewHandle;

/// Result type for stack operations.
pub type StackResult<T> = Result<T, StackError>;

/// Errors that can occur in stack operations.
///
/// All of these are local and recoverable: the stack is left exactly as it
/// was before the rejected call.
#[derive(Debug, Error)]
pub enum StackError {
    /// A transition is already in flight.
    #[error("A transition is already active")]
    Busy,

    /// The view is not part of the stack.
    #[error("View not found in stack: {0}")]
    NotFound(ViewHandle),

    /// The operation would pop or reveal past the root.
    #[error("Operation would move past the root view")]
    InvalidRoot,

    /// The view is already on the stack.
    #[error("View is already in the stack: {0}")]
    AlreadyInStack(ViewHandle),

    /// Stack settings failed validation.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// Settings or snapshot serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StackError {
    /// Check whether the caller may simply retry once the current transition ends.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        matches!(self, Self::Busy)
    }
}
