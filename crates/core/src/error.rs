//! Domain-level error type shared by every crate in the workspace.

use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A referenced record does not exist (or is not visible to the caller).
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// Input was rejected before any state change or backend call.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The request collides with existing data (e.g. a duplicate name).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// No signed-in identity, or the credentials were rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The signed-in identity lacks the capability for this operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
