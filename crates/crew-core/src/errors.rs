//! Cross-cutting error types for Crew.
//!
//! Storage-specific errors (`DatabaseError`) and configuration errors live in
//! their own crates. All of them converge into `anyhow` in `crew-cli`.

use thiserror::Error;

/// Errors raised by the coordination rules, independent of storage.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {key}")]
    NotFound { entity_type: String, key: String },

    /// A state machine transition was attempted that is not allowed.
    #[error("Invalid state transition: {entity_type} {id} from {from} to {to}")]
    InvalidTransition {
        entity_type: String,
        id: String,
        from: String,
        to: String,
    },

    /// The task is held by another actor (or was claimed concurrently).
    #[error("Task {id} is already claimed by {holder}")]
    AlreadyClaimed { id: String, holder: String },

    /// The operation requires the claim holder.
    #[error("Task {id} is claimed by {holder}, not {actor}")]
    NotClaimHolder {
        id: String,
        holder: String,
        actor: String,
    },

    /// The task's assignee does not admit the actor's kind.
    #[error("Task {id} is reserved for {assignee} contributors, not {kind}")]
    NotEligible {
        id: String,
        assignee: String,
        kind: String,
    },

    /// The task changed between read and conditional write.
    #[error("Task {id} changed concurrently: {reason}")]
    Conflict { id: String, reason: String },

    /// The actor is not allowed to perform an admin-only operation.
    #[error("Actor '{actor}' is not authorized to {action}")]
    Unauthorized { actor: String, action: String },

    /// Data failed validation (format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CoreError {
    #[must_use]
    pub fn task_not_found(key: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "task".into(),
            key: key.into(),
        }
    }

    #[must_use]
    pub fn invalid_task_transition(
        id: impl Into<String>,
        from: impl ToString,
        to: impl ToString,
    ) -> Self {
        Self::InvalidTransition {
            entity_type: "task".into(),
            id: id.into(),
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}
