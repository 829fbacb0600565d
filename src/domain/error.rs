//! Error types for domain parsing and task state transitions.

use super::{TaskId, TaskStatus};
use thiserror::Error;

/// Error returned while parsing a member role string.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown member role: {0}")]
pub struct ParseMemberRoleError(pub String);

/// Error returned while parsing a task status string.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing a task priority string.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task priority: {0}")]
pub struct ParseTaskPriorityError(pub String);

/// Error returned while parsing a token scope string.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown token scope: {0}")]
pub struct ParseTokenScopeError(pub String);

/// Reasons a task lifecycle transition is refused.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskTransitionError {
    /// The acting user is not the participant allowed to perform the
    /// transition.
    #[error("user is not permitted to move task {task_id} to {to}")]
    NotPermitted {
        /// Task identifier.
        task_id: TaskId,
        /// Requested target status.
        to: TaskStatus,
    },

    /// The task due time has already passed.
    #[error("task {0} is overdue")]
    Overdue(TaskId),

    /// The current status does not allow the requested transition.
    #[error("invalid task status transition for {task_id}: {from} -> {to}")]
    StatusConflict {
        /// Task identifier.
        task_id: TaskId,
        /// Current status.
        from: TaskStatus,
        /// Requested target status.
        to: TaskStatus,
    },
}
