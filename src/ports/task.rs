//! Repository port for team tasks.

use crate::domain::{Task, TaskId, TaskPriority, TaskStatus, TeamId, Version};
use crate::pagination::{Page, Pagination};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Filters applied when listing tasks.
///
/// Time bounds are inclusive. Empty status and priority lists keep every
/// task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilters {
    /// Keeps tasks created at or before this instant.
    pub created_before: Option<DateTime<Utc>>,
    /// Keeps tasks created at or after this instant.
    pub created_after: Option<DateTime<Utc>>,
    /// Keeps tasks due at or before this instant.
    pub due_before: Option<DateTime<Utc>>,
    /// Keeps tasks due at or after this instant.
    pub due_after: Option<DateTime<Utc>>,
    /// Keeps tasks in one of these statuses.
    pub statuses: Vec<TaskStatus>,
    /// Keeps tasks with one of these priorities.
    pub priorities: Vec<TaskPriority>,
    /// Case-insensitive substring of the creator's username.
    pub creator_username: String,
    /// Case-insensitive substring of the assignee's username.
    pub assignee_username: String,
}

/// Task persistence contract.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the identifier
    /// already exists.
    async fn insert(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier within `team`.
    async fn find_by_id(&self, id: TaskId, team: TeamId) -> TaskRepositoryResult<Option<Task>>;

    /// Lists the tasks of `team`, oldest first.
    async fn list(
        &self,
        team: TeamId,
        filters: &TaskFilters,
        pagination: &Pagination,
    ) -> TaskRepositoryResult<Page<Task>>;

    /// Writes `task` if the stored version still equals `task.version()`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::EditConflict`] on a version mismatch or
    /// a missing task.
    async fn update(&self, task: &Task) -> TaskRepositoryResult<Version>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The stored version no longer matches.
    #[error("edit conflict on task {0}")]
    EditConflict(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
