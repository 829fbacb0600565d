//! Task creation, retrieval and lifecycle transitions.

use crate::config::ServiceConfig;
use crate::deadline::with_deadline;
use crate::domain::{
    MemberRole, NewTask, Task, TaskId, TaskPriority, TaskStatus, TaskTransition, TeamId, UserId,
};
use crate::error::{ServiceError, ServiceResult};
use crate::pagination::{DEFAULT_SORT_SAFELIST, Page, PageRequest};
use crate::ports::{TaskFilters, TaskRepository, TeamRepository};
use crate::validation::{Validator, field_error};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;

const DUE_FIELD: &str = "due";
const TITLE_FIELD: &str = "title";
const DESCRIPTION_FIELD: &str = "description";
const PRIORITY_FIELD: &str = "priority";
const STATUS_FIELD: &str = "status";

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    team_id: TeamId,
    creator_id: UserId,
    assignee_id: UserId,
    due: DateTime<Utc>,
    title: String,
    description: String,
    priority: String,
}

impl CreateTaskRequest {
    /// Creates a request with the required participants and due time.
    ///
    /// Title, description and priority start empty and must be set.
    #[must_use]
    pub const fn new(
        team_id: TeamId,
        creator_id: UserId,
        assignee_id: UserId,
        due: DateTime<Utc>,
    ) -> Self {
        Self {
            team_id,
            creator_id,
            assignee_id,
            due,
            title: String::new(),
            description: String::new(),
            priority: String::new(),
        }
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the priority by name: `low`, `medium` or `high`.
    #[must_use]
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = priority.into();
        self
    }
}

/// Task service.
#[derive(Clone)]
pub struct TaskService<K, T, C>
where
    K: TaskRepository,
    T: TeamRepository,
    C: Clock + Send + Sync,
{
    tasks: Arc<K>,
    teams: Arc<T>,
    clock: Arc<C>,
    store_timeout: Option<Duration>,
}

impl<K, T, C> TaskService<K, T, C>
where
    K: TaskRepository,
    T: TeamRepository,
    C: Clock + Send + Sync,
{
    /// Creates a task service.
    #[must_use]
    pub const fn new(tasks: Arc<K>, teams: Arc<T>, clock: Arc<C>, config: &ServiceConfig) -> Self {
        Self {
            tasks,
            teams,
            clock,
            store_timeout: config.store_timeout,
        }
    }

    /// Creates an open task.
    ///
    /// The creator must be a leader or above. The assignee's membership is
    /// the caller's responsibility.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Validation`] when the due time is not in the
    /// future, the title or description is empty, or the priority is
    /// unknown; [`ServiceError::PermissionDenied`] when the creator's role is
    /// insufficient.
    #[tracing::instrument(
        name = "create_task",
        skip_all,
        fields(team_id = %request.team_id, creator = %request.creator_id),
        err
    )]
    pub async fn create_task(&self, request: CreateTaskRequest) -> ServiceResult<Task> {
        let mut validator = Validator::new();
        validator.check(
            request.due > self.clock.utc(),
            DUE_FIELD,
            "Must be after the time of creation.",
        );
        validator.check_non_empty(&request.title, TITLE_FIELD);
        validator.check_non_empty(&request.description, DESCRIPTION_FIELD);
        let parsed_priority = match TaskPriority::try_from(request.priority.as_str()) {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                validator.add_error(PRIORITY_FIELD, "Must be a valid task priority.");
                None
            }
        };
        let Some(priority) = parsed_priority.filter(|_| !validator.has_errors()) else {
            return Err(validator.into());
        };

        let creator_role = with_deadline(
            self.store_timeout,
            self.teams
                .find_member_role(request.team_id, request.creator_id),
        )
        .await?;
        if !creator_role.is_some_and(|role| role.satisfies(MemberRole::Leader)) {
            return Err(ServiceError::PermissionDenied);
        }

        let task = Task::new(
            NewTask {
                team_id: request.team_id,
                due: request.due,
                title: request.title,
                description: request.description,
                priority,
                creator_id: request.creator_id,
                assignee_id: request.assignee_id,
            },
            &*self.clock,
        );
        with_deadline(self.store_timeout, self.tasks.insert(&task)).await?;

        tracing::info!(task_id = %task.id(), "task created");
        Ok(task)
    }

    /// Returns a task of `team_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] when the team has no such task.
    #[tracing::instrument(name = "get_task_by_id", skip_all, fields(task_id = %task_id), err)]
    pub async fn get_task_by_id(&self, task_id: TaskId, team_id: TeamId) -> ServiceResult<Task> {
        with_deadline(self.store_timeout, self.tasks.find_by_id(task_id, team_id))
            .await?
            .ok_or(ServiceError::NotFound)
    }

    /// Lists the tasks of a team.
    ///
    /// `statuses` and `priorities` are names that must parse; tasks matching
    /// any of them are kept, and empty lists keep everything.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Validation`] on the `status` or `priority`
    /// field for the first unknown name, or for invalid pagination.
    #[tracing::instrument(name = "get_all_tasks", skip_all, fields(team_id = %team_id), err)]
    pub async fn get_all_tasks(
        &self,
        team_id: TeamId,
        filters: &TaskFilters,
        statuses: &[&str],
        priorities: &[&str],
        page: &PageRequest,
    ) -> ServiceResult<Page<Task>> {
        let mut validator = Validator::new();
        let mut narrowed = filters.clone();
        for status in statuses {
            let Ok(parsed) = TaskStatus::try_from(*status) else {
                validator.add_error(
                    STATUS_FIELD,
                    format!("Contains an invalid task status {status:?}."),
                );
                break;
            };
            narrowed.statuses.push(parsed);
        }
        for priority in priorities {
            let Ok(parsed) = TaskPriority::try_from(*priority) else {
                validator.add_error(
                    PRIORITY_FIELD,
                    format!("Contains an invalid task priority {priority:?}."),
                );
                break;
            };
            narrowed.priorities.push(parsed);
        }
        let validated = page.validate(&mut validator, DEFAULT_SORT_SAFELIST);
        let Some(pagination) = validated.filter(|_| !validator.has_errors()) else {
            return Err(validator.into());
        };

        with_deadline(
            self.store_timeout,
            self.tasks.list(team_id, &narrowed, &pagination),
        )
        .await
    }

    /// Moves an open task to in-progress on behalf of its assignee.
    ///
    /// Returns the updated task; `task` itself is not modified.
    ///
    /// # Errors
    ///
    /// Returns, in order of precedence, [`ServiceError::PermissionDenied`]
    /// unless `updater` is the assignee, [`ServiceError::TaskOverdue`] once
    /// the due time has passed, [`ServiceError::TaskStatusConflict`] unless
    /// the task is open, and [`ServiceError::EditConflict`] when the stored
    /// task changed since it was read.
    #[tracing::instrument(
        name = "start_task",
        skip_all,
        fields(task_id = %task.id(), updater = %updater),
        err
    )]
    pub async fn start_task(&self, task: &Task, updater: UserId) -> ServiceResult<Task> {
        self.transition(task, TaskTransition::Start, updater).await
    }

    /// Moves an in-progress task to completed on behalf of its creator.
    ///
    /// Returns the updated task; `task` itself is not modified.
    ///
    /// # Errors
    ///
    /// Returns, in order of precedence, [`ServiceError::PermissionDenied`]
    /// unless `updater` is the creator, [`ServiceError::TaskOverdue`] once
    /// the due time has passed, [`ServiceError::TaskStatusConflict`] unless
    /// the task is in progress, and [`ServiceError::EditConflict`] when the
    /// stored task changed since it was read.
    #[tracing::instrument(
        name = "complete_task",
        skip_all,
        fields(task_id = %task.id(), updater = %updater),
        err
    )]
    pub async fn complete_task(&self, task: &Task, updater: UserId) -> ServiceResult<Task> {
        self.transition(task, TaskTransition::Complete, updater)
            .await
    }

    /// Cancels an open or in-progress task on behalf of its creator.
    ///
    /// Overdue tasks may still be cancelled. Returns the updated task; `task`
    /// itself is not modified.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::PermissionDenied`] unless `updater` is the
    /// creator, [`ServiceError::TaskStatusConflict`] for terminal tasks, and
    /// [`ServiceError::EditConflict`] when the stored task changed since it
    /// was read.
    #[tracing::instrument(
        name = "cancel_task",
        skip_all,
        fields(task_id = %task.id(), updater = %updater),
        err
    )]
    pub async fn cancel_task(&self, task: &Task, updater: UserId) -> ServiceResult<Task> {
        self.transition(task, TaskTransition::Cancel, updater).await
    }

    /// Moves a task to `new_status` through the matching transition.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Validation`] on the `status` field when
    /// `new_status` is open, and otherwise the errors of
    /// [`Self::start_task`], [`Self::complete_task`] or
    /// [`Self::cancel_task`].
    pub async fn update_task_status(
        &self,
        task: &Task,
        new_status: TaskStatus,
        updater: UserId,
    ) -> ServiceResult<Task> {
        let Some(transition) = TaskTransition::leading_to(new_status) else {
            return Err(field_error(STATUS_FIELD, "A task cannot be moved back to open.").into());
        };
        match transition {
            TaskTransition::Start => self.start_task(task, updater).await,
            TaskTransition::Complete => self.complete_task(task, updater).await,
            TaskTransition::Cancel => self.cancel_task(task, updater).await,
        }
    }

    async fn transition(
        &self,
        task: &Task,
        transition: TaskTransition,
        updater: UserId,
    ) -> ServiceResult<Task> {
        let moved = task.apply(transition, updater, self.clock.utc())?;
        let version = with_deadline(self.store_timeout, self.tasks.update(&moved))
            .await
            .inspect_err(|err| {
                if matches!(err, ServiceError::EditConflict) {
                    tracing::warn!("task changed concurrently");
                }
            })?;

        tracing::info!(status = %moved.status(), "task status changed");
        Ok(moved.with_version(version))
    }
}
