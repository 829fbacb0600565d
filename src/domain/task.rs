//! Team tasks and their lifecycle.

use super::{
    ParseTaskPriorityError, ParseTaskStatusError, TaskId, TaskTransitionError, TeamId, UserId,
    Version,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Created, work not started.
    Open,
    /// Being worked on by the assignee.
    InProgress,
    /// Finished.
    Completed,
    /// Abandoned.
    Cancelled,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns `true` for statuses that admit no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Returns `true` when moving from `self` to `target` is allowed.
    ///
    /// The graph is `open -> in-progress -> completed`, with cancellation
    /// allowed from either non-terminal status.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Open, Self::InProgress | Self::Cancelled)
                | (Self::InProgress, Self::Completed | Self::Cancelled)
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.to_ascii_lowercase();
        match normalized.as_str() {
            "open" => Ok(Self::Open),
            "in-progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// Task priority, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    /// Low priority.
    Low,
    /// Medium priority.
    Medium,
    /// High priority.
    High,
}

impl TaskPriority {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskPriority {
    type Error = ParseTaskPriorityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.to_ascii_lowercase();
        match normalized.as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParseTaskPriorityError(value.to_owned())),
        }
    }
}

/// A lifecycle action that moves a task out of its current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskTransition {
    /// Assignee begins work: `open -> in-progress`.
    Start,
    /// Creator signs off: `in-progress -> completed`.
    Complete,
    /// Creator abandons: `open | in-progress -> cancelled`.
    Cancel,
}

impl TaskTransition {
    /// Returns the status the transition moves a task into.
    #[must_use]
    pub const fn target(self) -> TaskStatus {
        match self {
            Self::Start => TaskStatus::InProgress,
            Self::Complete => TaskStatus::Completed,
            Self::Cancel => TaskStatus::Cancelled,
        }
    }

    /// Returns the transition leading into `status`, or `None` for
    /// [`TaskStatus::Open`], which no transition targets.
    #[must_use]
    pub const fn leading_to(status: TaskStatus) -> Option<Self> {
        match status {
            TaskStatus::Open => None,
            TaskStatus::InProgress => Some(Self::Start),
            TaskStatus::Completed => Some(Self::Complete),
            TaskStatus::Cancelled => Some(Self::Cancel),
        }
    }

    const fn is_blocked_when_overdue(self) -> bool {
        matches!(self, Self::Start | Self::Complete)
    }
}

/// Input for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Owning team.
    pub team_id: TeamId,
    /// Due instant.
    pub due: DateTime<Utc>,
    /// Short title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Priority.
    pub priority: TaskPriority,
    /// Creating user.
    pub creator_id: UserId,
    /// Assigned user.
    pub assignee_id: UserId,
}

/// A unit of work owned by a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    id: TaskId,
    team_id: TeamId,
    created_at: DateTime<Utc>,
    due: DateTime<Utc>,
    title: String,
    description: String,
    status: TaskStatus,
    priority: TaskPriority,
    creator_id: UserId,
    assignee_id: UserId,
    #[serde(skip)]
    version: Version,
}

/// Parameter object for reconstructing a persisted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Task identifier.
    pub id: TaskId,
    /// Owning team.
    pub team_id: TeamId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Due instant.
    pub due: DateTime<Utc>,
    /// Short title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Lifecycle status.
    pub status: TaskStatus,
    /// Priority.
    pub priority: TaskPriority,
    /// Creating user.
    pub creator_id: UserId,
    /// Assigned user.
    pub assignee_id: UserId,
    /// Stored version.
    pub version: Version,
}

impl Task {
    /// Creates an open task stamped with the current clock time.
    #[must_use]
    pub fn new(input: NewTask, clock: &impl Clock) -> Self {
        Self {
            id: TaskId::new(),
            team_id: input.team_id,
            created_at: clock.utc(),
            due: input.due,
            title: input.title,
            description: input.description,
            status: TaskStatus::Open,
            priority: input.priority,
            creator_id: input.creator_id,
            assignee_id: input.assignee_id,
            version: Version::INITIAL,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            team_id: data.team_id,
            created_at: data.created_at,
            due: data.due,
            title: data.title,
            description: data.description,
            status: data.status,
            priority: data.priority,
            creator_id: data.creator_id,
            assignee_id: data.assignee_id,
            version: data.version,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning team.
    #[must_use]
    pub const fn team_id(&self) -> TeamId {
        self.team_id
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the due instant.
    #[must_use]
    pub const fn due(&self) -> DateTime<Utc> {
        self.due
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns the creating user.
    #[must_use]
    pub const fn creator_id(&self) -> UserId {
        self.creator_id
    }

    /// Returns the assigned user.
    #[must_use]
    pub const fn assignee_id(&self) -> UserId {
        self.assignee_id
    }

    /// Returns the version this copy was read at.
    #[must_use]
    pub const fn version(&self) -> Version {
        self.version
    }

    /// Returns `true` once `now` is strictly past the due instant.
    #[must_use]
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        self.due < now
    }

    /// Applies `transition` on behalf of `actor`, returning the moved copy.
    ///
    /// Starting is reserved for the assignee; completing and cancelling for
    /// the creator. Checks run in a fixed order: actor, then overdue (start
    /// and complete only), then the status graph. The receiver is left
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns [`TaskTransitionError::NotPermitted`],
    /// [`TaskTransitionError::Overdue`] or
    /// [`TaskTransitionError::StatusConflict`] for the first failed check.
    pub fn apply(
        &self,
        transition: TaskTransition,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<Self, TaskTransitionError> {
        let target = transition.target();
        let permitted_actor = match transition {
            TaskTransition::Start => self.assignee_id,
            TaskTransition::Complete | TaskTransition::Cancel => self.creator_id,
        };
        if actor != permitted_actor {
            return Err(TaskTransitionError::NotPermitted {
                task_id: self.id,
                to: target,
            });
        }
        if transition.is_blocked_when_overdue() && self.is_overdue_at(now) {
            return Err(TaskTransitionError::Overdue(self.id));
        }
        if !self.status.can_transition_to(target) {
            return Err(TaskTransitionError::StatusConflict {
                task_id: self.id,
                from: self.status,
                to: target,
            });
        }

        let mut moved = self.clone();
        moved.status = target;
        Ok(moved)
    }

    pub(crate) const fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }
}
