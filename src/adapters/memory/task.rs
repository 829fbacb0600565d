//! In-memory task repository.

use super::InMemoryStore;
use super::store::contains_ignore_case;
use crate::domain::{Task, TaskId, TeamId, Version};
use crate::pagination::{Page, Pagination};
use crate::ports::{TaskFilters, TaskRepository, TaskRepositoryError, TaskRepositoryResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

fn within(
    value: DateTime<Utc>,
    after: Option<DateTime<Utc>>,
    before: Option<DateTime<Utc>>,
) -> bool {
    after.is_none_or(|bound| value >= bound) && before.is_none_or(|bound| value <= bound)
}

#[async_trait]
impl TaskRepository for InMemoryStore {
    async fn insert(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write_state(TaskRepositoryError::persistence)?;
        if state.tasks.iter().any(|t| t.id() == task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        state
            .tasks
            .push(task.clone().with_version(Version::INITIAL));
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId, team: TeamId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.read_state(TaskRepositoryError::persistence)?;
        Ok(state
            .tasks
            .iter()
            .find(|t| t.id() == id && t.team_id() == team)
            .cloned())
    }

    async fn list(
        &self,
        team: TeamId,
        filters: &TaskFilters,
        pagination: &Pagination,
    ) -> TaskRepositoryResult<Page<Task>> {
        let state = self.read_state(TaskRepositoryError::persistence)?;
        let tasks: Vec<Task> = state
            .tasks
            .iter()
            .filter(|t| t.team_id() == team)
            .filter(|t| {
                within(
                    t.created_at(),
                    filters.created_after,
                    filters.created_before,
                )
            })
            .filter(|t| within(t.due(), filters.due_after, filters.due_before))
            .filter(|t| filters.statuses.is_empty() || filters.statuses.contains(&t.status()))
            .filter(|t| {
                filters.priorities.is_empty() || filters.priorities.contains(&t.priority())
            })
            .filter(|t| {
                contains_ignore_case(state.username_of(t.creator_id()), &filters.creator_username)
            })
            .filter(|t| {
                contains_ignore_case(
                    state.username_of(t.assignee_id()),
                    &filters.assignee_username,
                )
            })
            .cloned()
            .collect();
        Ok(pagination.paginate(tasks))
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<Version> {
        let mut state = self.write_state(TaskRepositoryError::persistence)?;
        let slot = state
            .tasks
            .iter_mut()
            .find(|t| t.id() == task.id() && t.version() == task.version())
            .ok_or(TaskRepositoryError::EditConflict(task.id()))?;

        let next = task.version().next();
        *slot = task.clone().with_version(next);
        Ok(next)
    }
}
