//! Task flows and listings across a team.

use super::helpers::{World, epoch, world};
use chrono::TimeDelta;
use eyre::ensure;
use rstest::rstest;
use tasktracker::domain::{Task, TaskStatus, Team, User};
use tasktracker::error::ServiceError;
use tasktracker::pagination::PageRequest;
use tasktracker::ports::TaskFilters;
use tasktracker::services::CreateTaskRequest;

struct Board {
    team: Team,
    lead: User,
    dev: User,
}

async fn board(world: &World) -> eyre::Result<Board> {
    let lead = world.user("lena").await?;
    let dev = world.user("devi").await?;
    let team = world
        .team("platform", true, lead.id(), &[(dev.id(), "regular")])
        .await?;
    Ok(Board { team, lead, dev })
}

async fn task_due_in(
    world: &World,
    board: &Board,
    title: &str,
    days: i64,
    priority: &str,
) -> eyre::Result<Task> {
    let request = CreateTaskRequest::new(
        board.team.id(),
        board.lead.id(),
        board.dev.id(),
        epoch() + TimeDelta::days(days),
    )
    .with_title(title)
    .with_description("See the runbook")
    .with_priority(priority);
    Ok(world.services.tasks.create_task(request).await?)
}

fn titles(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(Task::title).collect()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn work_moves_from_open_to_completed(world: World) -> eyre::Result<()> {
    let setup = board(&world).await?;
    let task = task_due_in(&world, &setup, "Upgrade database", 5, "high").await?;

    let started = world
        .services
        .tasks
        .update_task_status(&task, TaskStatus::InProgress, setup.dev.id())
        .await?;
    let completed = world
        .services
        .tasks
        .update_task_status(&started, TaskStatus::Completed, setup.lead.id())
        .await?;

    let stored = world
        .services
        .tasks
        .get_task_by_id(task.id(), setup.team.id())
        .await?;
    ensure!(stored == completed);
    ensure!(stored.status() == TaskStatus::Completed);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn past_due_work_is_cancelled_not_completed(world: World) -> eyre::Result<()> {
    let setup = board(&world).await?;
    let task = task_due_in(&world, &setup, "Renew domain", 1, "medium").await?;
    let started = world
        .services
        .tasks
        .start_task(&task, setup.dev.id())
        .await?;

    world
        .clock
        .advance(TimeDelta::days(1) + TimeDelta::seconds(1));

    let complete = world
        .services
        .tasks
        .complete_task(&started, setup.lead.id())
        .await;
    ensure!(
        matches!(complete, Err(ServiceError::TaskOverdue)),
        "got {complete:?}"
    );
    let cancelled = world
        .services
        .tasks
        .cancel_task(&started, setup.lead.id())
        .await?;
    ensure!(cancelled.status() == TaskStatus::Cancelled);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn due_bounds_are_inclusive(world: World) -> eyre::Result<()> {
    let setup = board(&world).await?;
    task_due_in(&world, &setup, "Tomorrow", 1, "low").await?;
    task_due_in(&world, &setup, "Day three", 3, "medium").await?;
    task_due_in(&world, &setup, "Next week", 7, "high").await?;

    let filters = TaskFilters {
        due_after: Some(epoch() + TimeDelta::days(1)),
        due_before: Some(epoch() + TimeDelta::days(3)),
        ..TaskFilters::default()
    };
    let page = world
        .services
        .tasks
        .get_all_tasks(setup.team.id(), &filters, &[], &[], &PageRequest::first(10))
        .await?;
    ensure!(
        titles(&page.items) == ["Tomorrow", "Day three"],
        "got {:?}",
        titles(&page.items)
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn listings_combine_status_and_priority(world: World) -> eyre::Result<()> {
    let setup = board(&world).await?;
    let urgent = task_due_in(&world, &setup, "Hotfix", 2, "high").await?;
    task_due_in(&world, &setup, "Refactor", 2, "high").await?;
    task_due_in(&world, &setup, "Docs", 2, "low").await?;
    world
        .services
        .tasks
        .start_task(&urgent, setup.dev.id())
        .await?;

    let page = world
        .services
        .tasks
        .get_all_tasks(
            setup.team.id(),
            &TaskFilters::default(),
            &["open"],
            &["HIGH", "medium"],
            &PageRequest::first(10),
        )
        .await?;
    ensure!(
        titles(&page.items) == ["Refactor"],
        "got {:?}",
        titles(&page.items)
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn task_pages_report_metadata(world: World) -> eyre::Result<()> {
    let setup = board(&world).await?;
    for title in ["One", "Two", "Three", "Four", "Five"] {
        task_due_in(&world, &setup, title, 2, "medium").await?;
    }

    let page = world
        .services
        .tasks
        .get_all_tasks(
            setup.team.id(),
            &TaskFilters::default(),
            &[],
            &[],
            &PageRequest::new(3, 2, ""),
        )
        .await?;
    ensure!(
        titles(&page.items) == ["Five"],
        "got {:?}",
        titles(&page.items)
    );
    ensure!(page.metadata.current_page == 3);
    ensure!(page.metadata.last_page == 3);
    ensure!(page.metadata.total_records == 5);

    let sorted = world
        .services
        .tasks
        .get_all_tasks(
            setup.team.id(),
            &TaskFilters::default(),
            &[],
            &[],
            &PageRequest::first(10).with_sort("due"),
        )
        .await;
    ensure!(
        matches!(sorted, Err(ServiceError::Validation(_))),
        "got {sorted:?}"
    );
    Ok(())
}
