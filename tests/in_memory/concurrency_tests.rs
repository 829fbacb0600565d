//! Parallel writers racing on the same stored version.

use super::helpers::{World, epoch, world};
use chrono::TimeDelta;
use eyre::ensure;
use rstest::rstest;
use tasktracker::error::{ServiceError, ServiceResult};
use tasktracker::services::CreateTaskRequest;

fn one_winner<A, B>(left: &ServiceResult<A>, right: &ServiceResult<B>) -> eyre::Result<()> {
    let successes = usize::from(left.is_ok()) + usize::from(right.is_ok());
    let conflicts = [left.as_ref().err(), right.as_ref().err()]
        .into_iter()
        .flatten()
        .filter(|err| matches!(err, ServiceError::EditConflict))
        .count();
    ensure!(
        successes == 1,
        "expected exactly one success, got {successes}"
    );
    ensure!(
        conflicts == 1,
        "expected exactly one edit conflict, got {conflicts}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_task_transitions_have_one_winner(world: World) -> eyre::Result<()> {
    let owner = world.user("olivia").await?;
    let assignee = world.user("arun").await?;
    let team = world
        .team("platform", true, owner.id(), &[(assignee.id(), "regular")])
        .await?;
    let task = world
        .services
        .tasks
        .create_task(
            CreateTaskRequest::new(
                team.id(),
                owner.id(),
                assignee.id(),
                epoch() + TimeDelta::days(1),
            )
            .with_title("Rotate keys")
            .with_description("Quarterly rotation")
            .with_priority("high"),
        )
        .await?;

    let tasks = &world.services.tasks;
    let (started, cancelled) = tokio::join!(
        tasks.start_task(&task, assignee.id()),
        tasks.cancel_task(&task, owner.id()),
    );

    one_winner(&started, &cancelled)?;
    let winner = started.or(cancelled)?;
    let stored = tasks.get_task_by_id(task.id(), team.id()).await?;
    ensure!(stored == winner, "got {stored:?}");
    ensure!(stored.version() == task.version().next());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_team_renames_have_one_winner(world: World) -> eyre::Result<()> {
    let owner = world.user("olivia").await?;
    let team = world.team("platform", true, owner.id(), &[]).await?;

    let teams = &world.services.teams;
    let (first, second) = tokio::join!(
        teams.update_team(&team, Some("infra"), None, owner.id()),
        teams.update_team(&team, Some("ops"), None, owner.id()),
    );

    one_winner(&first, &second)?;
    let winner = first.or(second)?;
    let stored = teams.get_team_by_name(winner.name(), owner.id()).await?;
    ensure!(stored == winner, "got {stored:?}");
    let replaced = teams.get_team_by_name("platform", owner.id()).await;
    ensure!(
        matches!(replaced, Err(ServiceError::NotFound)),
        "got {replaced:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_account_updates_have_one_winner(world: World) -> eyre::Result<()> {
    let user = world.user("bob").await?;

    let users = &world.services.users;
    let (verified, reset) = tokio::join!(
        users.verify_user(&user),
        users.reset_user_password(&user, "rotated-password"),
    );

    one_winner(&verified, &reset)?;
    let winner = verified.or(reset)?;
    let stored = users.get_user_by_email(user.email()).await?;
    ensure!(stored == winner, "got {stored:?}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_registrations_keep_emails_unique(world: World) -> eyre::Result<()> {
    let users = &world.services.users;
    let (first, second) = tokio::join!(
        users.register_user("dana", "shared@tasks.test", "first-password"),
        users.register_user("dina", "shared@tasks.test", "second-password"),
    );

    ensure!(
        first.is_ok() != second.is_ok(),
        "exactly one registration must win"
    );
    let loser = first.err().or_else(|| second.err());
    let rejected_email = loser
        .as_ref()
        .and_then(ServiceError::validation)
        .and_then(|validator| validator.error("email"));
    ensure!(
        rejected_email == Some("A user with this email address already exists."),
        "got {loser:?}"
    );
    Ok(())
}
