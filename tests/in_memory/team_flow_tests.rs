//! Team membership flows across several users.

use super::helpers::{World, epoch, world};
use chrono::TimeDelta;
use eyre::ensure;
use rstest::rstest;
use tasktracker::domain::MemberRole;
use tasktracker::error::ServiceError;
use tasktracker::pagination::PageRequest;
use tasktracker::ports::{InvitationFilters, MembershipFilters, TeamFilters};
use tasktracker::services::CreateTaskRequest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn promoted_admins_can_invite(world: World) -> eyre::Result<()> {
    let owner = world.user("olivia").await?;
    let admin = world.user("adam").await?;
    let guest = world.user("gus").await?;
    let team = world
        .team("platform", false, owner.id(), &[(admin.id(), "admin")])
        .await?;

    let invitation = world
        .services
        .teams
        .invite_user(team.id(), admin.id(), guest.id())
        .await?;
    ensure!(invitation.inviter_id() == admin.id());

    let sent = world
        .services
        .teams
        .get_all_invitations(
            &InvitationFilters {
                is_inviter: Some(true),
                ..InvitationFilters::default()
            },
            &PageRequest::first(10),
            admin.id(),
        )
        .await?;
    ensure!(sent.items == [invitation.clone()]);

    let membership = world
        .services
        .teams
        .accept_invitation(invitation.id(), guest.id())
        .await?;
    ensure!(membership.role() == MemberRole::Regular);

    let visible = world
        .services
        .teams
        .get_team_by_name("platform", guest.id())
        .await?;
    ensure!(visible.id() == team.id(), "members see private teams");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn existing_members_cannot_accept_again(world: World) -> eyre::Result<()> {
    let owner = world.user("olivia").await?;
    let member = world.user("mia").await?;
    let team = world
        .team("platform", true, owner.id(), &[(member.id(), "regular")])
        .await?;

    let invitation = world
        .services
        .teams
        .invite_user(team.id(), owner.id(), member.id())
        .await?;
    let result = world
        .services
        .teams
        .accept_invitation(invitation.id(), member.id())
        .await;
    ensure!(
        matches!(result, Err(ServiceError::AlreadyMember)),
        "got {result:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn leaving_revokes_access_to_private_teams(world: World) -> eyre::Result<()> {
    let owner = world.user("olivia").await?;
    let member = world.user("mia").await?;
    let team = world
        .team("hidden", false, owner.id(), &[(member.id(), "leader")])
        .await?;

    world
        .services
        .teams
        .remove_member_from_team(team.id(), member.id(), member.id())
        .await?;

    let role = world
        .services
        .teams
        .get_member_role(team.id(), member.id())
        .await?;
    ensure!(role.is_none(), "got {role:?}");
    let result = world
        .services
        .teams
        .get_team_by_name("hidden", member.id())
        .await;
    ensure!(
        matches!(result, Err(ServiceError::NotFound)),
        "got {result:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_team_removes_its_tasks(world: World) -> eyre::Result<()> {
    let owner = world.user("olivia").await?;
    let member = world.user("mia").await?;
    let team = world
        .team("platform", true, owner.id(), &[(member.id(), "regular")])
        .await?;
    let task = world
        .services
        .tasks
        .create_task(
            CreateTaskRequest::new(
                team.id(),
                owner.id(),
                member.id(),
                epoch() + TimeDelta::days(1),
            )
            .with_title("Archive logs")
            .with_description("Move last quarter to cold storage")
            .with_priority("low"),
        )
        .await?;

    world
        .services
        .teams
        .delete_team(team.id(), owner.id())
        .await?;

    let result = world
        .services
        .tasks
        .get_task_by_id(task.id(), team.id())
        .await;
    ensure!(
        matches!(result, Err(ServiceError::NotFound)),
        "got {result:?}"
    );
    ensure!(!world.services.teams.is_member(team.id(), member.id()).await?);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn team_listing_sorts_and_filters(world: World) -> eyre::Result<()> {
    let owner = world.user("olivia").await?;
    let outsider = world.user("oscar").await?;
    for (name, is_public) in [
        ("alpha-squad", true),
        ("bravo-squad", true),
        ("charlie-squad", false),
        ("delta-force", true),
    ] {
        world.team(name, is_public, owner.id(), &[]).await?;
    }

    let filters = TeamFilters {
        name: "SQUAD".to_owned(),
        is_public: None,
    };
    let descending = PageRequest::new(1, 2, "name_desc");
    let first_page = world
        .services
        .teams
        .get_all_teams(&filters, &descending, owner.id())
        .await?;
    let names: Vec<&str> = first_page.items.iter().map(|team| team.name()).collect();
    ensure!(names == ["charlie-squad", "bravo-squad"], "got {names:?}");
    ensure!(first_page.metadata.total_records == 3);
    ensure!(first_page.metadata.last_page == 2);

    let as_outsider = world
        .services
        .teams
        .get_all_teams(&filters, &PageRequest::first(10), outsider.id())
        .await?;
    let names: Vec<&str> = as_outsider.items.iter().map(|team| team.name()).collect();
    ensure!(names == ["alpha-squad", "bravo-squad"], "got {names:?}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn member_listing_filters_by_username(world: World) -> eyre::Result<()> {
    let owner = world.user("olivia").await?;
    let first = world.user("sam-lee").await?;
    let second = world.user("samira").await?;
    let third = world.user("tom").await?;
    let team = world
        .team(
            "platform",
            true,
            owner.id(),
            &[
                (first.id(), "regular"),
                (second.id(), "leader"),
                (third.id(), "regular"),
            ],
        )
        .await?;

    let filters = MembershipFilters {
        username: "Sam".to_owned(),
        ..MembershipFilters::default()
    };
    let members = world
        .services
        .teams
        .get_all_team_members(team.id(), &filters, &[], &PageRequest::first(10))
        .await?;
    let users: Vec<_> = members.items.iter().map(|m| m.user_id()).collect();
    ensure!(users == [first.id(), second.id()], "got {users:?}");
    Ok(())
}
