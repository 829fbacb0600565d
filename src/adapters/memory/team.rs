//! In-memory team, membership and invitation repository.

use super::InMemoryStore;
use super::store::contains_ignore_case;
use crate::domain::{
    Invitation, InvitationId, MemberRole, Membership, Team, TeamId, UserId, Version,
};
use crate::pagination::{Page, Pagination};
use crate::ports::{
    InvitationFilters, InvitationParty, MembershipFilters, TeamFilters, TeamRepository,
    TeamRepositoryError, TeamRepositoryResult,
};
use async_trait::async_trait;
use std::cmp::Ordering;

fn compare_teams(left: &Team, right: &Team, pagination: &Pagination) -> Ordering {
    let sort = pagination.sort();
    let primary = match sort.column() {
        "name" => left.name().cmp(right.name()),
        _ => Ordering::Equal,
    };
    let directed = if sort.is_descending() {
        primary.reverse()
    } else {
        primary
    };
    directed.then_with(|| left.name().cmp(right.name()))
}

#[async_trait]
impl TeamRepository for InMemoryStore {
    async fn insert_with_owner(&self, team: &Team, owner: UserId) -> TeamRepositoryResult<()> {
        let mut state = self.write_state(TeamRepositoryError::persistence)?;
        if state.teams.values().any(|t| t.name() == team.name()) {
            return Err(TeamRepositoryError::DuplicateTeamName(team.name().to_owned()));
        }
        state
            .teams
            .insert(team.id(), team.clone().with_version(Version::INITIAL));
        state.memberships.insert(
            (team.id(), owner),
            Membership::new(team.id(), owner, MemberRole::Owner),
        );
        Ok(())
    }

    async fn find_by_id(&self, id: TeamId) -> TeamRepositoryResult<Option<Team>> {
        let state = self.read_state(TeamRepositoryError::persistence)?;
        Ok(state.teams.get(&id).cloned())
    }

    async fn find_visible_by_name(
        &self,
        name: &str,
        viewer: UserId,
    ) -> TeamRepositoryResult<Option<Team>> {
        let state = self.read_state(TeamRepositoryError::persistence)?;
        Ok(state
            .teams
            .values()
            .find(|t| t.name() == name && (t.is_public() || state.is_member(t.id(), viewer)))
            .cloned())
    }

    async fn list_visible(
        &self,
        filters: &TeamFilters,
        viewer: UserId,
        pagination: &Pagination,
    ) -> TeamRepositoryResult<Page<Team>> {
        let state = self.read_state(TeamRepositoryError::persistence)?;
        let mut teams: Vec<Team> = state
            .teams
            .values()
            .filter(|t| t.is_public() || state.is_member(t.id(), viewer))
            .filter(|t| contains_ignore_case(t.name(), &filters.name))
            .filter(|t| filters.is_public.is_none_or(|wanted| t.is_public() == wanted))
            .cloned()
            .collect();
        teams.sort_by(|left, right| compare_teams(left, right, pagination));
        Ok(pagination.paginate(teams))
    }

    async fn update(&self, team: &Team) -> TeamRepositoryResult<Version> {
        let mut state = self.write_state(TeamRepositoryError::persistence)?;
        let stored_version = state.teams.get(&team.id()).map(Team::version);
        if stored_version != Some(team.version()) {
            return Err(TeamRepositoryError::EditConflict(team.id()));
        }
        if state
            .teams
            .values()
            .any(|t| t.id() != team.id() && t.name() == team.name())
        {
            return Err(TeamRepositoryError::DuplicateTeamName(team.name().to_owned()));
        }

        let next = team.version().next();
        state
            .teams
            .insert(team.id(), team.clone().with_version(next));
        Ok(next)
    }

    async fn delete(&self, id: TeamId) -> TeamRepositoryResult<()> {
        let mut state = self.write_state(TeamRepositoryError::persistence)?;
        if state.teams.remove(&id).is_none() {
            return Err(TeamRepositoryError::TeamNotFound(id));
        }
        state.memberships.retain(|(team, _), _| *team != id);
        state.invitations.retain(|i| i.team_id() != id);
        state.tasks.retain(|t| t.team_id() != id);
        Ok(())
    }

    async fn find_member_role(
        &self,
        team: TeamId,
        user: UserId,
    ) -> TeamRepositoryResult<Option<MemberRole>> {
        let state = self.read_state(TeamRepositoryError::persistence)?;
        Ok(state.memberships.get(&(team, user)).map(Membership::role))
    }

    async fn find_membership(
        &self,
        team: TeamId,
        user: UserId,
    ) -> TeamRepositoryResult<Option<Membership>> {
        let state = self.read_state(TeamRepositoryError::persistence)?;
        Ok(state.memberships.get(&(team, user)).cloned())
    }

    async fn list_members(
        &self,
        team: TeamId,
        filters: &MembershipFilters,
        pagination: &Pagination,
    ) -> TeamRepositoryResult<Page<Membership>> {
        let state = self.read_state(TeamRepositoryError::persistence)?;
        let mut members: Vec<Membership> = state
            .memberships
            .values()
            .filter(|m| m.team_id() == team)
            .filter(|m| contains_ignore_case(state.username_of(m.user_id()), &filters.username))
            .filter(|m| filters.roles.is_empty() || filters.roles.contains(&m.role()))
            .cloned()
            .collect();
        members.sort_by(|left, right| {
            state
                .username_of(left.user_id())
                .cmp(state.username_of(right.user_id()))
                .then_with(|| left.user_id().cmp(&right.user_id()))
        });
        Ok(pagination.paginate(members))
    }

    async fn update_membership(&self, membership: &Membership) -> TeamRepositoryResult<Version> {
        let mut state = self.write_state(TeamRepositoryError::persistence)?;
        let key = (membership.team_id(), membership.user_id());
        let stored_version = state.memberships.get(&key).map(Membership::version);
        if stored_version != Some(membership.version()) {
            return Err(TeamRepositoryError::EditConflict(membership.team_id()));
        }

        let next = membership.version().next();
        state
            .memberships
            .insert(key, membership.clone().with_version(next));
        Ok(next)
    }

    async fn delete_membership(&self, team: TeamId, user: UserId) -> TeamRepositoryResult<()> {
        let mut state = self.write_state(TeamRepositoryError::persistence)?;
        state
            .memberships
            .remove(&(team, user))
            .map(|_| ())
            .ok_or(TeamRepositoryError::MembershipNotFound { team, user })
    }

    async fn insert_invitation(&self, invitation: &Invitation) -> TeamRepositoryResult<()> {
        let mut state = self.write_state(TeamRepositoryError::persistence)?;
        let pending = state.invitations.iter().any(|i| {
            i.team_id() == invitation.team_id() && i.invitee_id() == invitation.invitee_id()
        });
        if pending {
            return Err(TeamRepositoryError::DuplicateInvitation {
                team: invitation.team_id(),
                invitee: invitation.invitee_id(),
            });
        }
        state.invitations.push(invitation.clone());
        Ok(())
    }

    async fn list_invitations(
        &self,
        filters: &InvitationFilters,
        user: UserId,
        pagination: &Pagination,
    ) -> TeamRepositoryResult<Page<Invitation>> {
        let state = self.read_state(TeamRepositoryError::persistence)?;
        let invitations: Vec<Invitation> = state
            .invitations
            .iter()
            .filter(|i| match filters.is_inviter {
                Some(true) => i.inviter_id() == user,
                Some(false) => i.invitee_id() == user,
                None => i.inviter_id() == user || i.invitee_id() == user,
            })
            .filter(|i| {
                let team_name = state.teams.get(&i.team_id()).map_or("", Team::name);
                contains_ignore_case(team_name, &filters.team_name)
            })
            .cloned()
            .collect();
        Ok(pagination.paginate(invitations))
    }

    async fn accept_invitation(
        &self,
        id: InvitationId,
        invitee: UserId,
    ) -> TeamRepositoryResult<Membership> {
        let mut state = self.write_state(TeamRepositoryError::persistence)?;
        let position = state
            .invitations
            .iter()
            .position(|i| i.id() == id && i.invitee_id() == invitee)
            .ok_or(TeamRepositoryError::InvitationNotFound(id))?;
        let team = state
            .invitations
            .get(position)
            .map(Invitation::team_id)
            .ok_or(TeamRepositoryError::InvitationNotFound(id))?;
        if state.is_member(team, invitee) {
            return Err(TeamRepositoryError::DuplicateMembership {
                team,
                user: invitee,
            });
        }

        state.invitations.remove(position);
        let membership = Membership::new(team, invitee, MemberRole::Regular);
        state
            .memberships
            .insert((team, invitee), membership.clone());
        Ok(membership)
    }

    async fn delete_invitation(
        &self,
        id: InvitationId,
        party: InvitationParty,
    ) -> TeamRepositoryResult<()> {
        let mut state = self.write_state(TeamRepositoryError::persistence)?;
        let position = state
            .invitations
            .iter()
            .position(|i| i.id() == id && party.is_party_to(i))
            .ok_or(TeamRepositoryError::InvitationNotFound(id))?;
        state.invitations.remove(position);
        Ok(())
    }
}
