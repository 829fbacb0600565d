//! Teams, memberships and invitations.

use crate::config::ServiceConfig;
use crate::deadline::with_deadline;
use crate::domain::{Invitation, InvitationId, MemberRole, Membership, Team, TeamId, UserId};
use crate::error::{ServiceError, ServiceResult, TEAM_NAME_FIELD};
use crate::pagination::{DEFAULT_SORT_SAFELIST, Page, PageRequest};
use crate::ports::{
    InvitationFilters, InvitationParty, MembershipFilters, TEAM_SORT_SAFELIST, TeamFilters,
    TeamRepository,
};
use crate::validation::{Validator, field_error, validate_handle};
use std::sync::Arc;
use std::time::Duration;

const NEW_ROLE_FIELD: &str = "new_role";
const ROLES_FIELD: &str = "roles";

/// Team, membership and invitation service.
#[derive(Clone)]
pub struct TeamService<R>
where
    R: TeamRepository,
{
    repository: Arc<R>,
    store_timeout: Option<Duration>,
}

impl<R> TeamService<R>
where
    R: TeamRepository,
{
    /// Creates a team service.
    #[must_use]
    pub const fn new(repository: Arc<R>, config: &ServiceConfig) -> Self {
        Self {
            repository,
            store_timeout: config.store_timeout,
        }
    }

    /// Creates a team owned by `creator`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Validation`] on the `name` field for a
    /// malformed or taken name.
    #[tracing::instrument(name = "create_team", skip_all, fields(creator = %creator), err)]
    pub async fn create_team(
        &self,
        name: &str,
        is_public: bool,
        creator: UserId,
    ) -> ServiceResult<Team> {
        let mut validator = Validator::new();
        validate_handle(&mut validator, name, TEAM_NAME_FIELD);
        validator.finish()?;

        let team = Team::new(name, is_public);
        with_deadline(
            self.store_timeout,
            self.repository.insert_with_owner(&team, creator),
        )
        .await?;

        tracing::info!(team_id = %team.id(), "team created");
        Ok(team)
    }

    /// Returns the team named `name` if it is public or `retriever` belongs
    /// to it.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] when no such team is visible.
    #[tracing::instrument(name = "get_team_by_name", skip_all, fields(retriever = %retriever), err)]
    pub async fn get_team_by_name(&self, name: &str, retriever: UserId) -> ServiceResult<Team> {
        with_deadline(
            self.store_timeout,
            self.repository.find_visible_by_name(name, retriever),
        )
        .await?
        .ok_or(ServiceError::NotFound)
    }

    /// Lists the teams visible to `retriever`.
    ///
    /// The only sort column is `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Validation`] for invalid pagination.
    #[tracing::instrument(name = "get_all_teams", skip_all, fields(retriever = %retriever), err)]
    pub async fn get_all_teams(
        &self,
        filters: &TeamFilters,
        page: &PageRequest,
        retriever: UserId,
    ) -> ServiceResult<Page<Team>> {
        let mut validator = Validator::new();
        let Some(pagination) = page.validate(&mut validator, TEAM_SORT_SAFELIST) else {
            return Err(validator.into());
        };

        with_deadline(
            self.store_timeout,
            self.repository
                .list_visible(filters, retriever, &pagination),
        )
        .await
    }

    /// Renames the team and/or changes its visibility.
    ///
    /// Only the owner may update a team. When neither value differs from
    /// `team`, nothing is written and a copy of `team` is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::PermissionDenied`] for non-owners,
    /// [`ServiceError::Validation`] on the `name` field for a malformed or
    /// taken name, and [`ServiceError::EditConflict`] when the team changed
    /// since it was read.
    #[tracing::instrument(
        name = "update_team",
        skip_all,
        fields(team_id = %team.id(), updater = %updater),
        err
    )]
    pub async fn update_team(
        &self,
        team: &Team,
        new_name: Option<&str>,
        new_is_public: Option<bool>,
        updater: UserId,
    ) -> ServiceResult<Team> {
        self.require_role(team.id(), updater, MemberRole::Owner)
            .await?;

        let mut revised = team.clone();
        let mut changed = false;
        if let Some(name) = new_name {
            let mut validator = Validator::new();
            validate_handle(&mut validator, name, TEAM_NAME_FIELD);
            validator.finish()?;
            if revised.name() != name {
                revised.rename(name);
                changed = true;
            }
        }
        if let Some(is_public) = new_is_public.filter(|value| *value != revised.is_public()) {
            revised.set_public(is_public);
            changed = true;
        }
        if !changed {
            return Ok(revised);
        }

        let version = with_deadline(self.store_timeout, self.repository.update(&revised)).await?;
        Ok(revised.with_version(version))
    }

    /// Deletes a team together with its memberships, invitations and tasks.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::PermissionDenied`] unless `remover` owns the
    /// team, and [`ServiceError::NotFound`] when the team is already gone.
    #[tracing::instrument(
        name = "delete_team",
        skip_all,
        fields(team_id = %team_id, remover = %remover),
        err
    )]
    pub async fn delete_team(&self, team_id: TeamId, remover: UserId) -> ServiceResult<()> {
        self.require_role(team_id, remover, MemberRole::Owner)
            .await?;
        with_deadline(self.store_timeout, self.repository.delete(team_id)).await?;
        tracing::info!("team deleted");
        Ok(())
    }

    /// Returns `true` when `user` holds any role in `team`.
    ///
    /// # Errors
    ///
    /// Returns an infrastructure error when the lookup fails.
    pub async fn is_member(&self, team_id: TeamId, user: UserId) -> ServiceResult<bool> {
        self.has_role(team_id, user, MemberRole::Regular).await
    }

    /// Returns the role `user` holds in `team`, or `None` for non-members.
    ///
    /// # Errors
    ///
    /// Returns an infrastructure error when the lookup fails.
    pub async fn get_member_role(
        &self,
        team_id: TeamId,
        user: UserId,
    ) -> ServiceResult<Option<MemberRole>> {
        with_deadline(
            self.store_timeout,
            self.repository.find_member_role(team_id, user),
        )
        .await
    }

    /// Invites `recipient` to the team.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::PermissionDenied`] unless `inviter` is an
    /// admin or the owner, and [`ServiceError::InvitationExists`] when the
    /// invitee already has a pending invitation to the team.
    #[tracing::instrument(
        name = "invite_user",
        skip_all,
        fields(team_id = %team_id, inviter = %inviter, invitee = %recipient),
        err
    )]
    pub async fn invite_user(
        &self,
        team_id: TeamId,
        inviter: UserId,
        recipient: UserId,
    ) -> ServiceResult<Invitation> {
        self.require_role(team_id, inviter, MemberRole::Admin)
            .await?;

        let invitation = Invitation::new(team_id, inviter, recipient);
        with_deadline(
            self.store_timeout,
            self.repository.insert_invitation(&invitation),
        )
        .await?;
        tracing::info!(invitation_id = %invitation.id(), "invitation sent");
        Ok(invitation)
    }

    /// Lists the invitations `retriever` sent or received.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Validation`] for invalid pagination.
    #[tracing::instrument(
        name = "get_all_invitations",
        skip_all,
        fields(retriever = %retriever),
        err
    )]
    pub async fn get_all_invitations(
        &self,
        filters: &InvitationFilters,
        page: &PageRequest,
        retriever: UserId,
    ) -> ServiceResult<Page<Invitation>> {
        let mut validator = Validator::new();
        let Some(pagination) = page.validate(&mut validator, DEFAULT_SORT_SAFELIST) else {
            return Err(validator.into());
        };

        with_deadline(
            self.store_timeout,
            self.repository
                .list_invitations(filters, retriever, &pagination),
        )
        .await
    }

    /// Accepts an invitation, making `invitee` a regular member.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] when no such invitation was sent to
    /// `invitee`, and [`ServiceError::AlreadyMember`] when the invitee already
    /// belongs to the team.
    #[tracing::instrument(
        name = "accept_invitation",
        skip_all,
        fields(invitation_id = %invitation_id, invitee = %invitee),
        err
    )]
    pub async fn accept_invitation(
        &self,
        invitation_id: InvitationId,
        invitee: UserId,
    ) -> ServiceResult<Membership> {
        let membership = with_deadline(
            self.store_timeout,
            self.repository.accept_invitation(invitation_id, invitee),
        )
        .await?;
        tracing::info!(team_id = %membership.team_id(), "invitation accepted");
        Ok(membership)
    }

    /// Declines an invitation on behalf of its invitee.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] when no such invitation was sent to
    /// `invitee`.
    #[tracing::instrument(
        name = "reject_invitation",
        skip_all,
        fields(invitation_id = %invitation_id, invitee = %invitee),
        err
    )]
    pub async fn reject_invitation(
        &self,
        invitation_id: InvitationId,
        invitee: UserId,
    ) -> ServiceResult<()> {
        with_deadline(
            self.store_timeout,
            self.repository
                .delete_invitation(invitation_id, InvitationParty::Invitee(invitee)),
        )
        .await
    }

    /// Withdraws an invitation on behalf of its inviter.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] when `remover` did not send such an
    /// invitation.
    #[tracing::instrument(
        name = "delete_invitation",
        skip_all,
        fields(invitation_id = %invitation_id, remover = %remover),
        err
    )]
    pub async fn delete_invitation(
        &self,
        invitation_id: InvitationId,
        remover: UserId,
    ) -> ServiceResult<()> {
        with_deadline(
            self.store_timeout,
            self.repository
                .delete_invitation(invitation_id, InvitationParty::Inviter(remover)),
        )
        .await
    }

    /// Lists the members of a team.
    ///
    /// Each entry of `roles` must name a member role; members holding any of
    /// them are kept, and an empty list keeps everyone.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Validation`] on the `roles` field for the
    /// first unknown role, or for invalid pagination.
    #[tracing::instrument(name = "get_all_team_members", skip_all, fields(team_id = %team_id), err)]
    pub async fn get_all_team_members(
        &self,
        team_id: TeamId,
        filters: &MembershipFilters,
        roles: &[&str],
        page: &PageRequest,
    ) -> ServiceResult<Page<Membership>> {
        let mut validator = Validator::new();
        let mut narrowed = filters.clone();
        for role in roles {
            let Ok(parsed) = MemberRole::try_from(*role) else {
                validator.add_error(
                    ROLES_FIELD,
                    format!("Contains an invalid member role {role:?}."),
                );
                break;
            };
            narrowed.roles.push(parsed);
        }
        let validated = page.validate(&mut validator, DEFAULT_SORT_SAFELIST);
        let Some(pagination) = validated.filter(|_| !validator.has_errors()) else {
            return Err(validator.into());
        };

        with_deadline(
            self.store_timeout,
            self.repository
                .list_members(team_id, &narrowed, &pagination),
        )
        .await
    }

    /// Changes the role of `member`.
    ///
    /// Only the owner may change roles, and never their own. Setting the
    /// role a member already holds writes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Validation`] on the `new_role` field for an
    /// unknown role, [`ServiceError::PermissionDenied`] for non-owners,
    /// [`ServiceError::CannotChangeOwnerRole`] when the owner targets
    /// themselves, [`ServiceError::NotFound`] when `member` is not in the
    /// team, and [`ServiceError::EditConflict`] on a concurrent change.
    #[tracing::instrument(
        name = "update_member_role",
        skip_all,
        fields(team_id = %team_id, member = %member, updater = %updater),
        err
    )]
    pub async fn update_member_role(
        &self,
        team_id: TeamId,
        member: UserId,
        new_role: &str,
        updater: UserId,
    ) -> ServiceResult<Membership> {
        let Ok(role) = MemberRole::try_from(new_role) else {
            return Err(field_error(NEW_ROLE_FIELD, "Must be a valid member role.").into());
        };

        self.require_role(team_id, updater, MemberRole::Owner)
            .await?;
        if updater == member {
            return Err(ServiceError::CannotChangeOwnerRole);
        }

        let membership = with_deadline(
            self.store_timeout,
            self.repository.find_membership(team_id, member),
        )
        .await?
        .ok_or(ServiceError::NotFound)?;
        if membership.role() == role {
            return Ok(membership);
        }

        let mut promoted = membership;
        promoted.set_role(role);
        let version = with_deadline(
            self.store_timeout,
            self.repository.update_membership(&promoted),
        )
        .await?;
        tracing::info!(role = %role, "member role changed");
        Ok(promoted.with_version(version))
    }

    /// Removes `member` from the team.
    ///
    /// Admins and the owner may remove others; any member may leave. The
    /// owner can never be removed.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::CannotRemoveTeamOwner`] when `member` owns the
    /// team, [`ServiceError::PermissionDenied`] when `remover` may not remove
    /// `member`, and [`ServiceError::NotFound`] when `member` is not in the
    /// team.
    #[tracing::instrument(
        name = "remove_member_from_team",
        skip_all,
        fields(team_id = %team_id, member = %member, remover = %remover),
        err
    )]
    pub async fn remove_member_from_team(
        &self,
        team_id: TeamId,
        member: UserId,
        remover: UserId,
    ) -> ServiceResult<()> {
        if self.has_role(team_id, member, MemberRole::Owner).await? {
            return Err(ServiceError::CannotRemoveTeamOwner);
        }
        let is_admin = self.has_role(team_id, remover, MemberRole::Admin).await?;
        if !is_admin && remover != member {
            return Err(ServiceError::PermissionDenied);
        }

        with_deadline(
            self.store_timeout,
            self.repository.delete_membership(team_id, member),
        )
        .await
    }

    async fn has_role(
        &self,
        team_id: TeamId,
        user: UserId,
        required: MemberRole,
    ) -> ServiceResult<bool> {
        let role = self.get_member_role(team_id, user).await?;
        Ok(role.is_some_and(|held| held.satisfies(required)))
    }

    async fn require_role(
        &self,
        team_id: TeamId,
        user: UserId,
        required: MemberRole,
    ) -> ServiceResult<()> {
        if self.has_role(team_id, user, required).await? {
            return Ok(());
        }
        Err(ServiceError::PermissionDenied)
    }
}
