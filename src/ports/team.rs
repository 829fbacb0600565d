//! Repository port for teams, memberships and invitations.

use crate::domain::{
    Invitation, InvitationId, MemberRole, Membership, Team, TeamId, UserId, Version,
};
use crate::pagination::{Page, Pagination};
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use std::sync::Arc;
use thiserror::Error;

/// Sort allow-list for team listings.
pub const TEAM_SORT_SAFELIST: &[&str] = &["name"];

/// Result type for team repository operations.
pub type TeamRepositoryResult<T> = Result<T, TeamRepositoryError>;

/// Filters applied when listing teams.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamFilters {
    /// Case-insensitive substring of the team name.
    pub name: String,
    /// Restricts to public or private teams.
    pub is_public: Option<bool>,
}

/// Filters applied when listing invitations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvitationFilters {
    /// Case-insensitive substring of the team name.
    pub team_name: String,
    /// `Some(true)` keeps sent invitations, `Some(false)` received ones.
    pub is_inviter: Option<bool>,
}

/// Filters applied when listing team members.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipFilters {
    /// Case-insensitive substring of the member's username.
    pub username: String,
    /// Keeps only members holding one of these roles; empty keeps all.
    pub roles: Vec<MemberRole>,
}

/// The party acting on a pending invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvitationParty {
    /// The user who sent the invitation.
    Inviter(UserId),
    /// The user who received the invitation.
    Invitee(UserId),
}

impl InvitationParty {
    /// Returns `true` when this party sent or received `invitation`.
    #[must_use]
    pub fn is_party_to(self, invitation: &Invitation) -> bool {
        match self {
            Self::Inviter(user) => invitation.inviter_id() == user,
            Self::Invitee(user) => invitation.invitee_id() == user,
        }
    }
}

/// Team, membership and invitation persistence contract.
///
/// Multi-step workflows are single operations so that an implementation can
/// make them atomic.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Stores a new team together with an owner membership for `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`TeamRepositoryError::DuplicateTeamName`] when the name is
    /// taken; nothing is stored in that case.
    async fn insert_with_owner(&self, team: &Team, owner: UserId) -> TeamRepositoryResult<()>;

    /// Finds a team by identifier, regardless of visibility.
    async fn find_by_id(&self, id: TeamId) -> TeamRepositoryResult<Option<Team>>;

    /// Finds a team by exact name if it is public or `viewer` is a member.
    async fn find_visible_by_name(
        &self,
        name: &str,
        viewer: UserId,
    ) -> TeamRepositoryResult<Option<Team>>;

    /// Lists teams that are public or have `viewer` as a member.
    ///
    /// Results are ordered by the validated sort column, then by name.
    async fn list_visible(
        &self,
        filters: &TeamFilters,
        viewer: UserId,
        pagination: &Pagination,
    ) -> TeamRepositoryResult<Page<Team>>;

    /// Writes `team` if the stored version still equals `team.version()`.
    ///
    /// # Errors
    ///
    /// Returns [`TeamRepositoryError::EditConflict`] on a version mismatch or
    /// a missing team, and [`TeamRepositoryError::DuplicateTeamName`] when the
    /// new name is taken.
    async fn update(&self, team: &Team) -> TeamRepositoryResult<Version>;

    /// Deletes a team with all of its memberships, invitations and tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TeamRepositoryError::TeamNotFound`] when the team does not
    /// exist.
    async fn delete(&self, id: TeamId) -> TeamRepositoryResult<()>;

    /// Returns the role `user` holds in `team`, or `None` for non-members.
    async fn find_member_role(
        &self,
        team: TeamId,
        user: UserId,
    ) -> TeamRepositoryResult<Option<MemberRole>>;

    /// Finds the membership of `user` in `team`.
    async fn find_membership(
        &self,
        team: TeamId,
        user: UserId,
    ) -> TeamRepositoryResult<Option<Membership>>;

    /// Lists the members of `team`, ordered by username.
    async fn list_members(
        &self,
        team: TeamId,
        filters: &MembershipFilters,
        pagination: &Pagination,
    ) -> TeamRepositoryResult<Page<Membership>>;

    /// Writes `membership` if the stored version still matches.
    ///
    /// # Errors
    ///
    /// Returns [`TeamRepositoryError::EditConflict`] on a version mismatch or
    /// a missing membership.
    async fn update_membership(&self, membership: &Membership) -> TeamRepositoryResult<Version>;

    /// Deletes the membership of `user` in `team`.
    ///
    /// # Errors
    ///
    /// Returns [`TeamRepositoryError::MembershipNotFound`] when `user` is not
    /// a member.
    async fn delete_membership(&self, team: TeamId, user: UserId) -> TeamRepositoryResult<()>;

    /// Stores a pending invitation.
    ///
    /// # Errors
    ///
    /// Returns [`TeamRepositoryError::DuplicateInvitation`] when the invitee
    /// already has a pending invitation to the team.
    async fn insert_invitation(&self, invitation: &Invitation) -> TeamRepositoryResult<()>;

    /// Lists invitations sent or received by `user`, oldest first.
    async fn list_invitations(
        &self,
        filters: &InvitationFilters,
        user: UserId,
        pagination: &Pagination,
    ) -> TeamRepositoryResult<Page<Invitation>>;

    /// Deletes the invitation and inserts a regular membership for
    /// `invitee` in one step.
    ///
    /// # Errors
    ///
    /// Returns [`TeamRepositoryError::InvitationNotFound`] when no invitation
    /// with `id` was sent to `invitee`, and
    /// [`TeamRepositoryError::DuplicateMembership`] when the invitee already
    /// belongs to the team. Nothing changes in either case.
    async fn accept_invitation(
        &self,
        id: InvitationId,
        invitee: UserId,
    ) -> TeamRepositoryResult<Membership>;

    /// Deletes an invitation on behalf of one of its parties.
    ///
    /// # Errors
    ///
    /// Returns [`TeamRepositoryError::InvitationNotFound`] when no invitation
    /// with `id` has `party` in the given position.
    async fn delete_invitation(
        &self,
        id: InvitationId,
        party: InvitationParty,
    ) -> TeamRepositoryResult<()>;
}

/// Errors returned by team repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TeamRepositoryError {
    /// The team name is already taken.
    #[error("duplicate team name: {0}")]
    DuplicateTeamName(String),

    /// The invitee already has a pending invitation to the team.
    #[error("duplicate invitation of {invitee} to team {team}")]
    DuplicateInvitation {
        /// Team identifier.
        team: TeamId,
        /// Invited user.
        invitee: UserId,
    },

    /// The user already belongs to the team.
    #[error("user {user} is already a member of team {team}")]
    DuplicateMembership {
        /// Team identifier.
        team: TeamId,
        /// Member user.
        user: UserId,
    },

    /// The team was not found.
    #[error("team not found: {0}")]
    TeamNotFound(TeamId),

    /// The membership was not found.
    #[error("user {user} is not a member of team {team}")]
    MembershipNotFound {
        /// Team identifier.
        team: TeamId,
        /// User identifier.
        user: UserId,
    },

    /// The invitation was not found for the acting party.
    #[error("invitation not found: {0}")]
    InvitationNotFound(InvitationId),

    /// The stored version no longer matches.
    #[error("edit conflict on team {0}")]
    EditConflict(TeamId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TeamRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
