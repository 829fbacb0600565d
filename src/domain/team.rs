//! Teams, memberships and invitations.

use super::{InvitationId, MemberRole, TeamId, UserId, Version};
use serde::Serialize;

/// A named team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Team {
    id: TeamId,
    name: String,
    is_public: bool,
    #[serde(skip)]
    version: Version,
}

impl Team {
    /// Creates a team at the initial version.
    #[must_use]
    pub fn new(name: impl Into<String>, is_public: bool) -> Self {
        Self {
            id: TeamId::new(),
            name: name.into(),
            is_public,
            version: Version::INITIAL,
        }
    }

    /// Reconstructs a team from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        id: TeamId,
        name: String,
        is_public: bool,
        version: Version,
    ) -> Self {
        Self {
            id,
            name,
            is_public,
            version,
        }
    }

    /// Returns the team identifier.
    #[must_use]
    pub const fn id(&self) -> TeamId {
        self.id
    }

    /// Returns the unique team name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` when non-members may see the team.
    #[must_use]
    pub const fn is_public(&self) -> bool {
        self.is_public
    }

    /// Returns the version this copy was read at.
    #[must_use]
    pub const fn version(&self) -> Version {
        self.version
    }

    /// Renames the team.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Changes the visibility flag.
    pub const fn set_public(&mut self, is_public: bool) {
        self.is_public = is_public;
    }

    pub(crate) const fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }
}

/// A user's role inside a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Membership {
    team_id: TeamId,
    user_id: UserId,
    role: MemberRole,
    #[serde(skip)]
    version: Version,
}

impl Membership {
    /// Creates a membership at the initial version.
    #[must_use]
    pub const fn new(team_id: TeamId, user_id: UserId, role: MemberRole) -> Self {
        Self {
            team_id,
            user_id,
            role,
            version: Version::INITIAL,
        }
    }

    /// Reconstructs a membership from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        team_id: TeamId,
        user_id: UserId,
        role: MemberRole,
        version: Version,
    ) -> Self {
        Self {
            team_id,
            user_id,
            role,
            version,
        }
    }

    /// Returns the team identifier.
    #[must_use]
    pub const fn team_id(&self) -> TeamId {
        self.team_id
    }

    /// Returns the member's user identifier.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the member's role.
    #[must_use]
    pub const fn role(&self) -> MemberRole {
        self.role
    }

    /// Returns the version this copy was read at.
    #[must_use]
    pub const fn version(&self) -> Version {
        self.version
    }

    /// Changes the member's role.
    pub const fn set_role(&mut self, role: MemberRole) {
        self.role = role;
    }

    pub(crate) const fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }
}

/// A pending offer for a user to join a team.
///
/// Accepting turns the invitation into a [`Membership`] with the
/// [`MemberRole::Regular`] role and removes the invitation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invitation {
    id: InvitationId,
    team_id: TeamId,
    inviter_id: UserId,
    invitee_id: UserId,
}

impl Invitation {
    /// Creates an invitation with a fresh identifier.
    #[must_use]
    pub fn new(team_id: TeamId, sender: UserId, recipient: UserId) -> Self {
        Self {
            id: InvitationId::new(),
            team_id,
            inviter_id: sender,
            invitee_id: recipient,
        }
    }

    /// Reconstructs an invitation from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        id: InvitationId,
        team_id: TeamId,
        sender: UserId,
        recipient: UserId,
    ) -> Self {
        Self {
            id,
            team_id,
            inviter_id: sender,
            invitee_id: recipient,
        }
    }

    /// Returns the invitation identifier.
    #[must_use]
    pub const fn id(&self) -> InvitationId {
        self.id
    }

    /// Returns the team the invitation is for.
    #[must_use]
    pub const fn team_id(&self) -> TeamId {
        self.team_id
    }

    /// Returns the user who sent the invitation.
    #[must_use]
    pub const fn inviter_id(&self) -> UserId {
        self.inviter_id
    }

    /// Returns the user who was invited.
    #[must_use]
    pub const fn invitee_id(&self) -> UserId {
        self.invitee_id
    }
}
