//! Team member roles and their privilege ordering.

use super::ParseMemberRoleError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role held by a user inside a team.
///
/// Variants are declared from least to most privileged so that the derived
/// ordering is the privilege order: `Regular < Leader < Admin < Owner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    /// Ordinary member.
    Regular,
    /// Member who may create tasks.
    Leader,
    /// Member who may administer the team roster and invitations.
    Admin,
    /// The single owner of the team.
    Owner,
}

impl MemberRole {
    /// Every role, least privileged first.
    pub const ALL: [Self; 4] = [Self::Regular, Self::Leader, Self::Admin, Self::Owner];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Leader => "leader",
            Self::Admin => "admin",
            Self::Owner => "owner",
        }
    }

    /// Returns `true` when this role is at least as privileged as `required`.
    #[must_use]
    pub fn satisfies(self, required: Self) -> bool {
        self >= required
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for MemberRole {
    type Error = ParseMemberRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "regular" => Ok(Self::Regular),
            "leader" => Ok(Self::Leader),
            "admin" => Ok(Self::Admin),
            "owner" => Ok(Self::Owner),
            _ => Err(ParseMemberRoleError(value.to_owned())),
        }
    }
}

impl std::str::FromStr for MemberRole {
    type Err = ParseMemberRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}
