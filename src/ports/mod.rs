//! Port abstractions for storage and password hashing.

mod password;
mod task;
mod team;
mod token;
mod user;

pub use password::{PasswordHashError, PasswordHasher};
pub use task::{TaskFilters, TaskRepository, TaskRepositoryError, TaskRepositoryResult};
pub use team::{
    InvitationFilters, InvitationParty, MembershipFilters, TEAM_SORT_SAFELIST, TeamFilters,
    TeamRepository, TeamRepositoryError, TeamRepositoryResult,
};
pub use token::{TokenRepository, TokenRepositoryError, TokenRepositoryResult};
pub use user::{UserRepository, UserRepositoryError, UserRepositoryResult};

#[cfg(test)]
pub use team::MockTeamRepository;
#[cfg(test)]
pub use user::MockUserRepository;
