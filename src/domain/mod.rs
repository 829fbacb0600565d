//! Domain model: users, tokens, teams, memberships, invitations and tasks.

mod error;
mod ids;
mod role;
mod task;
mod team;
mod token;
mod user;
mod version;

pub use error::{
    ParseMemberRoleError, ParseTaskPriorityError, ParseTaskStatusError, ParseTokenScopeError,
    TaskTransitionError,
};
pub use ids::{InvitationId, TaskId, TeamId, UserId};
pub use role::MemberRole;
pub use task::{NewTask, PersistedTaskData, Task, TaskPriority, TaskStatus, TaskTransition};
pub use team::{Invitation, Membership, Team};
pub use token::{Token, TokenHash, TokenRecord, TokenScope};
pub use user::{PasswordHash, PersistedUserData, User};
pub use version::Version;
