//! Service layer orchestrating validation, authorization and storage.
//!
//! Services are cheap to clone: they hold their dependencies behind `Arc`
//! and keep no mutable state of their own. Concurrent writers are resolved
//! by the stores through entity versions.

mod task;
mod team;
mod token;
mod user;

pub use task::{CreateTaskRequest, TaskService};
pub use team::TeamService;
pub use token::{TOKEN_ENTROPY_BYTES, TOKEN_FIELD, TokenService};
pub use user::UserService;

use crate::config::ServiceConfig;
use crate::ports::{PasswordHasher, TaskRepository, TeamRepository, TokenRepository, UserRepository};
use mockable::Clock;
use std::sync::Arc;

/// Every service wired to one shared store.
#[derive(Clone)]
pub struct ServiceRegistry<S, H, C>
where
    S: UserRepository + TokenRepository + TeamRepository + TaskRepository,
    H: PasswordHasher + 'static,
    C: Clock + Send + Sync,
{
    /// User accounts.
    pub users: UserService<S, H>,
    /// Tokens.
    pub tokens: TokenService<S, C>,
    /// Teams, memberships and invitations.
    pub teams: TeamService<S>,
    /// Tasks.
    pub tasks: TaskService<S, S, C>,
}

impl<S, H, C> ServiceRegistry<S, H, C>
where
    S: UserRepository + TokenRepository + TeamRepository + TaskRepository,
    H: PasswordHasher + 'static,
    C: Clock + Send + Sync,
{
    /// Builds every service over `store`.
    #[must_use]
    pub fn new(store: Arc<S>, hasher: Arc<H>, clock: Arc<C>, config: &ServiceConfig) -> Self {
        Self {
            users: UserService::new(Arc::clone(&store), hasher, config),
            tokens: TokenService::new(Arc::clone(&store), Arc::clone(&clock), config),
            teams: TeamService::new(Arc::clone(&store), config),
            tasks: TaskService::new(Arc::clone(&store), store, clock, config),
        }
    }
}
