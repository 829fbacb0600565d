//! Shared state behind the in-memory repositories.

use crate::domain::{Invitation, Membership, Task, Team, TeamId, TokenRecord, User, UserId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe in-memory store implementing every repository port.
///
/// All repositories share one lock, so workflows that touch several record
/// kinds (creating a team with its owner, accepting an invitation, deleting
/// a team) are applied atomically. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<StoreState>>,
}

#[derive(Debug, Default)]
pub(super) struct StoreState {
    pub(super) users: HashMap<UserId, User>,
    pub(super) tokens: Vec<TokenRecord>,
    pub(super) teams: HashMap<TeamId, Team>,
    pub(super) memberships: HashMap<(TeamId, UserId), Membership>,
    pub(super) invitations: Vec<Invitation>,
    pub(super) tasks: Vec<Task>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the shared lock, wrapping a poisoned lock with `wrap`.
    pub(super) fn read_state<E>(
        &self,
        wrap: impl FnOnce(std::io::Error) -> E,
    ) -> Result<RwLockReadGuard<'_, StoreState>, E> {
        self.state
            .read()
            .map_err(|err| wrap(std::io::Error::other(err.to_string())))
    }

    /// Acquires the exclusive lock, wrapping a poisoned lock with `wrap`.
    pub(super) fn write_state<E>(
        &self,
        wrap: impl FnOnce(std::io::Error) -> E,
    ) -> Result<RwLockWriteGuard<'_, StoreState>, E> {
        self.state
            .write()
            .map_err(|err| wrap(std::io::Error::other(err.to_string())))
    }
}

impl StoreState {
    /// Returns the username of `user`, or an empty string for unknown users.
    pub(super) fn username_of(&self, user: UserId) -> &str {
        self.users.get(&user).map_or("", User::username)
    }

    pub(super) fn is_member(&self, team: TeamId, user: UserId) -> bool {
        self.memberships.contains_key(&(team, user))
    }
}

/// Case-insensitive substring match; an empty needle matches everything.
pub(super) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}
