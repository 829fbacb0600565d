//! In-memory user repository.

use super::InMemoryStore;
use super::store::StoreState;
use crate::domain::{User, UserId, Version};
use crate::ports::{UserRepository, UserRepositoryError, UserRepositoryResult};
use async_trait::async_trait;

/// Returns the uniqueness violation `user` would cause; usernames win ties.
fn clash(state: &StoreState, user: &User) -> Option<UserRepositoryError> {
    let others: Vec<&User> = state
        .users
        .values()
        .filter(|u| u.id() != user.id())
        .collect();
    if others.iter().any(|u| u.username() == user.username()) {
        return Some(UserRepositoryError::DuplicateUsername(user.username().to_owned()));
    }
    if others.iter().any(|u| u.email() == user.email()) {
        return Some(UserRepositoryError::DuplicateEmail(user.email().to_owned()));
    }
    None
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, user: &User) -> UserRepositoryResult<()> {
        let mut state = self.write_state(UserRepositoryError::persistence)?;
        if let Some(err) = clash(&state, user) {
            return Err(err);
        }
        state
            .users
            .insert(user.id(), user.clone().with_version(Version::INITIAL));
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> UserRepositoryResult<Option<User>> {
        let state = self.read_state(UserRepositoryError::persistence)?;
        Ok(state.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> UserRepositoryResult<Option<User>> {
        let state = self.read_state(UserRepositoryError::persistence)?;
        Ok(state
            .users
            .values()
            .find(|u| u.username() == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> UserRepositoryResult<Option<User>> {
        let state = self.read_state(UserRepositoryError::persistence)?;
        Ok(state.users.values().find(|u| u.email() == email).cloned())
    }

    async fn update(&self, user: &User) -> UserRepositoryResult<Version> {
        let mut state = self.write_state(UserRepositoryError::persistence)?;
        let stored_version = state.users.get(&user.id()).map(User::version);
        if stored_version != Some(user.version()) {
            return Err(UserRepositoryError::EditConflict(user.id()));
        }
        if let Some(err) = clash(&state, user) {
            return Err(err);
        }

        let next = user.version().next();
        state
            .users
            .insert(user.id(), user.clone().with_version(next));
        Ok(next)
    }
}
