//! Repository port for user accounts.

use crate::domain::{User, UserId, Version};
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use std::sync::Arc;
use thiserror::Error;

/// Result type for user repository operations.
pub type UserRepositoryResult<T> = Result<T, UserRepositoryError>;

/// User persistence contract.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Stores a new user.
    ///
    /// # Errors
    ///
    /// Returns [`UserRepositoryError::DuplicateUsername`] or
    /// [`UserRepositoryError::DuplicateEmail`] when a uniqueness constraint is
    /// violated; nothing is stored in that case.
    async fn insert(&self, user: &User) -> UserRepositoryResult<()>;

    /// Finds a user by identifier.
    async fn find_by_id(&self, id: UserId) -> UserRepositoryResult<Option<User>>;

    /// Finds a user by exact username.
    async fn find_by_username(&self, username: &str) -> UserRepositoryResult<Option<User>>;

    /// Finds a user by exact e-mail address.
    async fn find_by_email(&self, email: &str) -> UserRepositoryResult<Option<User>>;

    /// Writes `user` if the stored version still equals `user.version()`.
    ///
    /// Returns the new version on success.
    ///
    /// # Errors
    ///
    /// Returns [`UserRepositoryError::EditConflict`] when the stored version
    /// differs or the user no longer exists, and the duplicate variants when
    /// the new username or e-mail address is taken.
    async fn update(&self, user: &User) -> UserRepositoryResult<Version>;
}

/// Errors returned by user repository implementations.
#[derive(Debug, Clone, Error)]
pub enum UserRepositoryError {
    /// The username is already registered.
    #[error("duplicate username: {0}")]
    DuplicateUsername(String),

    /// The e-mail address is already registered.
    #[error("duplicate email address: {0}")]
    DuplicateEmail(String),

    /// The stored version no longer matches.
    #[error("edit conflict on user {0}")]
    EditConflict(UserId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl UserRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
