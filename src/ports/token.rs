//! Repository port for hashed bearer tokens.

use crate::domain::{TokenHash, TokenRecord, TokenScope, User, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for token repository operations.
pub type TokenRepositoryResult<T> = Result<T, TokenRepositoryError>;

/// Token persistence contract.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Stores an issued token record.
    async fn insert(&self, token: &TokenRecord) -> TokenRepositoryResult<()>;

    /// Returns the user a live token with `hash` and `scope` was issued to.
    ///
    /// Tokens whose expiry is not strictly after `now` never match.
    async fn find_recipient(
        &self,
        hash: &TokenHash,
        scope: TokenScope,
        now: DateTime<Utc>,
    ) -> TokenRepositoryResult<Option<User>>;

    /// Deletes every token of `scope` issued to `recipient`.
    ///
    /// Succeeds even when nothing matched.
    async fn delete_all_for_recipient(
        &self,
        recipient: UserId,
        scope: TokenScope,
    ) -> TokenRepositoryResult<()>;
}

/// Errors returned by token repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TokenRepositoryError {
    /// The recipient does not exist.
    #[error("unknown token recipient: {0}")]
    UnknownRecipient(UserId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TokenRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
