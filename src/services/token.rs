//! Issue and redeem single-purpose tokens.

use crate::config::ServiceConfig;
use crate::deadline::with_deadline;
use crate::domain::{Token, TokenHash, TokenScope, User, UserId};
use crate::error::{ServiceError, ServiceResult};
use crate::ports::TokenRepository;
use crate::validation::{Validator, field_error};
use chrono::{DateTime, TimeDelta, Utc};
use data_encoding::BASE32_NOPAD;
use mockable::Clock;
use rand::RngCore;
use rand::rngs::OsRng;
use std::sync::Arc;
use std::time::Duration;

/// Validation key for token plaintexts.
pub const TOKEN_FIELD: &str = "token";

/// Number of random bytes in a token; 128 bits of entropy.
pub const TOKEN_ENTROPY_BYTES: usize = 16;

/// Token issuing and redemption service.
#[derive(Clone)]
pub struct TokenService<R, C>
where
    R: TokenRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    store_timeout: Option<Duration>,
}

impl<R, C> TokenService<R, C>
where
    R: TokenRepository,
    C: Clock + Send + Sync,
{
    /// Creates a token service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>, config: &ServiceConfig) -> Self {
        Self {
            repository,
            clock,
            store_timeout: config.store_timeout,
        }
    }

    /// Issues a token of `scope` for `recipient`, valid for `ttl`.
    ///
    /// Only the hash is stored. The returned token is the sole copy of the
    /// plaintext.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::TokenGeneration`] when the system random
    /// source fails, [`ServiceError::NotFound`] when the recipient does not
    /// exist, and an infrastructure error when storage fails.
    #[tracing::instrument(
        name = "generate_token",
        skip_all,
        fields(recipient = %recipient, scope = %scope),
        err
    )]
    pub async fn generate_token(
        &self,
        recipient: UserId,
        ttl: TimeDelta,
        scope: TokenScope,
    ) -> ServiceResult<Token> {
        let mut bytes = [0_u8; TOKEN_ENTROPY_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|err| ServiceError::TokenGeneration(Arc::new(err)))?;

        let expires_at = self
            .clock
            .utc()
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let token = Token::new(BASE32_NOPAD.encode(&bytes), recipient, expires_at, scope);
        with_deadline(self.store_timeout, self.repository.insert(token.record())).await?;
        Ok(token)
    }

    /// Returns the user a live token of `scope` was issued to.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Validation`] on the `token` field when the
    /// plaintext is empty or does not match a live token of `scope`.
    #[tracing::instrument(name = "get_token_recipient", skip_all, fields(scope = %scope), err)]
    pub async fn get_token_recipient(
        &self,
        plaintext: &str,
        scope: TokenScope,
    ) -> ServiceResult<User> {
        let mut validator = Validator::new();
        validator.check_non_empty(plaintext, TOKEN_FIELD);
        validator.finish()?;

        let hash = TokenHash::of(plaintext);
        let now = self.clock.utc();
        with_deadline(
            self.store_timeout,
            self.repository.find_recipient(&hash, scope, now),
        )
        .await?
        .ok_or_else(|| {
            ServiceError::Validation(field_error(
                TOKEN_FIELD,
                format!("Invalid or expired {} token.", scope.describe()),
            ))
        })
    }

    /// Deletes every token of `scope` issued to `recipient`.
    ///
    /// # Errors
    ///
    /// Returns an infrastructure error when storage fails.
    #[tracing::instrument(
        name = "delete_all_tokens_for_recipient",
        skip_all,
        fields(recipient = %recipient, scope = %scope),
        err
    )]
    pub async fn delete_all_tokens_for_recipient(
        &self,
        recipient: UserId,
        scope: TokenScope,
    ) -> ServiceResult<()> {
        with_deadline(
            self.store_timeout,
            self.repository.delete_all_for_recipient(recipient, scope),
        )
        .await
    }
}
