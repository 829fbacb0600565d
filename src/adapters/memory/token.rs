//! In-memory token repository.

use super::InMemoryStore;
use crate::domain::{TokenHash, TokenRecord, TokenScope, User, UserId};
use crate::ports::{TokenRepository, TokenRepositoryError, TokenRepositoryResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
impl TokenRepository for InMemoryStore {
    async fn insert(&self, token: &TokenRecord) -> TokenRepositoryResult<()> {
        let mut state = self.write_state(TokenRepositoryError::persistence)?;
        if !state.users.contains_key(&token.recipient) {
            return Err(TokenRepositoryError::UnknownRecipient(token.recipient));
        }
        state.tokens.push(token.clone());
        Ok(())
    }

    async fn find_recipient(
        &self,
        hash: &TokenHash,
        scope: TokenScope,
        now: DateTime<Utc>,
    ) -> TokenRepositoryResult<Option<User>> {
        let mut state = self.write_state(TokenRepositoryError::persistence)?;
        state.tokens.retain(|t| t.is_live_at(now));
        let recipient = state
            .tokens
            .iter()
            .find(|t| t.hash == *hash && t.scope == scope)
            .and_then(|t| state.users.get(&t.recipient))
            .cloned();
        Ok(recipient)
    }

    async fn delete_all_for_recipient(
        &self,
        recipient: UserId,
        scope: TokenScope,
    ) -> TokenRepositoryResult<()> {
        let mut state = self.write_state(TokenRepositoryError::persistence)?;
        state
            .tokens
            .retain(|t| !(t.recipient == recipient && t.scope == scope));
        Ok(())
    }
}
