//! bcrypt password hashing.

use crate::config::{DEFAULT_PASSWORD_HASH_COST, ServiceConfig};
use crate::domain::PasswordHash;
use crate::ports::{PasswordHashError, PasswordHasher};
use std::sync::OnceLock;

const DUMMY_PASSWORD: &str = "timing-equalisation-only";

/// [`PasswordHasher`] backed by bcrypt.
#[derive(Debug, Clone)]
pub struct BcryptPasswordHasher {
    cost: u32,
    dummy_hash: OnceLock<Option<String>>,
}

impl BcryptPasswordHasher {
    /// Creates a hasher with the given cost factor.
    ///
    /// bcrypt accepts costs from 4 to 31; other values make every
    /// [`PasswordHasher::hash`] call fail.
    #[must_use]
    pub const fn new(cost: u32) -> Self {
        Self {
            cost,
            dummy_hash: OnceLock::new(),
        }
    }

    /// Creates a hasher with the configured cost factor.
    #[must_use]
    pub const fn from_config(config: &ServiceConfig) -> Self {
        Self::new(config.password_hash_cost)
    }

    /// Returns the configured cost factor.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_PASSWORD_HASH_COST)
    }
}

impl PasswordHasher for BcryptPasswordHasher {
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHashError> {
        ::bcrypt::hash(password, self.cost)
            .map(PasswordHash::new)
            .map_err(PasswordHashError::new)
    }

    fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, PasswordHashError> {
        ::bcrypt::verify(password, hash.as_str()).map_err(PasswordHashError::new)
    }

    fn verify_dummy(&self, password: &str) {
        let dummy = self
            .dummy_hash
            .get_or_init(|| ::bcrypt::hash(DUMMY_PASSWORD, self.cost).ok());
        if let Some(encoded) = dummy
            && let Err(err) = ::bcrypt::verify(password, encoded)
        {
            tracing::debug!(error = %err, "dummy bcrypt verification failed");
        }
    }
}
