//! Password hashing port.

use crate::domain::PasswordHash;
use std::sync::Arc;
use thiserror::Error;

/// Adaptive one-way password hashing.
///
/// Implementations are synchronous and may be CPU heavy; services run them
/// on the blocking thread pool.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordHashError`] when the hashing backend fails.
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHashError>;

    /// Returns `true` when `password` matches `hash`.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordHashError`] when `hash` is malformed or the backend
    /// fails.
    fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, PasswordHashError>;

    /// Spends roughly the time of one [`PasswordHasher::verify`] call.
    ///
    /// Called when authenticating an unknown user so the response time does
    /// not reveal whether the account exists.
    fn verify_dummy(&self, _password: &str) {}
}

/// Error raised by a password hashing backend.
#[derive(Debug, Clone, Error)]
#[error("password hashing failed: {0}")]
pub struct PasswordHashError(pub Arc<dyn std::error::Error + Send + Sync>);

impl PasswordHashError {
    /// Wraps a backend error.
    pub fn new(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Arc::new(err))
    }
}
