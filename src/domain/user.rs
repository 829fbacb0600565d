//! Registered user accounts.

use super::{UserId, Version};
use serde::Serialize;
use std::fmt;

/// Adaptive password hash in its encoded string form.
///
/// The `Debug` representation is redacted so hashes never reach logs.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wraps an encoded hash produced by a password hasher.
    #[must_use]
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Returns the encoded hash.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// A registered user.
///
/// The password hash and version are never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    id: UserId,
    username: String,
    email: String,
    #[serde(skip)]
    password_hash: PasswordHash,
    is_verified: bool,
    #[serde(skip)]
    version: Version,
}

/// Data required to reconstruct a user from storage.
#[derive(Debug, Clone)]
pub struct PersistedUserData {
    /// User identifier.
    pub id: UserId,
    /// Unique handle.
    pub username: String,
    /// Unique e-mail address.
    pub email: String,
    /// Stored password hash.
    pub password_hash: PasswordHash,
    /// Whether the e-mail address has been verified.
    pub is_verified: bool,
    /// Stored version.
    pub version: Version,
}

impl User {
    /// Creates an unverified user at the initial version.
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: PasswordHash,
    ) -> Self {
        Self {
            id: UserId::new(),
            username: username.into(),
            email: email.into(),
            password_hash,
            is_verified: false,
            version: Version::INITIAL,
        }
    }

    /// Reconstructs a user from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedUserData) -> Self {
        Self {
            id: data.id,
            username: data.username,
            email: data.email,
            password_hash: data.password_hash,
            is_verified: data.is_verified,
            version: data.version,
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the e-mail address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the stored password hash.
    #[must_use]
    pub const fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    /// Returns `true` once the e-mail address has been verified.
    #[must_use]
    pub const fn is_verified(&self) -> bool {
        self.is_verified
    }

    /// Returns the version this copy was read at.
    #[must_use]
    pub const fn version(&self) -> Version {
        self.version
    }

    /// Marks the e-mail address as verified.
    pub const fn mark_verified(&mut self) {
        self.is_verified = true;
    }

    /// Replaces the stored password hash.
    pub fn set_password_hash(&mut self, password_hash: PasswordHash) {
        self.password_hash = password_hash;
    }

    pub(crate) const fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }
}
