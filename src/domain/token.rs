//! Single-purpose bearer tokens.
//!
//! Only the SHA-256 digest of a token is ever stored. The plaintext exists
//! once, on the [`Token`] handed back to the caller at issue time.

use super::{ParseTokenScopeError, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Purpose a token was issued for.
///
/// A token can only be redeemed for the scope it was issued under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenScope {
    /// E-mail address verification.
    Verification,
    /// Password reset.
    PasswordReset,
    /// Session authentication.
    Authentication,
}

impl TokenScope {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Verification => "verification",
            Self::PasswordReset => "password-reset",
            Self::Authentication => "authentication",
        }
    }

    /// Returns the human-readable scope name used in user-facing messages.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Verification => "verification",
            Self::PasswordReset => "password reset",
            Self::Authentication => "authentication",
        }
    }
}

impl fmt::Display for TokenScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TokenScope {
    type Error = ParseTokenScopeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "verification" => Ok(Self::Verification),
            "password-reset" => Ok(Self::PasswordReset),
            "authentication" => Ok(Self::Authentication),
            _ => Err(ParseTokenScopeError(value.to_owned())),
        }
    }
}

/// SHA-256 digest of a token plaintext.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenHash([u8; 32]);

impl TokenHash {
    /// Hashes a token plaintext.
    #[must_use]
    pub fn of(plaintext: &str) -> Self {
        Self(Sha256::digest(plaintext.as_bytes()).into())
    }
}

impl fmt::Debug for TokenHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TokenHash(<redacted>)")
    }
}

/// Stored form of an issued token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    /// Digest of the plaintext.
    pub hash: TokenHash,
    /// User the token was issued to.
    pub recipient: UserId,
    /// Instant after which the token no longer matches.
    pub expires_at: DateTime<Utc>,
    /// Purpose of the token.
    pub scope: TokenScope,
}

impl TokenRecord {
    /// Returns `true` while the token is still redeemable at `now`.
    #[must_use]
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// A freshly issued token, carrying its plaintext.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    #[serde(rename = "token")]
    plaintext: String,
    #[serde(skip)]
    record: TokenRecord,
    #[serde(rename = "expiry")]
    expires_at: DateTime<Utc>,
}

impl Token {
    /// Builds a token from its plaintext, hashing it for storage.
    #[must_use]
    pub fn new(
        plaintext: String,
        recipient: UserId,
        expires_at: DateTime<Utc>,
        scope: TokenScope,
    ) -> Self {
        let record = TokenRecord {
            hash: TokenHash::of(&plaintext),
            recipient,
            expires_at,
            scope,
        };
        Self {
            plaintext,
            record,
            expires_at,
        }
    }

    /// Returns the plaintext to deliver to the recipient.
    #[must_use]
    pub fn plaintext(&self) -> &str {
        &self.plaintext
    }

    /// Returns the storable record.
    #[must_use]
    pub const fn record(&self) -> &TokenRecord {
        &self.record
    }

    /// Returns the recipient.
    #[must_use]
    pub const fn recipient(&self) -> UserId {
        self.record.recipient
    }

    /// Returns the scope.
    #[must_use]
    pub const fn scope(&self) -> TokenScope {
        self.record.scope
    }

    /// Returns the expiry instant.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("recipient", &self.record.recipient)
            .field("scope", &self.record.scope)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}
