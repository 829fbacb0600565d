//! Optimistic concurrency version counter.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-entity version used for compare-and-swap updates.
///
/// A freshly created entity starts at [`Version::INITIAL`]. Every successful
/// update performed by a store advances the counter by exactly one; a write
/// carrying any other version is rejected as an edit conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(u32);

impl Version {
    /// Version assigned to newly inserted entities.
    pub const INITIAL: Self = Self(1);

    /// Creates a version from a persisted value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw counter value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Returns the version that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
