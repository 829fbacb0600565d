//! Service configuration.

use serde::Deserialize;
use std::time::Duration;

/// Default bcrypt cost factor.
pub const DEFAULT_PASSWORD_HASH_COST: u32 = 12;
/// Default deadline for a single store operation.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(3);

/// Tunables shared by every service.
///
/// Deserializes from any `serde` source; missing fields take their defaults.
/// The store timeout is given in milliseconds, and `null` disables it.
///
/// # Examples
///
/// ```
/// use tasktracker::config::ServiceConfig;
///
/// let config = ServiceConfig::default();
/// assert_eq!(config.password_hash_cost, 12);
/// assert_eq!(config.store_timeout.map(|t| t.as_secs()), Some(3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// bcrypt cost factor, between 4 and 31.
    pub password_hash_cost: u32,
    /// Upper bound on each store call; `None` waits indefinitely.
    #[serde(with = "optional_millis")]
    pub store_timeout: Option<Duration>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            password_hash_cost: DEFAULT_PASSWORD_HASH_COST,
            store_timeout: Some(DEFAULT_STORE_TIMEOUT),
        }
    }
}

impl ServiceConfig {
    /// Sets the bcrypt cost factor.
    #[must_use]
    pub const fn with_password_hash_cost(mut self, cost: u32) -> Self {
        self.password_hash_cost = cost;
        self
    }

    /// Sets or clears the store deadline.
    #[must_use]
    pub const fn with_store_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.store_timeout = timeout;
        self
    }
}

mod optional_millis {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}
