//! Shared fixtures for the in-memory service integration tests.

use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;
use rstest::fixture;
use std::sync::{Arc, Mutex, PoisonError};
use tasktracker::adapters::memory::InMemoryStore;
use tasktracker::config::ServiceConfig;
use tasktracker::domain::{PasswordHash, Team, User, UserId};
use tasktracker::ports::{PasswordHashError, PasswordHasher};
use tasktracker::services::ServiceRegistry;

/// Password used for every registered test user.
pub const PASSWORD: &str = "s3cret-enough";

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Starts the clock at `now`.
    #[must_use]
    pub const fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Moves the clock forward by `delta`.
    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += delta;
    }
}

impl Clock for ManualClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Hasher that prefixes the password, keeping tests fast.
#[derive(Debug, Default)]
pub struct PrefixHasher;

impl PasswordHasher for PrefixHasher {
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHashError> {
        Ok(PasswordHash::new(format!("test:{password}")))
    }

    fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, PasswordHashError> {
        Ok(hash.as_str().strip_prefix("test:") == Some(password))
    }
}

/// Services and their collaborators for one test.
pub struct World {
    /// Backing store shared by every service.
    pub store: Arc<InMemoryStore>,
    /// Controllable clock.
    pub clock: Arc<ManualClock>,
    /// The services under test.
    pub services: ServiceRegistry<InMemoryStore, PrefixHasher, ManualClock>,
}

/// Instant every test clock starts at.
#[must_use]
pub fn epoch() -> DateTime<Utc> {
    DateTime::from_timestamp(1_780_000_000, 0).unwrap_or_default()
}

/// Provides fresh services over an empty store.
#[fixture]
pub fn world() -> World {
    let store = Arc::new(InMemoryStore::new());
    let clock = Arc::new(ManualClock::starting_at(epoch()));
    let services = ServiceRegistry::new(
        Arc::clone(&store),
        Arc::new(PrefixHasher),
        Arc::clone(&clock),
        &ServiceConfig::default(),
    );
    World {
        store,
        clock,
        services,
    }
}

impl World {
    /// Registers `username` with an address derived from it.
    ///
    /// # Errors
    ///
    /// Returns an error if registration fails.
    pub async fn user(&self, username: &str) -> eyre::Result<User> {
        let email = format!("{username}@tasks.test");
        Ok(self
            .services
            .users
            .register_user(username, &email, PASSWORD)
            .await?)
    }

    /// Creates a team owned by `owner` with `members` at the given roles.
    ///
    /// # Errors
    ///
    /// Returns an error if any team, invitation or role operation fails.
    pub async fn team(
        &self,
        name: &str,
        is_public: bool,
        owner: UserId,
        members: &[(UserId, &str)],
    ) -> eyre::Result<Team> {
        let teams = &self.services.teams;
        let team = teams.create_team(name, is_public, owner).await?;
        for (member, role) in members {
            let invitation = teams.invite_user(team.id(), owner, *member).await?;
            teams.accept_invitation(invitation.id(), *member).await?;
            if *role != "regular" {
                teams
                    .update_member_role(team.id(), *member, role, owner)
                    .await?;
            }
        }
        Ok(team)
    }
}
