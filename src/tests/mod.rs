//! Service-level unit tests and their shared fixtures.


use crate::adapters::memory::InMemoryStore;
use crate::config::ServiceConfig;
use crate::domain::{PasswordHash, Team, User, UserId};
use crate::ports::{PasswordHashError, PasswordHasher};
use crate::services::ServiceRegistry;
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;
use rstest::fixture;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

pub(crate) const PASSWORD: &str = "correct-horse-battery";

/// Clock frozen at a settable instant.
#[derive(Debug)]
pub(crate) struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub(crate) const fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub(crate) fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += delta;
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Reversible "hash" so tests do not pay for bcrypt.
#[derive(Debug, Default)]
pub(crate) struct PlainHasher {
    dummy_calls: AtomicUsize,
}

impl PlainHasher {
    pub(crate) fn dummy_calls(&self) -> usize {
        self.dummy_calls.load(Ordering::SeqCst)
    }
}

impl PasswordHasher for PlainHasher {
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHashError> {
        Ok(PasswordHash::new(format!("plain${password}")))
    }

    fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, PasswordHashError> {
        let Some(stored) = hash.as_str().strip_prefix("plain$") else {
            return Err(PasswordHashError::new(std::io::Error::other(
                "unrecognised hash format",
            )));
        };
        Ok(stored == password)
    }

    fn verify_dummy(&self, _password: &str) {
        self.dummy_calls.fetch_add(1, Ordering::SeqCst);
    }
}

pub(crate) type TestRegistry = ServiceRegistry<InMemoryStore, PlainHasher, FixedClock>;

/// Services wired to a fresh store, a frozen clock and the plain hasher.
pub(crate) struct Harness {
    pub(crate) store: Arc<InMemoryStore>,
    pub(crate) clock: Arc<FixedClock>,
    pub(crate) hasher: Arc<PlainHasher>,
    pub(crate) services: TestRegistry,
}

pub(crate) fn start_instant() -> DateTime<Utc> {
    DateTime::from_timestamp(1_768_467_600, 0).unwrap_or_default()
}

#[fixture]
pub(crate) fn harness() -> Harness {
    let store = Arc::new(InMemoryStore::new());
    let clock = Arc::new(FixedClock::at(start_instant()));
    let hasher = Arc::new(PlainHasher::default());
    let services = ServiceRegistry::new(
        Arc::clone(&store),
        Arc::clone(&hasher),
        Arc::clone(&clock),
        &ServiceConfig::default(),
    );
    Harness {
        store,
        clock,
        hasher,
        services,
    }
}

impl Harness {
    /// Registers `username` with a derived e-mail address.
    pub(crate) async fn register(&self, username: &str) -> eyre::Result<User> {
        let email = format!("{username}@example.com");
        Ok(self
            .services
            .users
            .register_user(username, &email, PASSWORD)
            .await?)
    }

    /// Creates a public team owned by `owner`.
    pub(crate) async fn team_owned_by(&self, name: &str, owner: UserId) -> eyre::Result<Team> {
        Ok(self.services.teams.create_team(name, true, owner).await?)
    }

    /// Invites `user` and accepts on their behalf, then assigns `role`.
    pub(crate) async fn add_member(
        &self,
        team: &Team,
        owner: UserId,
        user: UserId,
        role: &str,
    ) -> eyre::Result<()> {
        let invitation = self
            .services
            .teams
            .invite_user(team.id(), owner, user)
            .await?;
        self.services
            .teams
            .accept_invitation(invitation.id(), user)
            .await?;
        if role != "regular" {
            self.services
                .teams
                .update_member_role(team.id(), user, role, owner)
                .await?;
        }
        Ok(())
    }
}
