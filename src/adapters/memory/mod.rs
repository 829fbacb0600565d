//! In-memory adapters for tests and embedding.

mod store;
mod task;
mod team;
mod token;
mod user;

pub use store::InMemoryStore;
