//! Tasktracker: domain services for a multi-tenant task tracker.
//!
//! Users register and authenticate, organise into teams with ranked roles,
//! invite one another, and track tasks through a small lifecycle. This crate
//! holds the service layer only; transport and durable storage live outside
//! it and plug in through the repository ports.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Entities, roles and the task state machine
//! - **Ports**: Repository and password hashing traits
//! - **Adapters**: An in-memory store and a bcrypt hasher
//! - **Services**: Validation, authorization and optimistic concurrency
//!
//! # Modules
//!
//! - [`validation`]: Field-scoped input validation
//! - [`domain`]: Users, tokens, teams, memberships, invitations and tasks
//! - [`services`]: User, token, team and task services
//! - [`error`]: The [`error::ServiceError`] vocabulary

pub mod adapters;
pub mod config;
pub mod deadline;
pub mod domain;
pub mod error;
pub mod pagination;
pub mod ports;
pub mod services;
pub mod validation;

#[cfg(test)]
mod tests;
