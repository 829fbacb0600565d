//! Service-level error vocabulary.
//!
//! Every service operation returns [`ServiceResult`]. Callers branch on the
//! variant: [`ServiceError::Validation`] carries per-field messages, the
//! domain variants name a specific refusal, and the infrastructure variants
//! (see [`ServiceError::is_infrastructure`]) report system failures whose
//! details must not reach end users.

use crate::domain::TaskTransitionError;
use crate::ports::{
    PasswordHashError, TaskRepositoryError, TeamRepositoryError, TokenRepositoryError,
    UserRepositoryError,
};
use crate::validation::{EMAIL_FIELD, USERNAME_FIELD, Validator, field_error};
use std::sync::Arc;
use thiserror::Error;

/// Field name used for team names.
pub(crate) const TEAM_NAME_FIELD: &str = "name";

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors returned by service operations.
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    /// One or more input fields failed validation.
    #[error("validation failed: {0}")]
    Validation(Validator),

    /// The requested record does not exist or is not visible to the caller.
    #[error("no matching records found")]
    NotFound,

    /// The caller lacks the role or relationship the operation requires.
    #[error("permission denied")]
    PermissionDenied,

    /// The record changed since it was read.
    #[error("edit conflict")]
    EditConflict,

    /// The invitee already has a pending invitation to the team.
    #[error("invitation already exists")]
    InvitationExists,

    /// The invitee already belongs to the team.
    #[error("user is already a team member")]
    AlreadyMember,

    /// The team owner cannot be removed.
    #[error("cannot remove the team owner")]
    CannotRemoveTeamOwner,

    /// The team owner cannot change their own role.
    #[error("cannot change the owner role")]
    CannotChangeOwnerRole,

    /// The task status does not allow the requested transition.
    #[error("task status conflict")]
    TaskStatusConflict,

    /// The task due time has passed.
    #[error("task is overdue")]
    TaskOverdue,

    /// A store operation failed.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),

    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    PasswordHash(Arc<dyn std::error::Error + Send + Sync>),

    /// The random source could not produce token bytes.
    #[error("token generation failed: {0}")]
    TokenGeneration(Arc<dyn std::error::Error + Send + Sync>),

    /// A store operation did not finish within the configured deadline.
    #[error("store operation exceeded its deadline")]
    DeadlineExceeded,
}

impl ServiceError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Returns `true` for system failures as opposed to refusals the caller
    /// can act on.
    #[must_use]
    pub const fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Self::Persistence(_)
                | Self::PasswordHash(_)
                | Self::TokenGeneration(_)
                | Self::DeadlineExceeded
        )
    }

    /// Returns the field errors of a validation failure.
    #[must_use]
    pub const fn validation(&self) -> Option<&Validator> {
        match self {
            Self::Validation(validator) => Some(validator),
            _ => None,
        }
    }

    /// Returns a message safe to show to end users.
    #[must_use]
    pub const fn public_message(&self) -> &'static str {
        match self {
            Self::Validation(_) => "The request contains invalid fields.",
            Self::NotFound => "The requested resource could not be found.",
            Self::PermissionDenied => "You do not have permission to perform this action.",
            Self::EditConflict => {
                "Unable to update the record due to an edit conflict, please try again."
            }
            Self::InvitationExists => "The user has already been invited to this team.",
            Self::AlreadyMember => "The user is already a member of this team.",
            Self::CannotRemoveTeamOwner => "The team owner cannot be removed from the team.",
            Self::CannotChangeOwnerRole => "The team owner cannot change their own role.",
            Self::TaskStatusConflict => "The task cannot be moved to the requested status.",
            Self::TaskOverdue => "The task is overdue.",
            Self::Persistence(_)
            | Self::PasswordHash(_)
            | Self::TokenGeneration(_)
            | Self::DeadlineExceeded => {
                "The server encountered a problem and could not process your request."
            }
        }
    }
}

impl From<Validator> for ServiceError {
    fn from(validator: Validator) -> Self {
        Self::Validation(validator)
    }
}

impl From<PasswordHashError> for ServiceError {
    fn from(err: PasswordHashError) -> Self {
        Self::PasswordHash(err.0)
    }
}

impl From<TaskTransitionError> for ServiceError {
    fn from(err: TaskTransitionError) -> Self {
        match err {
            TaskTransitionError::NotPermitted { .. } => Self::PermissionDenied,
            TaskTransitionError::Overdue(_) => Self::TaskOverdue,
            TaskTransitionError::StatusConflict { .. } => Self::TaskStatusConflict,
        }
    }
}

impl From<UserRepositoryError> for ServiceError {
    fn from(err: UserRepositoryError) -> Self {
        match err {
            UserRepositoryError::DuplicateUsername(_) => Self::Validation(field_error(
                USERNAME_FIELD,
                "A user with this username already exists.",
            )),
            UserRepositoryError::DuplicateEmail(_) => Self::Validation(field_error(
                EMAIL_FIELD,
                "A user with this email address already exists.",
            )),
            UserRepositoryError::EditConflict(_) => Self::EditConflict,
            UserRepositoryError::Persistence(source) => Self::Persistence(source),
        }
    }
}

impl From<TokenRepositoryError> for ServiceError {
    fn from(err: TokenRepositoryError) -> Self {
        match err {
            TokenRepositoryError::UnknownRecipient(_) => Self::NotFound,
            TokenRepositoryError::Persistence(source) => Self::Persistence(source),
        }
    }
}

impl From<TeamRepositoryError> for ServiceError {
    fn from(err: TeamRepositoryError) -> Self {
        match err {
            TeamRepositoryError::DuplicateTeamName(_) => Self::Validation(field_error(
                TEAM_NAME_FIELD,
                "A team with this name already exists.",
            )),
            TeamRepositoryError::DuplicateInvitation { .. } => Self::InvitationExists,
            TeamRepositoryError::DuplicateMembership { .. } => Self::AlreadyMember,
            TeamRepositoryError::TeamNotFound(_)
            | TeamRepositoryError::MembershipNotFound { .. }
            | TeamRepositoryError::InvitationNotFound(_) => Self::NotFound,
            TeamRepositoryError::EditConflict(_) => Self::EditConflict,
            TeamRepositoryError::Persistence(source) => Self::Persistence(source),
        }
    }
}

impl From<TaskRepositoryError> for ServiceError {
    fn from(err: TaskRepositoryError) -> Self {
        match err {
            TaskRepositoryError::EditConflict(_) => Self::EditConflict,
            TaskRepositoryError::DuplicateTask(id) => {
                Self::persistence(std::io::Error::other(format!("duplicate task identifier: {id}")))
            }
            TaskRepositoryError::Persistence(source) => Self::Persistence(source),
        }
    }
}
