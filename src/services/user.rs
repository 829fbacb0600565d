//! Registration, authentication and account updates.

use crate::config::ServiceConfig;
use crate::deadline::with_deadline;
use crate::domain::{PasswordHash, User};
use crate::error::{ServiceError, ServiceResult};
use crate::ports::{PasswordHasher, UserRepository};
use crate::validation::{
    PASSWORD_FIELD, USERNAME_FIELD, Validator, validate_email, validate_handle, validate_password,
};
use std::sync::Arc;
use std::time::Duration;

/// User account service.
#[derive(Clone)]
pub struct UserService<R, H>
where
    R: UserRepository,
    H: PasswordHasher + 'static,
{
    repository: Arc<R>,
    hasher: Arc<H>,
    store_timeout: Option<Duration>,
}

impl<R, H> UserService<R, H>
where
    R: UserRepository,
    H: PasswordHasher + 'static,
{
    /// Creates a user service.
    #[must_use]
    pub const fn new(repository: Arc<R>, hasher: Arc<H>, config: &ServiceConfig) -> Self {
        Self {
            repository,
            hasher,
            store_timeout: config.store_timeout,
        }
    }

    /// Registers a new, unverified user.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Validation`] for malformed input or when the
    /// username or e-mail address is already registered, and an
    /// infrastructure error when hashing or storage fails.
    #[tracing::instrument(name = "register_user", skip_all, err)]
    pub async fn register_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> ServiceResult<User> {
        let mut validator = Validator::new();
        validate_handle(&mut validator, username, USERNAME_FIELD);
        validate_email(&mut validator, email);
        validate_password(&mut validator, password, PASSWORD_FIELD);
        validator.finish()?;

        let password_hash = self.hash_password(password).await?;
        let user = User::new(username, email, password_hash);
        with_deadline(self.store_timeout, self.repository.insert(&user)).await?;

        tracing::info!(user_id = %user.id(), "user registered");
        Ok(user)
    }

    /// Looks up a user by e-mail address.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Validation`] for a malformed address and
    /// [`ServiceError::NotFound`] when no user has it.
    #[tracing::instrument(name = "get_user_by_email", skip_all, err)]
    pub async fn get_user_by_email(&self, email: &str) -> ServiceResult<User> {
        let mut validator = Validator::new();
        validate_email(&mut validator, email);
        validator.finish()?;

        with_deadline(self.store_timeout, self.repository.find_by_email(email))
            .await?
            .ok_or(ServiceError::NotFound)
    }

    /// Looks up a user by username.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] when no user has the username.
    #[tracing::instrument(name = "get_user_by_username", skip_all, err)]
    pub async fn get_user_by_username(&self, username: &str) -> ServiceResult<User> {
        with_deadline(
            self.store_timeout,
            self.repository.find_by_username(username),
        )
            .await?
            .ok_or(ServiceError::NotFound)
    }

    /// Authenticates a user by e-mail address and password.
    ///
    /// An unknown address and a wrong password both yield
    /// [`ServiceError::NotFound`], after comparable hashing work.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Validation`] for malformed input,
    /// [`ServiceError::NotFound`] when the credentials do not match, and an
    /// infrastructure error when hashing or storage fails.
    #[tracing::instrument(name = "get_user_by_email_and_password", skip_all, err)]
    pub async fn get_user_by_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> ServiceResult<User> {
        let mut validator = Validator::new();
        validate_email(&mut validator, email);
        validate_password(&mut validator, password, PASSWORD_FIELD);
        validator.finish()?;

        let found = with_deadline(self.store_timeout, self.repository.find_by_email(email)).await?;
        let Some(user) = found else {
            self.equalize_timing(password).await;
            return Err(ServiceError::NotFound);
        };

        let stored_hash = user.password_hash();
        if !self.verify_password(password, stored_hash).await? {
            return Err(ServiceError::NotFound);
        }
        Ok(user)
    }

    /// Marks the user's e-mail address as verified.
    ///
    /// Returns the updated user; `user` itself is not modified.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::EditConflict`] when the stored user changed
    /// since `user` was read.
    #[tracing::instrument(name = "verify_user", skip_all, fields(user_id = %user.id()), err)]
    pub async fn verify_user(&self, user: &User) -> ServiceResult<User> {
        let mut updated = user.clone();
        updated.mark_verified();
        let version = with_deadline(self.store_timeout, self.repository.update(&updated)).await?;
        Ok(updated.with_version(version))
    }

    /// Replaces the user's password.
    ///
    /// Returns the updated user; `user` itself is not modified.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Validation`] for a malformed password,
    /// [`ServiceError::EditConflict`] when the stored user changed since
    /// `user` was read, and an infrastructure error when hashing or storage
    /// fails.
    #[tracing::instrument(
        name = "reset_user_password",
        skip_all,
        fields(user_id = %user.id()),
        err
    )]
    pub async fn reset_user_password(
        &self,
        user: &User,
        new_password: &str,
    ) -> ServiceResult<User> {
        let mut validator = Validator::new();
        validate_password(&mut validator, new_password, PASSWORD_FIELD);
        validator.finish()?;

        let mut updated = user.clone();
        updated.set_password_hash(self.hash_password(new_password).await?);
        let version = with_deadline(self.store_timeout, self.repository.update(&updated)).await?;
        Ok(updated.with_version(version))
    }

    async fn hash_password(&self, password: &str) -> ServiceResult<PasswordHash> {
        let hasher = Arc::clone(&self.hasher);
        let owned_password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash(&owned_password))
            .await
            .map_err(|err| ServiceError::PasswordHash(Arc::new(err)))?
            .map_err(ServiceError::from)
    }

    async fn verify_password(&self, password: &str, hash: &PasswordHash) -> ServiceResult<bool> {
        let hasher = Arc::clone(&self.hasher);
        let owned_password = password.to_owned();
        let owned_hash = hash.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&owned_password, &owned_hash))
            .await
            .map_err(|err| ServiceError::PasswordHash(Arc::new(err)))?
            .map_err(ServiceError::from)
    }

    async fn equalize_timing(&self, password: &str) {
        let hasher = Arc::clone(&self.hasher);
        let owned_password = password.to_owned();
        let dummy = tokio::task::spawn_blocking(move || hasher.verify_dummy(&owned_password));
        if let Err(err) = dummy.await {
            tracing::debug!(error = %err, "dummy password verification did not complete");
        }
    }
}
