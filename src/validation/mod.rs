//! Field-scoped validation of caller-supplied input.
//!
//! A [`Validator`] accumulates at most one message per field: the first failed
//! check for a field wins and later checks for the same field are ignored.
//! Services create a fresh validator for every call and hand it back to the
//! caller inside [`crate::error::ServiceError::Validation`] when any check
//! failed.
//!
//! # Examples
//!
//! ```
//! use tasktracker::validation::Validator;
//!
//! let mut validator = Validator::new();
//! validator.check(false, "name", "Must be provided.");
//! validator.check(false, "name", "Must be no more than 32 bytes long.");
//!
//! assert!(validator.has_errors());
//! assert_eq!(validator.error("name"), Some("Must be provided."));
//! ```

mod rules;

pub use rules::{
    EMAIL_FIELD, HANDLE_MAX_LENGTH, PASSWORD_FIELD, PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH,
    USERNAME_FIELD, is_valid_email, is_valid_handle, validate_email, validate_handle,
    validate_password,
};

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Message recorded when a required value is empty.
pub const MUST_BE_PROVIDED: &str = "Must be provided.";

/// Accumulates at most one error message per input field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Validator {
    errors: BTreeMap<String, String>,
}

impl Validator {
    /// Creates a validator with no recorded errors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` under `field` when `condition` is false and the field
    /// has no error yet.
    pub fn check(&mut self, condition: bool, field: &str, message: impl Into<String>) {
        if !condition {
            self.add_error(field, message);
        }
    }

    /// Records `message` under `field` unless the field already has an error.
    pub fn add_error(&mut self, field: &str, message: impl Into<String>) {
        if !self.errors.contains_key(field) {
            self.errors.insert(field.to_owned(), message.into());
        }
    }

    /// Requires a non-empty string.
    pub fn check_non_empty(&mut self, value: &str, field: &str) {
        self.check(!value.is_empty(), field, MUST_BE_PROVIDED);
    }

    /// Requires a string of at most `max` bytes.
    pub fn check_max_len(&mut self, value: &str, max: usize, field: &str) {
        self.check(
            value.len() <= max,
            field,
            format!("Must be no more than {max} bytes long."),
        );
    }

    /// Requires a string of at least `min` bytes.
    pub fn check_min_len(&mut self, value: &str, min: usize, field: &str) {
        self.check(
            value.len() >= min,
            field,
            format!("Must be at least {min} bytes long."),
        );
    }

    /// Requires `value >= threshold`.
    pub fn check_at_least(&mut self, value: u32, threshold: u32, field: &str) {
        self.check(
            value >= threshold,
            field,
            format!("Must be greater than or equal to {threshold}."),
        );
    }

    /// Requires `value <= threshold`.
    pub fn check_at_most(&mut self, value: u32, threshold: u32, field: &str) {
        self.check(
            value <= threshold,
            field,
            format!("Must be less than or equal to {threshold}."),
        );
    }

    /// Requires a syntactically valid bare e-mail address.
    pub fn check_email(&mut self, value: &str, field: &str) {
        self.check(
            is_valid_email(value),
            field,
            "Must be a valid email address.",
        );
    }

    /// Returns `true` when at least one field has an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns the message recorded for `field`, if any.
    #[must_use]
    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    /// Returns every recorded field error, ordered by field name.
    #[must_use]
    pub const fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    /// Converts the accumulated state into a result.
    ///
    /// # Errors
    ///
    /// Returns the validator itself when any error has been recorded.
    pub fn finish(self) -> Result<(), Self> {
        if self.has_errors() {
            return Err(self);
        }
        Ok(())
    }
}

impl fmt::Display for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .errors
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

impl std::error::Error for Validator {}

/// Builds a validator carrying a single field error.
#[must_use]
pub fn field_error(field: &str, message: impl Into<String>) -> Validator {
    let mut validator = Validator::new();
    validator.add_error(field, message);
    validator
}
