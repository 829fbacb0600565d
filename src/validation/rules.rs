//! Shared field rules for usernames, team names, e-mail addresses and
//! passwords.

use super::Validator;
use regex::Regex;
use std::sync::LazyLock;

/// Field name used for usernames.
pub const USERNAME_FIELD: &str = "username";
/// Field name used for e-mail addresses.
pub const EMAIL_FIELD: &str = "email";
/// Field name used for passwords.
pub const PASSWORD_FIELD: &str = "password";

/// Maximum length in bytes of usernames and team names.
pub const HANDLE_MAX_LENGTH: usize = 32;
/// Minimum password length in bytes.
pub const PASSWORD_MIN_LENGTH: usize = 8;
/// Maximum password length in bytes, the bcrypt input limit.
pub const PASSWORD_MAX_LENGTH: usize = 72;

const HANDLE_PATTERN_MESSAGE: &str = "Must contain only alphanumeric characters or single hyphens, and must not begin or end with a hyphen.";

static EMAIL_REGEX: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~.-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$",
    )
    .ok()
});

/// Returns `true` for ASCII alphanumerics separated by single hyphens, with
/// no leading or trailing hyphen.
#[must_use]
pub fn is_valid_handle(value: &str) -> bool {
    if value.is_empty() || value.starts_with('-') || value.ends_with('-') {
        return false;
    }
    let mut previous_was_hyphen = false;
    for ch in value.chars() {
        if ch == '-' {
            if previous_was_hyphen {
                return false;
            }
            previous_was_hyphen = true;
        } else if ch.is_ascii_alphanumeric() {
            previous_was_hyphen = false;
        } else {
            return false;
        }
    }
    true
}

/// Returns `true` for a bare `local@domain` address.
///
/// Display names, comments and quoted local parts are rejected, as are local
/// parts with leading, trailing or consecutive dots.
#[must_use]
pub fn is_valid_email(value: &str) -> bool {
    let Some(regex) = EMAIL_REGEX.as_ref() else {
        return false;
    };
    if !regex.is_match(value) {
        return false;
    }
    let local = value.split('@').next().unwrap_or_default();
    !local.starts_with('.') && !local.ends_with('.') && !local.contains("..")
}

/// Validates a username or team name under `field`.
pub fn validate_handle(validator: &mut Validator, value: &str, field: &str) {
    validator.check_non_empty(value, field);
    validator.check_max_len(value, HANDLE_MAX_LENGTH, field);
    validator.check(is_valid_handle(value), field, HANDLE_PATTERN_MESSAGE);
}

/// Validates an e-mail address under the `email` field.
pub fn validate_email(validator: &mut Validator, value: &str) {
    validator.check_non_empty(value, EMAIL_FIELD);
    validator.check_email(value, EMAIL_FIELD);
}

/// Validates a plaintext password under `field`.
pub fn validate_password(validator: &mut Validator, value: &str, field: &str) {
    validator.check_non_empty(value, field);
    validator.check_min_len(value, PASSWORD_MIN_LENGTH, field);
    validator.check_max_len(value, PASSWORD_MAX_LENGTH, field);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("alice", true)]
    #[case("team-alpha", true)]
    #[case("a1-b2-c3", true)]
    #[case("", false)]
    #[case("-alice", false)]
    #[case("alice-", false)]
    #[case("al--ice", false)]
    #[case("al_ice", false)]
    #[case("al ice", false)]
    #[case("álice", false)]
    fn handle_pattern(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(is_valid_handle(value), expected);
    }

    #[rstest]
    #[case("alice@example.com", true)]
    #[case("alice.smith+tasks@mail.example.org", true)]
    #[case("root@localhost", true)]
    #[case("", false)]
    #[case("alice", false)]
    #[case("alice@", false)]
    #[case("@example.com", false)]
    #[case("Alice <alice@example.com>", false)]
    #[case("alice@@example.com", false)]
    #[case(".alice@example.com", false)]
    #[case("al..ice@example.com", false)]
    #[case("alice@-example.com", false)]
    fn email_shape(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(is_valid_email(value), expected);
    }

    #[rstest]
    fn handle_reports_first_failure_only() {
        let mut validator = Validator::new();
        validate_handle(&mut validator, "", USERNAME_FIELD);
        assert_eq!(validator.error(USERNAME_FIELD), Some("Must be provided."));

        let mut long = Validator::new();
        validate_handle(&mut long, &"a".repeat(33), "name");
        assert_eq!(
            long.error("name"),
            Some("Must be no more than 32 bytes long.")
        );

        let mut pattern = Validator::new();
        validate_handle(&mut pattern, "bad--name", "name");
        assert_eq!(pattern.error("name"), Some(HANDLE_PATTERN_MESSAGE));
    }

    #[rstest]
    #[case("short", Some("Must be at least 8 bytes long."))]
    #[case("exactly8", None)]
    #[case(&"p".repeat(72), None)]
    #[case(&"p".repeat(73), Some("Must be no more than 72 bytes long."))]
    fn password_bounds(#[case] password: &str, #[case] expected: Option<&str>) {
        let mut validator = Validator::new();
        validate_password(&mut validator, password, PASSWORD_FIELD);
        assert_eq!(validator.error(PASSWORD_FIELD), expected);
    }
}
