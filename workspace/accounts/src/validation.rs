//! Field rules shared by the account forms.
//!
//! The synchronous rules plug into `validator` derives via
//! `custom(function = ...)`. The uniqueness rules need the store and run
//! after the derive.

use std::borrow::Cow;

use tracing::{debug, instrument};
use validator::{ValidateEmail, ValidationError};

use crate::error::{AccountsError, FieldError, FormErrors, Result};
use crate::store::AccountStore;

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const USERNAME_MAX_LEN: usize = 150;
pub const EMAIL_MAX_LEN: usize = 100;

fn too_long(value: &str, max: usize) -> ValidationError {
    ValidationError::new("max_length").with_message(Cow::Owned(format!(
        "Ensure this value has at most {} characters (it has {}).",
        max,
        value.chars().count()
    )))
}

/// Letters, digits and `@ . + - _` only, at most 150 characters.
/// Empty values pass; "required" is a separate rule.
pub fn validate_username(username: &str) -> std::result::Result<(), ValidationError> {
    if username.chars().count() > USERNAME_MAX_LEN {
        return Err(too_long(username, USERNAME_MAX_LEN));
    }
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_');
    if !username.chars().all(allowed) {
        return Err(ValidationError::new("invalid").with_message(Cow::Borrowed(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        )));
    }
    Ok(())
}

/// Well-formed address of at most 100 characters. Empty values pass.
pub fn validate_email_format(email: &str) -> std::result::Result<(), ValidationError> {
    if email.is_empty() {
        return Ok(());
    }
    if !email.validate_email() {
        return Err(ValidationError::new("invalid")
            .with_message(Cow::Borrowed("Enter a valid email address.")));
    }
    if email.chars().count() > EMAIL_MAX_LEN {
        return Err(too_long(email, EMAIL_MAX_LEN));
    }
    Ok(())
}

/// Fails with a `duplicate_email` error on the `email` field when any user
/// already has exactly this address. Read-only.
#[instrument(skip(store))]
pub async fn validate_email_unique(store: &AccountStore, email: &str) -> Result<()> {
    if store.email_exists(email).await? {
        debug!("Email is already registered");
        let mut errors = FormErrors::new();
        errors.add(
            "email",
            FieldError::new("duplicate_email", format!("{} is already taken.", email)),
        );
        return Err(AccountsError::Validation(errors));
    }
    Ok(())
}

/// Fails with a `unique` error on the `username` field when the name is taken.
#[instrument(skip(store))]
pub async fn validate_username_unique(store: &AccountStore, username: &str) -> Result<()> {
    if store.username_exists(username).await? {
        debug!("Username is already registered");
        let mut errors = FormErrors::new();
        errors.add(
            "username",
            FieldError::new("unique", "A user with that username already exists."),
        );
        return Err(AccountsError::Validation(errors));
    }
    Ok(())
}

/// Folds a validation failure into `errors`; any other error is returned.
pub(crate) fn collect(result: Result<()>, errors: &mut FormErrors) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(AccountsError::Validation(found)) => {
            errors.merge(found);
            Ok(())
        }
        Err(other) => Err(other),
    }
}
