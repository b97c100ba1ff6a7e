use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use validator::ValidationErrors;

/// Key under which errors that belong to no single field are collected.
pub const NON_FIELD_ERRORS: &str = "__all__";

/// A single problem with a submitted value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Stable machine readable code, e.g. `duplicate_email`.
    pub code: String,
    /// Human readable message.
    pub message: String,
}

impl FieldError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Errors of a rejected form, keyed by field name.
///
/// Every check runs and appends here; nothing short-circuits, so the caller
/// sees all problems at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<FieldError>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, error: FieldError) {
        self.0.entry(field.into()).or_default().push(error);
    }

    pub fn add_non_field(&mut self, error: FieldError) {
        self.add(NON_FIELD_ERRORS, error);
    }

    pub fn merge(&mut self, other: FormErrors) {
        for (field, errors) in other.0 {
            self.0.entry(field).or_default().extend(errors);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has_errors(&self, field: &str) -> bool {
        self.0.get(field).is_some_and(|errors| !errors.is_empty())
    }

    pub fn get(&self, field: &str) -> &[FieldError] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `field` carries an error with the given code.
    pub fn has_code(&self, field: &str, code: &str) -> bool {
        self.get(field).iter().any(|error| error.code == code)
    }

    pub fn non_field_errors(&self) -> &[FieldError] {
        self.get(NON_FIELD_ERRORS)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(())` when nothing was collected, otherwise a validation error.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AccountsError::Validation(self))
        }
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut form_errors = FormErrors::new();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({}).", error.code));
                form_errors.add(field.to_string(), FieldError::new(error.code.to_string(), message));
            }
        }
        form_errors
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, errors) in &self.0 {
            for error in errors {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", field, error.message)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Error types for the accounts crate
#[derive(Error, Debug)]
pub enum AccountsError {
    /// Submitted values were rejected; nothing was written
    #[error("Validation failed: {0}")]
    Validation(FormErrors),

    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// The password hasher failed
    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    /// A referenced record does not exist
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AccountsError {
    /// The collected form errors, if this is a validation failure.
    pub fn form_errors(&self) -> Option<&FormErrors> {
        match self {
            AccountsError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Type alias for Result with AccountsError
pub type Result<T> = std::result::Result<T, AccountsError>;
