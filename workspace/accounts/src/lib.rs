//! Account workflows: sign-up, login and the store they run against.
//!
//! Callers hand in already-parsed field values (one of the form structs) and
//! get back either the stored account or a field-keyed [`FormErrors`] map.

pub mod authentication;
pub mod error;
pub mod password;
pub mod registration;
pub mod store;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use authentication::LoginForm;
pub use error::{AccountsError, FieldError, FormErrors, Result, NON_FIELD_ERRORS};
pub use password::{PasswordPolicy, PasswordPolicyConfig};
pub use registration::{CompanySignUpForm, CustomerRegistration, CustomerSignUpForm};
pub use store::{AccountStore, CompanyProfile, CustomerProfile, NewCompany};
