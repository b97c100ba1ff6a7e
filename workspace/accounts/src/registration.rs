//! Customer and company sign-up.
//!
//! Both forms run the same identity rules (username, password pair, password
//! policy). Customer sign-up additionally checks the email and writes the
//! user and customer rows in one transaction.

use chrono::NaiveDate;
use model::entities::{customer, user};
use serde::Deserialize;
use std::fmt;
use tracing::{debug, error, info, instrument, trace, warn};
use validator::Validate;

use crate::error::{AccountsError, FieldError, FormErrors, Result};
use crate::password::{hash_password, PasswordPolicy, UserAttributes};
use crate::store::{AccountStore, NewUser};
use crate::validation::{
    collect, validate_email_format, validate_email_unique, validate_username,
    validate_username_unique,
};

pub const PASSWORD_MISMATCH_MESSAGE: &str = "The two password fields didn't match.";

/// Checks shared by every sign-up form. Appends to `errors`.
async fn check_identity(
    store: &AccountStore,
    policy: &PasswordPolicy,
    username: &str,
    email: &str,
    password1: &str,
    password2: &str,
    errors: &mut FormErrors,
) -> Result<()> {
    if !username.is_empty() && !errors.has_errors("username") {
        collect(validate_username_unique(store, username).await, errors)?;
    }

    // Strength is only judged once both entries agree.
    if !password1.is_empty() && !password2.is_empty() {
        if password1 != password2 {
            errors.add(
                "password2",
                FieldError::new("password_mismatch", PASSWORD_MISMATCH_MESSAGE),
            );
        } else {
            let attributes = UserAttributes { username, email };
            for message in policy.validate(password2, &attributes) {
                errors.add("password2", FieldError::new("password_policy", message));
            }
        }
    }
    Ok(())
}

fn field_errors<T: Validate>(form: &T) -> FormErrors {
    match form.validate() {
        Ok(()) => FormErrors::new(),
        Err(errors) => errors.into(),
    }
}

/// Sign-up input for a customer account.
#[derive(Clone, Deserialize, Validate)]
pub struct CustomerSignUpForm {
    #[validate(
        length(min = 1, message = "This field is required."),
        custom(function = "validate_username")
    )]
    pub username: String,
    #[validate(
        length(min = 1, message = "This field is required."),
        custom(function = "validate_email_format")
    )]
    pub email: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[validate(length(min = 1, message = "This field is required."))]
    pub password1: String,
    #[validate(length(min = 1, message = "This field is required."))]
    pub password2: String,
}

impl fmt::Debug for CustomerSignUpForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomerSignUpForm")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("date_of_birth", &self.date_of_birth)
            .finish_non_exhaustive()
    }
}

/// The records written by a successful customer sign-up.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRegistration {
    pub user: user::Model,
    pub customer: customer::Model,
}

impl CustomerSignUpForm {
    /// Text fields lose surrounding whitespace; passwords are kept verbatim.
    fn cleaned(mut self) -> Self {
        self.username = self.username.trim().to_string();
        self.email = self.email.trim().to_string();
        self
    }

    /// Cleans a copy of the input, then runs every rule and collects all
    /// failures. Writes nothing.
    pub async fn full_clean(&self, store: &AccountStore, policy: &PasswordPolicy) -> Result<()> {
        self.clone().cleaned().check(store, policy).await
    }

    #[instrument(skip(self, store, policy))]
    async fn check(&self, store: &AccountStore, policy: &PasswordPolicy) -> Result<()> {
        trace!("Validating customer sign-up for username: {}", self.username);
        let mut errors = field_errors(self);

        check_identity(
            store,
            policy,
            &self.username,
            &self.email,
            &self.password1,
            &self.password2,
            &mut errors,
        )
        .await?;

        if !self.email.is_empty() && !errors.has_errors("email") {
            collect(validate_email_unique(store, &self.email).await, &mut errors)?;
        }

        if !errors.is_empty() {
            warn!(
                "Customer sign-up rejected; invalid fields: {}",
                errors.fields().collect::<Vec<_>>().join(", ")
            );
        }
        errors.into_result()
    }

    /// Validates, then creates the user (`is_customer = true`) and its
    /// customer row atomically. Either both rows exist afterwards or neither.
    #[instrument(skip(self, store, policy))]
    pub async fn save(self, store: &AccountStore, policy: &PasswordPolicy) -> Result<CustomerRegistration> {
        let form = self.cleaned();
        form.check(store, policy).await?;

        debug!("Hashing password for {}", form.username);
        let password_hash = hash_password(&form.password1)?;

        let txn = store.begin().await?;
        let user = AccountStore::insert_user(
            &txn,
            NewUser {
                username: form.username.clone(),
                email: form.email.clone(),
                password_hash,
                is_customer: true,
                is_company: false,
            },
        )
        .await
        .inspect_err(|e| error!("Failed to create user '{}': {}", form.username, e))?;

        let customer = AccountStore::insert_customer(&txn, user.id, form.date_of_birth)
            .await
            .inspect_err(|e| {
                error!("Failed to create customer profile for '{}': {}", form.username, e)
            })?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit customer sign-up for '{}': {}", form.username, e);
            AccountsError::from(e)
        })?;

        info!(
            "Customer registered with ID: {}, username: {}",
            user.id, user.username
        );
        Ok(CustomerRegistration { user, customer })
    }
}

/// Sign-up input for a company account.
///
/// Only the identity rules run. The created user gets no email, neither role
/// flag is set and no company row is attached.
#[derive(Clone, Deserialize, Validate)]
pub struct CompanySignUpForm {
    #[validate(
        length(min = 1, message = "This field is required."),
        custom(function = "validate_username")
    )]
    pub username: String,
    #[validate(length(min = 1, message = "This field is required."))]
    pub password1: String,
    #[validate(length(min = 1, message = "This field is required."))]
    pub password2: String,
}

impl fmt::Debug for CompanySignUpForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompanySignUpForm")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl CompanySignUpForm {
    fn cleaned(mut self) -> Self {
        self.username = self.username.trim().to_string();
        self
    }

    /// Cleans a copy of the input, then runs every rule and collects all
    /// failures. Writes nothing.
    pub async fn full_clean(&self, store: &AccountStore, policy: &PasswordPolicy) -> Result<()> {
        self.clone().cleaned().check(store, policy).await
    }

    #[instrument(skip(self, store, policy))]
    async fn check(&self, store: &AccountStore, policy: &PasswordPolicy) -> Result<()> {
        trace!("Validating company sign-up for username: {}", self.username);
        let mut errors = field_errors(self);

        check_identity(
            store,
            policy,
            &self.username,
            "",
            &self.password1,
            &self.password2,
            &mut errors,
        )
        .await?;

        if !errors.is_empty() {
            warn!(
                "Company sign-up rejected; invalid fields: {}",
                errors.fields().collect::<Vec<_>>().join(", ")
            );
        }
        errors.into_result()
    }

    #[instrument(skip(self, store, policy))]
    pub async fn save(self, store: &AccountStore, policy: &PasswordPolicy) -> Result<user::Model> {
        let form = self.cleaned();
        form.check(store, policy).await?;

        let password_hash = hash_password(&form.password1)?;
        let user = AccountStore::insert_user(
            store.connection(),
            NewUser {
                username: form.username.clone(),
                email: String::new(),
                password_hash,
                is_customer: false,
                is_company: false,
            },
        )
        .await
        .inspect_err(|e| error!("Failed to create user '{}': {}", form.username, e))?;

        info!(
            "Company user registered with ID: {}, username: {}",
            user.id, user.username
        );
        Ok(user)
    }
}
