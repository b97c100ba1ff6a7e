use model::entities::user;
use serde::Deserialize;
use std::fmt;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::error::{AccountsError, FieldError, FormErrors, Result};
use crate::store::AccountStore;
use crate::validation::validate_email_format;

pub const INVALID_LOGIN_MESSAGE: &str =
    "Please enter a correct email and password. Note that both fields may be case-sensitive.";

/// Login credentials. Values are used exactly as given, without trimming.
#[derive(Clone, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(
        length(min = 1, message = "This field is required."),
        custom(function = "validate_email_format")
    )]
    pub email: String,
    #[validate(length(min = 1, message = "This field is required."))]
    pub password: String,
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl LoginForm {
    /// Resolves the credentials to an active account.
    ///
    /// Field problems are reported per field. Credentials that match no
    /// active account produce a single non-field error.
    #[instrument(skip(self, store), fields(email = %self.email))]
    pub async fn authenticate(&self, store: &AccountStore) -> Result<user::Model> {
        if let Err(errors) = self.validate() {
            return Err(AccountsError::Validation(errors.into()));
        }

        match store.authenticate(&self.email, &self.password).await? {
            Some(user) => {
                info!("User {} authenticated", user.id);
                Ok(user)
            }
            None => {
                warn!("Rejected login attempt");
                let mut errors = FormErrors::new();
                errors.add_non_field(FieldError::new("invalid_login", INVALID_LOGIN_MESSAGE));
                Err(AccountsError::Validation(errors))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NON_FIELD_ERRORS;
    use crate::testing::{insert_user, setup_store, PASSWORD};
    use sea_orm::{ActiveModelTrait, Set};

    fn login(email: &str, password: &str) -> LoginForm {
        LoginForm {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn assert_invalid_login(result: Result<user::Model>) {
        let error = result.unwrap_err();
        let errors = error.form_errors().expect("validation error");
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec![NON_FIELD_ERRORS]);
        assert_eq!(errors.non_field_errors()[0].message, INVALID_LOGIN_MESSAGE);
    }

    #[tokio::test]
    async fn test_login_with_correct_credentials() {
        let store = setup_store().await;
        let user = insert_user(&store, "alice", "a@x.com").await;

        let found = login("a@x.com", PASSWORD).authenticate(&store).await.unwrap();
        assert_eq!(found.id, user.id);
    }

    #[tokio::test]
    async fn test_failures_share_one_message() {
        let store = setup_store().await;
        let user = insert_user(&store, "alice", "a@x.com").await;

        assert_invalid_login(login("a@x.com", "wrong-password").authenticate(&store).await);
        assert_invalid_login(login("bob@x.com", PASSWORD).authenticate(&store).await);

        let mut active: user::ActiveModel = user.into();
        active.is_active = Set(false);
        active.update(store.connection()).await.unwrap();
        assert_invalid_login(login("a@x.com", PASSWORD).authenticate(&store).await);
    }

    #[tokio::test]
    async fn test_missing_fields_are_field_errors() {
        let store = setup_store().await;

        let error = login("", "").authenticate(&store).await.unwrap_err();

        let errors = error.form_errors().unwrap();
        assert!(errors.has_errors("email"));
        assert!(errors.has_errors("password"));
        assert!(errors.non_field_errors().is_empty());
    }

    #[tokio::test]
    async fn test_email_is_not_trimmed() {
        let store = setup_store().await;
        insert_user(&store, "alice", "a@x.com").await;

        let error = login(" a@x.com", PASSWORD).authenticate(&store).await.unwrap_err();
        assert!(error.form_errors().unwrap().has_code("email", "invalid"));
    }
}
