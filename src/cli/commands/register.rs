use accounts::{CompanySignUpForm, CustomerSignUpForm};
use chrono::NaiveDate;
use tracing::{error, info, instrument, trace, warn};

use crate::config::AppState;
use crate::schemas::{ApiResponse, CommandResult, ErrorResponse, RegistrationResponse, UserResponse};

/// Sign up a customer. The user and its customer record are written together or not at all.
#[instrument(skip(state, password1, password2))]
pub async fn register_customer(
    state: &AppState,
    username: String,
    email: String,
    date_of_birth: Option<NaiveDate>,
    password1: String,
    password2: String,
) -> CommandResult<RegistrationResponse> {
    trace!("Entering register_customer function");

    let form = CustomerSignUpForm {
        username,
        email,
        date_of_birth,
        password1,
        password2,
    };

    match form.save(&state.store, &state.policy).await {
        Ok(registration) => {
            info!(
                "Customer registered with user ID: {}, username: {}",
                registration.user.id, registration.user.username
            );
            Ok(ApiResponse::ok(registration.into(), "Customer registered successfully"))
        }
        Err(e) => {
            match e.form_errors() {
                Some(errors) => warn!("Customer sign-up rejected: {}", errors),
                None => error!("Failed to register customer: {}", e),
            }
            Err(ErrorResponse::from(e))
        }
    }
}

/// Sign up a company user.
#[instrument(skip(state, password1, password2))]
pub async fn register_company(
    state: &AppState,
    username: String,
    password1: String,
    password2: String,
) -> CommandResult<UserResponse> {
    trace!("Entering register_company function");

    let form = CompanySignUpForm {
        username,
        password1,
        password2,
    };

    match form.save(&state.store, &state.policy).await {
        Ok(user) => {
            info!("Company user registered with ID: {}, username: {}", user.id, user.username);
            Ok(ApiResponse::ok(user.into(), "Company registered successfully"))
        }
        Err(e) => {
            match e.form_errors() {
                Some(errors) => warn!("Company sign-up rejected: {}", errors),
                None => error!("Failed to register company: {}", e),
            }
            Err(ErrorResponse::from(e))
        }
    }
}
