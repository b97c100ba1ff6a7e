use accounts::NewCompany;
use model::entities::company::ServiceCategory;
use tracing::{debug, error, info, instrument, trace, warn};

use crate::config::AppState;
use crate::schemas::{
    ApiResponse, CommandResult, CompanyResponse, ErrorResponse, UserDetailResponse, UserResponse,
};

/// List all users
#[instrument(skip(state))]
pub async fn list_users(state: &AppState) -> CommandResult<Vec<UserResponse>> {
    trace!("Entering list_users function");

    match state.store.list_users().await {
        Ok(users) => {
            debug!("Retrieved {} users", users.len());
            let responses = users.into_iter().map(UserResponse::from).collect();
            Ok(ApiResponse::ok(responses, "Users retrieved successfully"))
        }
        Err(e) => {
            error!("Failed to retrieve users: {}", e);
            Err(ErrorResponse::from(e))
        }
    }
}

/// Show a user with its customer and company records, when present
#[instrument(skip(state))]
pub async fn show_user(state: &AppState, user_id: i32) -> CommandResult<UserDetailResponse> {
    trace!("Entering show_user function");

    let lookup = async {
        let user = state.store.find_user(user_id).await?;
        let customer = state.store.customer_profile(user_id).await?;
        let company = state.store.company_profile(user_id).await?;
        Ok::<_, accounts::AccountsError>((user, customer, company))
    };

    match lookup.await {
        Ok((Some(user), customer, company)) => {
            debug!("Found user {}", user.id);
            Ok(ApiResponse::ok(
                UserDetailResponse::new(user, customer, company),
                "User retrieved successfully",
            ))
        }
        Ok((None, _, _)) => {
            warn!("User with ID {} not found", user_id);
            Err(ErrorResponse::new(
                format!("User with ID {} not found", user_id),
                "NOT_FOUND",
            ))
        }
        Err(e) => {
            error!("Failed to retrieve user {}: {}", user_id, e);
            Err(ErrorResponse::from(e))
        }
    }
}

/// Delete a user. The database removes its role records with it.
#[instrument(skip(state))]
pub async fn delete_user(state: &AppState, user_id: i32) -> CommandResult<()> {
    trace!("Entering delete_user function");

    match state.store.delete_user(user_id).await {
        Ok(true) => {
            info!("User {} deleted", user_id);
            Ok(ApiResponse::ok((), "User deleted successfully"))
        }
        Ok(false) => {
            warn!("User with ID {} not found", user_id);
            Err(ErrorResponse::new(
                format!("User with ID {} not found", user_id),
                "NOT_FOUND",
            ))
        }
        Err(e) => {
            error!("Failed to delete user {}: {}", user_id, e);
            Err(ErrorResponse::from(e))
        }
    }
}

/// Attach a company record to an existing user
#[instrument(skip(state))]
pub async fn add_company_profile(
    state: &AppState,
    user_id: i32,
    field: ServiceCategory,
    rating: i32,
) -> CommandResult<CompanyResponse> {
    trace!("Entering add_company_profile function");

    match state.store.create_company(user_id, NewCompany { field, rating }).await {
        Ok(profile) => {
            info!("Company profile created for {}", profile);
            Ok(ApiResponse::ok(profile.company.into(), "Company profile created successfully"))
        }
        Err(e) => {
            match e.form_errors() {
                Some(errors) => warn!("Company profile rejected: {}", errors),
                None => error!("Failed to create company profile for user {}: {}", user_id, e),
            }
            Err(ErrorResponse::from(e))
        }
    }
}
