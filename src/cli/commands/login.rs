use accounts::LoginForm;
use tracing::{error, info, instrument, trace, warn};

use crate::config::AppState;
use crate::schemas::{ApiResponse, CommandResult, ErrorResponse, UserResponse};

/// Check credentials; on success the user's `last_login` is updated.
#[instrument(skip(state, password))]
pub async fn login(state: &AppState, email: String, password: String) -> CommandResult<UserResponse> {
    trace!("Entering login function");

    let form = LoginForm { email, password };
    let user = match form.authenticate(&state.store).await {
        Ok(user) => user,
        Err(e) => {
            match e.form_errors() {
                Some(_) => warn!("Login rejected"),
                None => error!("Failed to authenticate: {}", e),
            }
            return Err(ErrorResponse::from(e));
        }
    };

    match state.store.record_login(user.id).await {
        Ok(user) => {
            info!("User {} logged in", user.id);
            Ok(ApiResponse::ok(user.into(), "Logged in successfully"))
        }
        Err(e) => {
            error!("Failed to record login for user {}: {}", user.id, e);
            Err(ErrorResponse::from(e))
        }
    }
}
