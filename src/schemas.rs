use accounts::{
    AccountsError, CompanyProfile, CustomerProfile, CustomerRegistration, FormErrors,
};
use chrono::{DateTime, NaiveDate, Utc};
use model::entities::{company, customer, user};
use serde::{Deserialize, Serialize};

/// Command response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: true,
        }
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Field-keyed validation messages, present for validation failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<FormErrors>,
    /// Success status (always false for errors)
    pub success: bool,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: &str) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
            fields: None,
            success: false,
        }
    }
}

impl From<AccountsError> for ErrorResponse {
    fn from(error: AccountsError) -> Self {
        match error {
            AccountsError::Validation(fields) => Self {
                fields: Some(fields),
                ..Self::new("Validation failed", "VALIDATION_ERROR")
            },
            AccountsError::Database(_) => Self::new(error.to_string(), "DATABASE_ERROR"),
            AccountsError::PasswordHash(_) => Self::new(error.to_string(), "PASSWORD_HASH_ERROR"),
            AccountsError::NotFound(_) => Self::new(error.to_string(), "NOT_FOUND"),
        }
    }
}

/// Outcome of a command
pub type CommandResult<T> = Result<ApiResponse<T>, ErrorResponse>;

/// User response model
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_customer: bool,
    pub is_company: bool,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            is_customer: model.is_customer,
            is_company: model.is_company,
            is_active: model.is_active,
            is_staff: model.is_staff,
            is_superuser: model.is_superuser,
            date_joined: model.date_joined,
            last_login: model.last_login,
        }
    }
}

/// Customer profile response model
#[derive(Debug, Serialize, Deserialize)]
pub struct CustomerResponse {
    pub user_id: i32,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

impl From<customer::Model> for CustomerResponse {
    fn from(model: customer::Model) -> Self {
        Self {
            user_id: model.user_id,
            address: model.address,
            phone_number: model.phone_number,
            date_of_birth: model.date_of_birth,
        }
    }
}

/// Company profile response model
#[derive(Debug, Serialize, Deserialize)]
pub struct CompanyResponse {
    pub user_id: i32,
    /// Service category label, e.g. "Plumbing"
    pub field: String,
    pub rating: i32,
}

impl From<company::Model> for CompanyResponse {
    fn from(model: company::Model) -> Self {
        Self {
            user_id: model.user_id,
            field: model.field.label(),
            rating: model.rating,
        }
    }
}

/// Records created by a customer sign-up
#[derive(Debug, Serialize, Deserialize)]
pub struct RegistrationResponse {
    pub user: UserResponse,
    pub customer: CustomerResponse,
}

impl From<CustomerRegistration> for RegistrationResponse {
    fn from(registration: CustomerRegistration) -> Self {
        Self {
            user: registration.user.into(),
            customer: registration.customer.into(),
        }
    }
}

/// A user together with whatever role records it owns
#[derive(Debug, Serialize, Deserialize)]
pub struct UserDetailResponse {
    pub user: UserResponse,
    pub customer: Option<CustomerResponse>,
    pub company: Option<CompanyResponse>,
}

impl UserDetailResponse {
    pub fn new(
        user: user::Model,
        customer: Option<CustomerProfile>,
        company: Option<CompanyProfile>,
    ) -> Self {
        Self {
            user: user.into(),
            customer: customer.map(|profile| profile.customer.into()),
            company: company.map(|profile| profile.company.into()),
        }
    }
}
