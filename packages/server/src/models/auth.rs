use htmlive_common::Identity;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Request body for registration and login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CredentialsRequest {
    /// Account email. Surrounding whitespace is ignored.
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// Password (at least 6 characters when registering).
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_credentials(payload: &CredentialsRequest) -> Result<(), AppError> {
    if payload.email.trim().is_empty() {
        return Err(AppError::Validation("Email must not be empty".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    Ok(())
}

/// Successful registration or login.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    /// JWT bearer token.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    pub user: Identity,
}
