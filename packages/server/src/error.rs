use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use htmlive_common::{AuthError, StoreError, UploadError};
use serde::Serialize;

use crate::messages::{Locale, auth_message};
use crate::projector::ProjectorError;
use crate::submitter::SubmitError;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `TOKEN_MISSING`,
    /// `TOKEN_INVALID`, `INVALID_CREDENTIALS`, `EMAIL_IN_USE`, `ACCOUNT_DISABLED`,
    /// `RATE_LIMITED`, `NOT_FOUND`, `STORE_ERROR`, `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Please enter a site name")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    TokenMissing,
    TokenInvalid,
    /// Identity failure, rendered with the caller's locale.
    Auth(AuthError, Locale),
    NotFound(String),
    Store(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::TokenMissing => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_MISSING",
                    message: "Authentication required".into(),
                },
            ),
            AppError::TokenInvalid => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_INVALID",
                    message: "Invalid or expired token".into(),
                },
            ),
            AppError::Auth(err, locale) => {
                let message = auth_message(&err, locale).to_string();
                let (status, code) = match err {
                    AuthError::InvalidCredential => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
                    AuthError::EmailInUse => (StatusCode::CONFLICT, "EMAIL_IN_USE"),
                    AuthError::InvalidEmail | AuthError::WeakPassword => {
                        (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
                    }
                    AuthError::Disabled => (StatusCode::FORBIDDEN, "ACCOUNT_DISABLED"),
                    AuthError::TooManyRequests => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED"),
                    AuthError::Unknown(detail) => {
                        tracing::warn!(code = %detail, "Unrecognized identity error");
                        (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS")
                    }
                };
                (status, ErrorBody { code, message })
            }
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::Store(detail) => {
                tracing::error!("Store error: {}", detail);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorBody {
                        code: "STORE_ERROR",
                        message: "Failed to save the request. Please try again.".into(),
                    },
                )
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err.to_string())
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Read { .. } => AppError::Internal(err.to_string()),
            other => AppError::Validation(other.to_string()),
        }
    }
}

impl From<SubmitError> for AppError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::SignInRequired => AppError::TokenMissing,
            SubmitError::Upload(e) => e.into(),
            SubmitError::Store(e) => e.into(),
        }
    }
}

impl From<ProjectorError> for AppError {
    fn from(err: ProjectorError) -> Self {
        match err {
            ProjectorError::Store(e) => e.into(),
        }
    }
}
