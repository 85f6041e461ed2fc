use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use htmlive_common::Identity;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::extractors::locale::AcceptLocale;
use crate::models::auth::{AuthResponse, CredentialsRequest, validate_credentials};
use crate::state::AppState;
use crate::utils::jwt;

fn issue_token(state: &AppState, identity: &Identity) -> Result<String, AppError> {
    jwt::sign(
        identity,
        &state.config.auth.jwt_secret,
        state.config.auth.token_ttl_days,
    )
    .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))
}

#[utoipa::path(
    post,
    path = "/register",
    tag = "Auth",
    operation_id = "register",
    summary = "Create an account",
    description = "Creates an account and signs into it. Error messages follow `Accept-Language` (English or Russian).",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid email or weak password (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Email already registered (EMAIL_IN_USE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn register(
    State(state): State<AppState>,
    AcceptLocale(locale): AcceptLocale,
    AppJson(payload): AppJson<CredentialsRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_credentials(&payload)?;

    let identity = state
        .identity
        .sign_up(&payload.email, &payload.password)
        .await
        .map_err(|e| AppError::Auth(e, locale))?;
    let token = issue_token(&state, &identity)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: identity,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    operation_id = "login",
    summary = "Sign in",
    description = "Exchanges email and password for a bearer token. Repeated failures lock the email temporarily.",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 400, description = "Malformed email (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Wrong email or password (INVALID_CREDENTIALS)", body = ErrorBody),
        (status = 403, description = "Account disabled (ACCOUNT_DISABLED)", body = ErrorBody),
        (status = 429, description = "Too many failed attempts (RATE_LIMITED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn login(
    State(state): State<AppState>,
    AcceptLocale(locale): AcceptLocale,
    AppJson(payload): AppJson<CredentialsRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    validate_credentials(&payload)?;

    let identity = state
        .identity
        .sign_in(&payload.email, &payload.password)
        .await
        .map_err(|e| AppError::Auth(e, locale))?;
    let token = issue_token(&state, &identity)?;

    Ok(Json(AuthResponse {
        token,
        user: identity,
    }))
}

#[utoipa::path(
    get,
    path = "/me",
    tag = "Auth",
    operation_id = "me",
    summary = "Current identity",
    responses(
        (status = 200, description = "The signed-in identity", body = Identity),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(auth_user), fields(user_id = %auth_user.0.id))]
pub async fn me(auth_user: AuthUser) -> Json<Identity> {
    Json(auth_user.0)
}
