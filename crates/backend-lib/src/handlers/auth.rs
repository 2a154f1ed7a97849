// ============================
// olympiad-backend-lib/src/handlers/auth.rs
// ============================
//! HTTP handlers for the auth endpoints.
//!
//! Handlers translate service outcomes into status codes and the fixed
//! `{"message": ...}` payloads; all decisions live in the service layer.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use olympiad_common::{
    ApiMessage, LoginRequest, LoginResponse, PasswordChangeRequest, ResetPasswordRequest,
    ValidatePasswordRequest,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::AppError;
use crate::middleware::bearer_token;
use crate::AppState;

fn ok_message(text: &str) -> Response {
    (StatusCode::OK, Json(ApiMessage::new(text))).into_response()
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, AppError> {
    match state
        .auth
        .login(&request.username_or_email, &request.password)
        .await?
    {
        Some(outcome) => Ok(Json(LoginResponse {
            token: outcome.token,
            user: outcome.user,
        })
        .into_response()),
        None => Err(AppError::Auth("Invalid username or password.".to_string())),
    }
}

/// `POST /api/auth/request-password-change`
pub async fn request_password_change(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PasswordChangeRequest>,
) -> Result<Response, AppError> {
    if state
        .auth
        .request_password_change(&request.username_or_email)
        .await?
    {
        Ok(ok_message("Password reset instructions sent to your email."))
    } else {
        Err(AppError::NotFound("User not found.".to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct ResetTokenQuery {
    pub token: String,
}

/// `POST /api/auth/reset-password?token=...`
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ResetTokenQuery>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Response, AppError> {
    if state
        .auth
        .reset_password(&query.token, &request.new_password)
        .await?
    {
        Ok(ok_message("Password updated successfully."))
    } else {
        Err(AppError::InvalidInput(
            "Invalid or expired reset token.".to_string(),
        ))
    }
}

/// `POST /api/auth/validate-token`
pub async fn validate_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let Some(token) = bearer_token(&headers) else {
        return Err(AppError::Auth("Token is missing or invalid.".to_string()));
    };

    if state.auth.validate_token(token)? {
        Ok(ok_message("Token is valid."))
    } else {
        Err(AppError::Auth("Token is invalid or expired.".to_string()))
    }
}

/// `POST /api/auth/validate-password`
pub async fn validate_password(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<ValidatePasswordRequest>,
) -> Result<Response, AppError> {
    if request.password.trim().is_empty() {
        return Err(AppError::InvalidInput("Password is required.".to_string()));
    }

    let Some(token) = bearer_token(&headers) else {
        return Err(AppError::Auth("Token is missing or invalid.".to_string()));
    };

    let check = state.auth.validate_password(token, &request.password).await?;
    if check.is_valid() {
        Ok(ok_message(check.message()))
    } else {
        Err(AppError::Auth(check.message().to_string()))
    }
}
