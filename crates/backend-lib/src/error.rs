// crates/backend-lib/src/error.rs

//! Central error type + Axum integration.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use olympiad_common::ApiMessage;
use thiserror::Error;

/// Application error types with HTTP status mapping
#[derive(Error, Debug)]
pub enum AppError {
    /// A required configuration key is missing, blank, or unparseable.
    /// Request-fatal: surfaces as 500 and is never retried.
    #[error("configuration key {0} is missing or invalid")]
    Config(&'static str),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Insufficient role for this action")]
    Forbidden,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a sanitized message suitable for production responses.
    /// Configuration and internal detail stays in the logs; the `Auth`,
    /// `NotFound` and `InvalidInput` payloads are client-facing by
    /// construction.
    pub fn sanitized_message(&self) -> String {
        match self {
            AppError::Auth(msg) => msg.clone(),
            AppError::Forbidden => "You are not authorized to perform this action.".to_string(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::Config(_) | AppError::Internal(_) | AppError::Io(_) | AppError::Json(_) => {
                "An internal server error occurred.".to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }

        (status, Json(ApiMessage::new(self.sanitized_message()))).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
