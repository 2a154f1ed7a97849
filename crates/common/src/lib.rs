// ============================
// olympiad-common/src/lib.rs
// ============================
//! Wire types shared between the backend and its clients.
//!
//! Everything here is plain serde data. Field names follow the JSON casing
//! the frontend expects (camelCase), so handlers can pass these through
//! without per-field renames.

use serde::{Deserialize, Serialize};

/// Credentials submitted to `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username_or_email: String,
    pub password: String,
}

/// Redacted user view returned after a successful login.
///
/// Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub user_id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
}

/// Successful login payload: bearer token plus the redacted user view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: PublicUser,
}

/// Body of `POST /api/auth/request-password-change`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChangeRequest {
    pub username_or_email: String,
}

/// Body of `POST /api/auth/reset-password` (token travels as a query param).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

/// Body of `POST /api/auth/validate-password`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatePasswordRequest {
    pub password: String,
}

/// Generic `{"message": ...}` envelope used by the auth endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMessage {
    pub message: String,
}

impl ApiMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Role definition as exposed by the admin listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleView {
    pub name: String,
    /// Permission name -> granted. Values are coerced to plain booleans
    /// before they leave the backend.
    pub permissions: std::collections::BTreeMap<String, bool>,
}

/// Read-only projection of a student's olympiad enrollment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentView {
    pub enrollment_id: i64,
    pub user_id: i64,
    pub olympiad: String,
    pub status: String,
}
