// ============================
// olympiad-backend-lib/src/handlers/catalog.rs
// ============================
//! Read-only handlers behind the role gate.
//!
//! Representative slices of the admin and student surfaces; the full
//! CRUD controllers live with their own services.

use axum::{extract::State, Json};
use olympiad_common::{EnrollmentView, RoleView};
use std::sync::Arc;

use crate::error::AppError;
use crate::AppState;

/// `GET /api/roles` (Admin only)
pub async fn list_roles(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<RoleView>>, AppError> {
    Ok(Json(state.roles.list_roles().await?))
}

/// `GET /api/enrollments` (Admin or Student)
pub async fn list_enrollments(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<EnrollmentView>>, AppError> {
    Ok(Json(state.enrollments.list_enrollments().await?))
}
