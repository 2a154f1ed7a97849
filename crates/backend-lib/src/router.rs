// ============================
// olympiad-backend-lib/src/router.rs
// ============================
//! Route table for the backend.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{auth, catalog};
use crate::middleware::{require_admin, require_admin_or_student};
use crate::AppState;

/// Builds the full application router.
///
/// Auth endpoints are open; the catalog routes sit behind the role gate.
pub fn create_router(state: Arc<AppState>) -> Router {
    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/request-password-change", post(auth::request_password_change))
        .route("/reset-password", post(auth::reset_password))
        .route("/validate-token", post(auth::validate_token))
        .route("/validate-password", post(auth::validate_password));

    let admin_routes = Router::new()
        .route("/api/roles", get(catalog::list_roles))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_admin,
        ));

    let shared_routes = Router::new()
        .route("/api/enrollments", get(catalog::list_enrollments))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_admin_or_student,
        ));

    Router::new()
        .nest("/api/auth", auth_routes)
        .merge(admin_routes)
        .merge(shared_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
