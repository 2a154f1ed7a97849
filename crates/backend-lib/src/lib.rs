// ============================
// olympiad-backend-lib/src/lib.rs
// ============================
//! Core library for the olympiad backend: authentication, role
//! authorization, and the HTTP surface that exposes them.

pub mod auth;
pub mod config;
pub mod email;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod store;

use std::sync::Arc;

use crate::auth::jwt::JwtHelper;
use crate::auth::{AuthService, DefaultAuth};
use crate::config::Settings;
use crate::email::EmailSender;
use crate::store::{EnrollmentStore, RoleStore, UserStore};

/// Shared application state handed to every handler and middleware.
pub struct AppState {
    pub settings: Arc<Settings>,
    pub jwt: Arc<JwtHelper>,
    pub auth: Arc<dyn AuthService>,
    pub roles: Arc<dyn RoleStore>,
    pub enrollments: Arc<dyn EnrollmentStore>,
}

impl AppState {
    /// Wires the default auth service onto the given stores.
    pub fn new(
        settings: Arc<Settings>,
        users: Arc<dyn UserStore>,
        roles: Arc<dyn RoleStore>,
        enrollments: Arc<dyn EnrollmentStore>,
        mailer: Arc<dyn EmailSender>,
    ) -> Self {
        let jwt = Arc::new(JwtHelper::new(settings.clone()));
        let auth = Arc::new(DefaultAuth::new(
            users,
            roles.clone(),
            jwt.clone(),
            mailer,
            settings.clone(),
        ));
        Self {
            settings,
            jwt,
            auth,
            roles,
            enrollments,
        }
    }
}
