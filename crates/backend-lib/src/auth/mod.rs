// ============================
// olympiad-backend-lib/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod jwt;
pub mod password;
pub mod reset;
mod service;

pub use jwt::{Claims, JwtHelper, RolePermissions};
pub use password::{hash_password, validate_password_strength, verify_password};
pub use reset::ResetTokenStore;
pub use service::{AuthService, DefaultAuth, LoginOutcome, PasswordCheck};

#[cfg(test)]
mod service_tests;
