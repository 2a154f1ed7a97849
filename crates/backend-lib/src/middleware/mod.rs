// crates/backend-lib/src/middleware/mod.rs

//! Middleware for the olympiad backend.

pub mod role_gate;

pub use role_gate::{authorize, bearer_token, require_admin, require_admin_or_student};
