// ============================
// olympiad-backend-lib/src/store/mod.rs
// ============================
//! Persistence seams for the entities the auth core consumes.
//!
//! User, role and enrollment rows are owned by their own repositories;
//! the auth core only reads the projections below. The traits keep that
//! boundary explicit so a relational backend can replace [`MemoryStore`]
//! without touching the service layer.

pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use olympiad_common::{EnrollmentView, PublicUser, RoleView};
use serde_json::Value;
use std::collections::HashMap;

/// Minimal user projection the auth core works with.
///
/// The password hash never leaves the service layer; outward-facing code
/// gets a [`PublicUser`] instead.
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub user_id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl From<&StoredUser> for PublicUser {
    fn from(user: &StoredUser) -> Self {
        PublicUser {
            user_id: user.user_id,
            name: user.name.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

/// Permission name -> raw stored value. Values are untyped at rest and
/// coerced with [`permission_granted`] when aggregated into a token.
pub type RoleDefinition = HashMap<String, Value>;

/// A stored permission grants access only when it is exactly the JSON
/// boolean `true`; strings, numbers and `null` all read as denied.
pub fn permission_granted(value: &Value) -> bool {
    matches!(value, Value::Bool(true))
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username_or_email(&self, needle: &str)
        -> anyhow::Result<Option<StoredUser>>;

    async fn find_by_id(&self, user_id: i64) -> anyhow::Result<Option<StoredUser>>;

    /// Persist a new password hash. Returns false if the user is gone.
    async fn set_password_hash(&self, user_id: i64, hash: String) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait RoleStore: Send + Sync {
    /// All roles assigned to `user_id`, with their raw permission maps.
    async fn roles_for_user(
        &self,
        user_id: i64,
    ) -> anyhow::Result<HashMap<String, RoleDefinition>>;

    async fn list_roles(&self) -> anyhow::Result<Vec<RoleView>>;
}

#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    async fn list_enrollments(&self) -> anyhow::Result<Vec<EnrollmentView>>;
}
