// ============================
// olympiad-backend-lib/src/store/memory.rs
// ============================
//! In-memory store implementation, used by tests and the demo binary.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use olympiad_common::{EnrollmentView, RoleView};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use super::{permission_granted, EnrollmentStore, RoleDefinition, RoleStore, StoredUser, UserStore};

/// Links a user to a role, with the grant timestamp.
#[derive(Debug, Clone)]
struct RoleAssignment {
    user_id: i64,
    role_name: String,
    #[allow(dead_code)]
    assigned_at: DateTime<Utc>,
}

/// Hash-map-backed implementation of every store trait.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<i64, StoredUser>>,
    roles: RwLock<BTreeMap<String, RoleDefinition>>,
    assignments: RwLock<Vec<RoleAssignment>>,
    enrollments: RwLock<Vec<EnrollmentView>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, user: StoredUser) {
        self.users.write().await.insert(user.user_id, user);
    }

    /// Define (or redefine) a role with its raw permission map.
    pub async fn upsert_role(&self, name: &str, permissions: RoleDefinition) {
        self.roles.write().await.insert(name.to_string(), permissions);
    }

    pub async fn assign_role(&self, user_id: i64, role_name: &str) {
        self.assignments.write().await.push(RoleAssignment {
            user_id,
            role_name: role_name.to_string(),
            assigned_at: Utc::now(),
        });
    }

    pub async fn add_enrollment(&self, enrollment: EnrollmentView) {
        self.enrollments.write().await.push(enrollment);
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_username_or_email(
        &self,
        needle: &str,
    ) -> anyhow::Result<Option<StoredUser>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.username == needle || u.email == needle)
            .cloned())
    }

    async fn find_by_id(&self, user_id: i64) -> anyhow::Result<Option<StoredUser>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn set_password_hash(&self, user_id: i64, hash: String) -> anyhow::Result<bool> {
        let mut users = self.users.write().await;
        match users.get_mut(&user_id) {
            Some(user) => {
                user.password_hash = hash;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl RoleStore for MemoryStore {
    async fn roles_for_user(
        &self,
        user_id: i64,
    ) -> anyhow::Result<HashMap<String, RoleDefinition>> {
        let assignments = self.assignments.read().await;
        let roles = self.roles.read().await;

        let mut result = HashMap::new();
        for assignment in assignments.iter().filter(|a| a.user_id == user_id) {
            if let Some(permissions) = roles.get(&assignment.role_name) {
                result.insert(assignment.role_name.clone(), permissions.clone());
            }
        }
        Ok(result)
    }

    async fn list_roles(&self) -> anyhow::Result<Vec<RoleView>> {
        let roles = self.roles.read().await;
        Ok(roles
            .iter()
            .map(|(name, permissions)| RoleView {
                name: name.clone(),
                permissions: permissions
                    .iter()
                    .map(|(k, v)| (k.clone(), permission_granted(v)))
                    .collect(),
            })
            .collect())
    }
}

#[async_trait]
impl EnrollmentStore for MemoryStore {
    async fn list_enrollments(&self) -> anyhow::Result<Vec<EnrollmentView>> {
        Ok(self.enrollments.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user(id: i64, username: &str, email: &str) -> StoredUser {
        StoredUser {
            user_id: id,
            name: format!("User {id}"),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn lookup_by_username_or_email() {
        let store = MemoryStore::new();
        store.add_user(user(1, "alice", "alice@example.com")).await;

        let by_name = store.find_by_username_or_email("alice").await.unwrap();
        assert_eq!(by_name.unwrap().user_id, 1);

        let by_email = store
            .find_by_username_or_email("alice@example.com")
            .await
            .unwrap();
        assert_eq!(by_email.unwrap().user_id, 1);

        assert!(store
            .find_by_username_or_email("bob")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn roles_aggregate_per_user() {
        let store = MemoryStore::new();
        store.add_user(user(1, "alice", "alice@example.com")).await;
        store
            .upsert_role("Admin", HashMap::from([("Manage".to_string(), json!(true))]))
            .await;
        store
            .upsert_role(
                "Student",
                HashMap::from([("Enroll".to_string(), json!(true))]),
            )
            .await;
        store.assign_role(1, "Admin").await;
        store.assign_role(1, "Student").await;
        store.assign_role(2, "Student").await;

        let roles = store.roles_for_user(1).await.unwrap();
        assert_eq!(roles.len(), 2);
        assert!(roles.contains_key("Admin"));
        assert!(roles.contains_key("Student"));

        let roles = store.roles_for_user(2).await.unwrap();
        assert_eq!(roles.len(), 1);

        assert!(store.roles_for_user(99).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn listed_roles_coerce_permission_values() {
        let store = MemoryStore::new();
        store
            .upsert_role(
                "Judge",
                HashMap::from([
                    ("Score".to_string(), json!(true)),
                    ("Publish".to_string(), json!("yes")),
                ]),
            )
            .await;

        let listed = store.list_roles().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].permissions["Score"], true);
        assert_eq!(listed[0].permissions["Publish"], false);
    }

    #[tokio::test]
    async fn password_hash_update() {
        let store = MemoryStore::new();
        store.add_user(user(1, "alice", "alice@example.com")).await;

        assert!(store.set_password_hash(1, "new-hash".to_string()).await.unwrap());
        let stored = store.find_by_id(1).await.unwrap().unwrap();
        assert_eq!(stored.password_hash, "new-hash");

        assert!(!store.set_password_hash(99, "x".to_string()).await.unwrap());
    }
}
