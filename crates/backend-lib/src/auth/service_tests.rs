// ============================
// olympiad-backend-lib/src/auth/service_tests.rs
// ============================

use async_trait::async_trait;
use chrono::Duration;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use olympiad_common::PublicUser;
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::auth::jwt::{JwtHelper, RolePermissions};
use crate::auth::password::hash_password;
use crate::auth::service::{AuthService, DefaultAuth, PasswordCheck};
use crate::config::Settings;
use crate::email::EmailSender;
use crate::error::AppError;
use crate::store::{MemoryStore, RoleStore, StoredUser, UserStore};

const ALICE_PASSWORD: &str = "Secret#Pass1";

struct RecordingMailer {
    sent: Mutex<Vec<(String, String, String)>>,
}

impl RecordingMailer {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
        })
    }

    fn messages(&self) -> Vec<(String, String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailSender for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string(), body.to_string()));
        Ok(())
    }
}

struct FailingMailer;

#[async_trait]
impl EmailSender for FailingMailer {
    async fn send(&self, _to: &str, _subject: &str, _body: &str) -> anyhow::Result<()> {
        anyhow::bail!("smtp connection refused")
    }
}

fn settings() -> Arc<Settings> {
    let mut settings = Settings::default();
    settings.jwt.secret = "service-test-signing-secret".to_string();
    settings.jwt.issuer = "olympiad-api".to_string();
    settings.jwt.audience = "olympiad-spa".to_string();
    settings.jwt.expiration_minutes = "60".to_string();
    settings.frontend_url = "https://olympiad.example.org".to_string();
    Arc::new(settings)
}

async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());

    store
        .add_user(StoredUser {
            user_id: 1,
            name: "Alice Petrova".to_string(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: hash_password(ALICE_PASSWORD).unwrap(),
        })
        .await;

    store
        .upsert_role(
            "Admin",
            HashMap::from([
                ("ManageOlympiads".to_string(), json!(true)),
                // non-boolean stored value, must coerce to false
                ("ViewReports".to_string(), json!("yes")),
            ]),
        )
        .await;
    store
        .upsert_role("Student", HashMap::from([("Enroll".to_string(), json!(true))]))
        .await;

    store.assign_role(1, "Admin").await;
    store.assign_role(1, "Student").await;

    store
}

async fn service(mailer: Arc<dyn EmailSender>) -> DefaultAuth {
    let store = seeded_store().await;
    let settings = settings();
    DefaultAuth::new(
        store.clone() as Arc<dyn UserStore>,
        store as Arc<dyn RoleStore>,
        Arc::new(JwtHelper::new(settings.clone())),
        mailer,
        settings,
    )
}

fn token_from_email(body: &str) -> String {
    body.split("token=")
        .nth(1)
        .expect("reset link missing from email body")
        .trim()
        .to_string()
}

#[tokio::test]
async fn login_embeds_identity_and_role_snapshot() {
    let auth = service(RecordingMailer::new()).await;

    let outcome = auth.login("alice", ALICE_PASSWORD).await.unwrap().unwrap();

    assert_eq!(
        outcome.user,
        PublicUser {
            user_id: 1,
            name: "Alice Petrova".to_string(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
        }
    );

    let claims = auth.jwt.claims(&outcome.token).unwrap();
    assert_eq!(claims.sub, "alice");
    assert_eq!(claims.uid, "1");

    let roles: RolePermissions = serde_json::from_str(&claims.roles).unwrap();
    assert_eq!(roles.len(), 2);
    assert_eq!(roles["Admin"]["ManageOlympiads"], true);
    assert_eq!(roles["Admin"]["ViewReports"], false);
    assert_eq!(roles["Student"]["Enroll"], true);
}

#[tokio::test]
async fn login_accepts_email_as_identifier() {
    let auth = service(RecordingMailer::new()).await;
    let outcome = auth.login("alice@example.com", ALICE_PASSWORD).await.unwrap();
    assert!(outcome.is_some());
}

#[tokio::test]
async fn bad_credentials_are_indistinguishable() {
    let auth = service(RecordingMailer::new()).await;

    let wrong_password = auth.login("alice", "not-the-password").await.unwrap();
    let unknown_user = auth.login("ghost", ALICE_PASSWORD).await.unwrap();

    assert!(wrong_password.is_none());
    assert!(unknown_user.is_none());
}

#[tokio::test]
async fn reset_request_for_unknown_user_sends_nothing() {
    let mailer = RecordingMailer::new();
    let auth = service(mailer.clone()).await;

    assert!(!auth.request_password_change("ghost").await.unwrap());
    assert!(mailer.messages().is_empty());
    assert!(auth.reset_tokens.is_empty());
}

#[tokio::test]
async fn full_reset_flow_rotates_the_password() {
    let mailer = RecordingMailer::new();
    let auth = service(mailer.clone()).await;

    assert!(auth.request_password_change("alice").await.unwrap());

    let messages = mailer.messages();
    assert_eq!(messages.len(), 1);
    let (to, subject, body) = &messages[0];
    assert_eq!(to, "alice@example.com");
    assert_eq!(subject, "Password Reset Request");
    assert!(body.contains("https://olympiad.example.org/reset-password?token="));

    let token = token_from_email(body);
    assert!(auth.reset_password(&token, "Fresh#Secret9").await.unwrap());

    // old password is dead, new one works, token is spent
    assert!(auth.login("alice", ALICE_PASSWORD).await.unwrap().is_none());
    assert!(auth.login("alice", "Fresh#Secret9").await.unwrap().is_some());
    assert!(!auth.reset_password(&token, "Another#Pass1").await.unwrap());
}

#[tokio::test]
async fn second_request_supersedes_the_first_token() {
    let mailer = RecordingMailer::new();
    let auth = service(mailer.clone()).await;

    assert!(auth.request_password_change("alice").await.unwrap());
    assert!(auth.request_password_change("alice").await.unwrap());

    let messages = mailer.messages();
    assert_eq!(messages.len(), 2);
    let first = token_from_email(&messages[0].2);
    let second = token_from_email(&messages[1].2);
    assert_ne!(first, second);
    assert_eq!(auth.reset_tokens.len(), 1);

    assert!(!auth.reset_password(&first, "Fresh#Secret9").await.unwrap());
    assert!(auth.reset_password(&second, "Fresh#Secret9").await.unwrap());
}

#[tokio::test]
async fn expired_token_fails_and_is_removed() {
    let auth = service(RecordingMailer::new()).await;

    let token = auth.reset_tokens.replace(1, Duration::seconds(-1));
    assert!(!auth.reset_password(&token, "Fresh#Secret9").await.unwrap());
    assert!(auth.reset_tokens.is_empty());
}

#[tokio::test]
async fn email_failure_does_not_roll_back_the_token() {
    let auth = service(Arc::new(FailingMailer)).await;

    assert!(auth.request_password_change("alice").await.unwrap());
    assert_eq!(auth.reset_tokens.len(), 1);
}

#[tokio::test]
async fn weak_replacement_password_is_rejected() {
    let mailer = RecordingMailer::new();
    let auth = service(mailer.clone()).await;

    assert!(auth.request_password_change("alice").await.unwrap());
    let token = token_from_email(&mailer.messages()[0].2);

    let result = auth.reset_password(&token, "weak").await;
    assert!(matches!(result, Err(AppError::InvalidInput(_))));

    // the token survives a rejected attempt
    assert!(auth.reset_password(&token, "Fresh#Secret9").await.unwrap());
}

#[tokio::test]
async fn validate_token_delegates_to_the_verifier() {
    let auth = service(RecordingMailer::new()).await;
    let outcome = auth.login("alice", ALICE_PASSWORD).await.unwrap().unwrap();

    assert!(auth.validate_token(&outcome.token).unwrap());
    assert!(!auth.validate_token("garbage.token.here").unwrap());
}

#[derive(Serialize)]
struct BareClaims {
    sub: String,
    iss: String,
    aud: String,
    iat: i64,
    exp: i64,
}

fn token_without_uid(settings: &Settings) -> String {
    let iat = chrono::Utc::now().timestamp();
    let claims = BareClaims {
        sub: "alice".to_string(),
        iss: settings.jwt.issuer.clone(),
        aud: settings.jwt.audience.clone(),
        iat,
        exp: iat + 3600,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(settings.jwt.secret.as_bytes()),
    )
    .unwrap()
}

#[tokio::test]
async fn validate_password_has_three_distinct_outcomes() {
    let auth = service(RecordingMailer::new()).await;
    let outcome = auth.login("alice", ALICE_PASSWORD).await.unwrap().unwrap();

    let valid = auth
        .validate_password(&outcome.token, ALICE_PASSWORD)
        .await
        .unwrap();
    assert_eq!(valid, PasswordCheck::Valid);
    assert!(valid.is_valid());
    assert_eq!(valid.message(), "Password validated successfully.");

    let invalid = auth
        .validate_password(&outcome.token, "wrong")
        .await
        .unwrap();
    assert_eq!(invalid, PasswordCheck::Invalid);
    assert_eq!(invalid.message(), "Invalid password.");

    let missing = auth
        .validate_password(&token_without_uid(&settings()), ALICE_PASSWORD)
        .await
        .unwrap();
    assert_eq!(missing, PasswordCheck::MissingUserClaim);
    assert_eq!(missing.message(), "User ID claim not found in token.");
}

#[tokio::test]
async fn non_numeric_uid_claim_reads_as_missing() {
    let auth = service(RecordingMailer::new()).await;
    let settings = settings();

    let iat = chrono::Utc::now().timestamp();
    let claims = crate::auth::jwt::Claims {
        sub: "alice".to_string(),
        uid: "not-a-number".to_string(),
        roles: "{}".to_string(),
        iss: settings.jwt.issuer.clone(),
        aud: settings.jwt.audience.clone(),
        iat,
        exp: iat + 3600,
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(settings.jwt.secret.as_bytes()),
    )
    .unwrap();

    let check = auth.validate_password(&token, ALICE_PASSWORD).await.unwrap();
    assert_eq!(check, PasswordCheck::MissingUserClaim);
}
