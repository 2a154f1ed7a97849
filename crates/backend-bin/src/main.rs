// ============================
// olympiad-backend-bin/src/main.rs
// ============================
//! Binary entry point. Loads configuration, seeds the in-memory stores
//! with demo data, and serves the router.

use std::sync::Arc;

use olympiad_common::EnrollmentView;
use serde_json::json;
use tokio::net::TcpListener;

use olympiad_backend_lib::{
    auth::hash_password,
    config::Settings,
    email::LogMailer,
    router::create_router,
    store::{MemoryStore, StoredUser},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().or_else(|_| {
        eprintln!(
            "config.toml not found or invalid, trying config/default.toml \
             (keys can also come from OLYMPIAD_* env vars, e.g. OLYMPIAD_JWT__SECRET)"
        );
        Settings::load_from("config/default.toml")
    })?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .init();

    let store = Arc::new(seeded_store().await?);

    let state = Arc::new(AppState::new(
        Arc::new(settings.clone()),
        store.clone(),
        store.clone(),
        store,
        Arc::new(LogMailer),
    ));

    let app = create_router(state);

    let listener = TcpListener::bind(settings.bind_addr).await?;
    tracing::info!("listening on {}", settings.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Demo fixture until a relational backend lands: one admin, one
/// student, and a couple of enrollments to browse.
async fn seeded_store() -> anyhow::Result<MemoryStore> {
    let store = MemoryStore::new();

    store
        .add_user(StoredUser {
            user_id: 1,
            name: "Admin User".into(),
            username: "admin".into(),
            email: "admin@olympiad.example.org".into(),
            password_hash: hash_password("ChangeMe#123")?,
        })
        .await;
    store
        .add_user(StoredUser {
            user_id: 2,
            name: "Student User".into(),
            username: "student".into(),
            email: "student@olympiad.example.org".into(),
            password_hash: hash_password("ChangeMe#456")?,
        })
        .await;

    store
        .upsert_role(
            "Admin",
            [
                ("ManageOlympiads".to_string(), json!(true)),
                ("ViewReports".to_string(), json!(true)),
            ]
            .into_iter()
            .collect(),
        )
        .await;
    store
        .upsert_role(
            "Student",
            [("Enroll".to_string(), json!(true))].into_iter().collect(),
        )
        .await;

    store.assign_role(1, "Admin").await;
    store.assign_role(2, "Student").await;

    store
        .add_enrollment(EnrollmentView {
            enrollment_id: 1,
            user_id: 2,
            olympiad: "National Informatics Olympiad".into(),
            status: "active".into(),
        })
        .await;
    store
        .add_enrollment(EnrollmentView {
            enrollment_id: 2,
            user_id: 2,
            olympiad: "Regional Mathematics Olympiad".into(),
            status: "pending".into(),
        })
        .await;

    Ok(store)
}
