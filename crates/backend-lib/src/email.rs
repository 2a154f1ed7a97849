// crates/backend-lib/src/email.rs

//! Outbound email seam.
//!
//! The auth core only needs "send this subject/body to this address";
//! the actual SMTP transport lives behind this trait.

use async_trait::async_trait;

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

/// Logs outbound mail instead of delivering it. Stands in for a real
/// transport in development and tests.
pub struct LogMailer;

#[async_trait]
impl EmailSender for LogMailer {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> anyhow::Result<()> {
        tracing::info!(%to, %subject, "email dispatched");
        Ok(())
    }
}
