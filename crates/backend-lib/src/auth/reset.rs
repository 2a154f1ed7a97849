// ============================
// olympiad-backend-lib/src/auth/reset.rs
// ============================
//! Password-reset token lifecycle.
//!
//! A token moves absent -> active -> consumed | expired | superseded.
//! Nothing outside this store deletes or mutates tokens. The map is keyed
//! by user id, so `replace` is an atomic upsert and "at most one live
//! token per user" holds even under concurrent requests for the same user.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use uuid::Uuid;

/// A single-use, time-bound reset grant for one user.
#[derive(Debug, Clone)]
pub struct ResetToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// In-process store of live reset tokens, keyed by user id.
#[derive(Default)]
pub struct ResetTokenStore {
    tokens: DashMap<i64, ResetToken>,
}

impl ResetTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh token for `user_id`, superseding any prior one.
    pub fn replace(&self, user_id: i64, ttl: Duration) -> String {
        let token = Uuid::new_v4().to_string();
        self.tokens.insert(
            user_id,
            ResetToken {
                token: token.clone(),
                expires_at: Utc::now() + ttl,
            },
        );
        token
    }

    /// Owning user of `token`, expired or not. Does not consume.
    pub fn owner(&self, token: &str) -> Option<i64> {
        self.tokens
            .iter()
            .find(|entry| entry.value().token == token)
            .map(|entry| *entry.key())
    }

    /// True if `token` exists and has not expired. Does not consume.
    pub fn validate(&self, token: &str) -> bool {
        match self.owner(token) {
            Some(user_id) => self
                .tokens
                .get(&user_id)
                .map(|entry| entry.token == token && entry.expires_at >= Utc::now())
                .unwrap_or(false),
            None => false,
        }
    }

    /// Consume `token`, returning the owning user id.
    ///
    /// An expired token is removed on access and yields `None`; a second
    /// call with the same token always yields `None` (single use).
    pub fn consume(&self, token: &str) -> Option<i64> {
        let user_id = self.owner(token)?;
        // remove only if the entry still holds this token; a concurrent
        // replace means this one was superseded
        let (user_id, entry) = self.tokens.remove_if(&user_id, |_, v| v.token == token)?;
        if entry.expires_at < Utc::now() {
            return None;
        }
        Some(user_id)
    }

    /// Number of live entries (expired-but-unaccessed included).
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
