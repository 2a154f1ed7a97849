// ============================
// olympiad-backend-lib/src/auth/jwt.rs
// ============================
//! JWT issuance and verification.
//!
//! Tokens are HS256-signed and carry three application claims: `sub`
//! (username), `uid` (user id, stringified) and `roles` (the role ->
//! permission map serialized to a JSON string and embedded as one opaque
//! claim). The role gate matches against that serialized blob, so the
//! encoding is part of the contract: a BTreeMap keeps the claim bytes
//! deterministic for a given role set.
//!
//! Token lifetime is configured in **minutes** (`jwt.expiration_minutes`).

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::Settings;
use crate::error::AppError;
use crate::store::StoredUser;

/// Aggregated role name -> (permission name -> granted) mapping.
pub type RolePermissions = BTreeMap<String, BTreeMap<String, bool>>;

/// Claims embedded in every issued token.
///
/// Deserialization is lenient: a claim absent from the token reads as its
/// default (empty string / zero) rather than failing the decode. Which
/// registered claims must be present is the [`Validation`]'s call, not the
/// struct's, so a correctly signed token minted elsewhere without `uid` or
/// `roles` still verifies and is handled by the claim consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username
    #[serde(default)]
    pub sub: String,
    /// User id as a string
    #[serde(default)]
    pub uid: String,
    /// Role -> permission map, serialized to a JSON string
    #[serde(default)]
    pub roles: String,
    #[serde(default)]
    pub iss: String,
    #[serde(default)]
    pub aud: String,
    #[serde(default)]
    pub iat: i64,
    #[serde(default)]
    pub exp: i64,
}

/// Issues and verifies bearer tokens against the configured signing key.
#[derive(Clone)]
pub struct JwtHelper {
    settings: Arc<Settings>,
}

impl JwtHelper {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }

    fn require<'a>(value: &'a str, key: &'static str) -> Result<&'a str, AppError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::Config(key));
        }
        Ok(trimmed)
    }

    fn expiration_minutes(&self) -> Result<i64, AppError> {
        let raw = Self::require(&self.settings.jwt.expiration_minutes, "jwt.expiration_minutes")?;
        match raw.parse::<i64>() {
            Ok(minutes) if minutes > 0 => Ok(minutes),
            _ => Err(AppError::Config("jwt.expiration_minutes")),
        }
    }

    /// Build a signed token for `user` with `roles` baked in.
    ///
    /// Roles are a point-in-time snapshot: grants made after issuance are
    /// not visible through an already-issued token.
    pub fn issue_token(
        &self,
        user: &StoredUser,
        roles: &RolePermissions,
    ) -> Result<String, AppError> {
        let secret = Self::require(&self.settings.jwt.secret, "jwt.secret")?;
        let issuer = Self::require(&self.settings.jwt.issuer, "jwt.issuer")?;
        let audience = Self::require(&self.settings.jwt.audience, "jwt.audience")?;
        let minutes = self.expiration_minutes()?;

        let iat = Utc::now().timestamp();
        let claims = Claims {
            sub: user.username.clone(),
            uid: user.user_id.to_string(),
            roles: serde_json::to_string(roles)?,
            iss: issuer.to_string(),
            aud: audience.to_string(),
            iat,
            exp: iat + minutes * 60,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("token signing failed: {e}")))
    }

    /// Check signature, issuer, audience and expiry (zero leeway).
    ///
    /// A bad token is an expected outcome, not an error: the only `Err`
    /// this returns is a missing signing secret. The rejection reason is
    /// logged, never surfaced to the caller.
    pub fn validate_token(&self, token: &str) -> Result<bool, AppError> {
        let secret = Self::require(&self.settings.jwt.secret, "jwt.secret")?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[self.settings.jwt.issuer.trim()]);
        validation.set_audience(&[self.settings.jwt.audience.trim()]);

        match decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        ) {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!(reason = %e, "token validation failed");
                Ok(false)
            }
        }
    }

    /// Syntactic claim extraction. Does NOT check signature or expiry:
    /// a successful return is not proof of authenticity. Callers that
    /// need trust must run `validate_token` first.
    pub fn claims(&self, token: &str) -> Option<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        match decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                tracing::debug!(reason = %e, "token could not be parsed");
                None
            }
        }
    }
}
