// ============================
// olympiad-backend-lib/src/auth/service.rs
// ============================
//! Auth service orchestration: login, password-reset lifecycle and
//! token/password checks, composed from the stores, the JWT helper and
//! the mail seam.

use async_trait::async_trait;
use chrono::Duration;
use olympiad_common::PublicUser;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::auth::jwt::{JwtHelper, RolePermissions};
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::auth::reset::ResetTokenStore;
use crate::config::Settings;
use crate::email::EmailSender;
use crate::error::AppError;
use crate::store::{permission_granted, RoleStore, UserStore};

/// Successful login payload before it is shaped for the wire.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub user: PublicUser,
}

/// Outcome of a password check against a presented token.
///
/// Exactly three cases, each with a fixed client-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordCheck {
    MissingUserClaim,
    Invalid,
    Valid,
}

impl PasswordCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, PasswordCheck::Valid)
    }

    pub fn message(&self) -> &'static str {
        match self {
            PasswordCheck::MissingUserClaim => "User ID claim not found in token.",
            PasswordCheck::Invalid => "Invalid password.",
            PasswordCheck::Valid => "Password validated successfully.",
        }
    }
}

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Verify credentials and issue a token.
    ///
    /// Returns `None` for unknown user and wrong password alike; the two
    /// cases are deliberately indistinguishable to the caller.
    async fn login(
        &self,
        username_or_email: &str,
        password: &str,
    ) -> Result<Option<LoginOutcome>, AppError>;

    /// Start a password reset: store a fresh single-use token (superseding
    /// any prior one) and email the reset link. False if no such user.
    async fn request_password_change(&self, username_or_email: &str) -> Result<bool, AppError>;

    /// Finish a password reset. False on an invalid or expired token.
    async fn reset_password(&self, token: &str, new_password: &str) -> Result<bool, AppError>;

    /// Full token verification (signature, issuer, audience, expiry).
    fn validate_token(&self, token: &str) -> Result<bool, AppError>;

    /// Check `password` against the account named by the token's user-id
    /// claim. Claim extraction only; the token's signature and expiry are
    /// not re-checked on this path.
    async fn validate_password(
        &self,
        token: &str,
        password: &str,
    ) -> Result<PasswordCheck, AppError>;
}

/// Production [`AuthService`] implementation.
pub struct DefaultAuth {
    pub(crate) users: Arc<dyn UserStore>,
    pub(crate) roles: Arc<dyn RoleStore>,
    pub(crate) reset_tokens: ResetTokenStore,
    pub(crate) jwt: Arc<JwtHelper>,
    pub(crate) mailer: Arc<dyn EmailSender>,
    pub(crate) settings: Arc<Settings>,
}

impl DefaultAuth {
    pub fn new(
        users: Arc<dyn UserStore>,
        roles: Arc<dyn RoleStore>,
        jwt: Arc<JwtHelper>,
        mailer: Arc<dyn EmailSender>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            users,
            roles,
            reset_tokens: ResetTokenStore::new(),
            jwt,
            mailer,
            settings,
        }
    }

    /// Collect every assigned role's permission map into the claims shape,
    /// coercing raw stored values to plain booleans.
    async fn aggregate_roles(&self, user_id: i64) -> Result<RolePermissions, AppError> {
        let assigned = self.roles.roles_for_user(user_id).await?;
        let mut aggregated = BTreeMap::new();
        for (role_name, permissions) in assigned {
            let coerced: BTreeMap<String, bool> = permissions
                .iter()
                .map(|(name, value)| (name.clone(), permission_granted(value)))
                .collect();
            aggregated.insert(role_name, coerced);
        }
        Ok(aggregated)
    }

    fn reset_ttl(&self) -> Duration {
        Duration::seconds(self.settings.reset_token_ttl_secs as i64)
    }
}

#[async_trait]
impl AuthService for DefaultAuth {
    async fn login(
        &self,
        username_or_email: &str,
        password: &str,
    ) -> Result<Option<LoginOutcome>, AppError> {
        let Some(user) = self.users.find_by_username_or_email(username_or_email).await? else {
            return Ok(None);
        };

        if !verify_password(&user.password_hash, password) {
            return Ok(None);
        }

        let roles = self.aggregate_roles(user.user_id).await?;
        let token = self.jwt.issue_token(&user, &roles)?;

        Ok(Some(LoginOutcome {
            token,
            user: (&user).into(),
        }))
    }

    async fn request_password_change(&self, username_or_email: &str) -> Result<bool, AppError> {
        let Some(user) = self.users.find_by_username_or_email(username_or_email).await? else {
            return Ok(false);
        };

        let token = self.reset_tokens.replace(user.user_id, self.reset_ttl());

        let reset_link = format!(
            "{}/reset-password?token={}",
            self.settings.frontend_url.trim_end_matches('/'),
            token
        );
        let body = format!("To reset your password, click the link below:\n{reset_link}");

        // Fire-and-forget: a failed delivery is logged but does not undo
        // the stored token.
        if let Err(err) = self
            .mailer
            .send(&user.email, "Password Reset Request", &body)
            .await
        {
            tracing::warn!(user_id = user.user_id, error = %err, "reset email failed to send");
        }

        Ok(true)
    }

    async fn reset_password(&self, token: &str, new_password: &str) -> Result<bool, AppError> {
        if !self.reset_tokens.validate(token) {
            // consume() clears an expired entry as a side effect
            self.reset_tokens.consume(token);
            return Ok(false);
        }

        if !validate_password_strength(new_password, &self.settings.password_requirements) {
            return Err(AppError::InvalidInput(
                "Password does not meet complexity requirements.".to_string(),
            ));
        }

        let Some(user_id) = self.reset_tokens.owner(token) else {
            return Ok(false);
        };
        if self.users.find_by_id(user_id).await?.is_none() {
            return Ok(false);
        }

        let hash = hash_password(new_password)?;
        let Some(user_id) = self.reset_tokens.consume(token) else {
            return Ok(false);
        };
        self.users.set_password_hash(user_id, hash).await?;

        Ok(true)
    }

    fn validate_token(&self, token: &str) -> Result<bool, AppError> {
        self.jwt.validate_token(token)
    }

    async fn validate_password(
        &self,
        token: &str,
        password: &str,
    ) -> Result<PasswordCheck, AppError> {
        let user_id = self
            .jwt
            .claims(token)
            .and_then(|claims| claims.uid.parse::<i64>().ok());

        let Some(user_id) = user_id else {
            return Ok(PasswordCheck::MissingUserClaim);
        };

        let matched = match self.users.find_by_id(user_id).await? {
            Some(user) => verify_password(&user.password_hash, password),
            None => false,
        };

        Ok(if matched {
            PasswordCheck::Valid
        } else {
            PasswordCheck::Invalid
        })
    }
}
