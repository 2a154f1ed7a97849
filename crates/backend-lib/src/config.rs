// ============================
// olympiad-backend-lib/src/config.rs
// ============================
//! Configuration management.
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Log level
    pub log_level: String,
    /// Base URL the reset-link email points at
    pub frontend_url: String,
    /// Reset token TTL in seconds
    pub reset_token_ttl_secs: u64,
    /// JWT signing configuration
    pub jwt: JwtSettings,
    /// Password requirements for new passwords
    pub password_requirements: PasswordRequirements,
}

/// JWT signing configuration.
///
/// Values are kept as raw strings and checked at token issue/validate time,
/// so a missing key fails the request that needs it with a named-key error
/// rather than being papered over with a default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JwtSettings {
    /// Symmetric HS256 signing secret
    pub secret: String,
    /// Expected `iss` claim
    pub issuer: String,
    /// Expected `aud` claim
    pub audience: String,
    /// Token lifetime in minutes. The unit is minutes, full stop; an older
    /// deployment read this key as hours and that reading is retired.
    pub expiration_minutes: String,
}

/// Password complexity requirements
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordRequirements {
    /// Minimum password length
    pub min_length: usize,
    /// Require uppercase letters
    pub require_uppercase: bool,
    /// Require lowercase letters
    pub require_lowercase: bool,
    /// Require digits
    pub require_digit: bool,
    /// Require special characters
    pub require_special: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".parse().unwrap(),
            log_level: "info".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            reset_token_ttl_secs: 60 * 60, // 1 hour
            jwt: JwtSettings::default(),
            password_requirements: PasswordRequirements::default(),
        }
    }
}

impl Default for PasswordRequirements {
    fn default() -> Self {
        Self {
            min_length: 10,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_special: true,
        }
    }
}

impl Settings {
    /// Load settings from `config.toml` overridden by `OLYMPIAD_*` env vars
    /// (e.g. `OLYMPIAD_JWT__SECRET`, `OLYMPIAD_JWT__EXPIRATION_MINUTES`).
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    /// Load settings from an explicit config file path
    pub fn load_from(path: &str) -> Result<Self> {
        let settings: Settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("OLYMPIAD_").split("__"))
            .extract()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Sanity-check values that have no meaningful zero state
    pub fn validate(&self) -> Result<()> {
        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.log_level.as_str()) {
            anyhow::bail!("invalid log level: {}", self.log_level);
        }
        if self.reset_token_ttl_secs == 0 {
            anyhow::bail!("reset_token_ttl_secs must be positive");
        }
        if self.password_requirements.min_length < 8 {
            anyhow::bail!("password min_length must be at least 8");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_pass_validation() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.reset_token_ttl_secs, 3600);
    }

    #[test]
    fn invalid_log_level_rejected() {
        let mut settings = Settings::default();
        settings.log_level = "verbose".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn zero_reset_ttl_rejected() {
        let mut settings = Settings::default();
        settings.reset_token_ttl_secs = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn weak_min_length_rejected() {
        let mut settings = Settings::default();
        settings.password_requirements.min_length = 4;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn shipped_dev_config_is_complete() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config.toml");
        let settings = Settings::load_from(path).unwrap();

        // a fresh checkout must be able to issue tokens out of the box
        assert!(!settings.jwt.secret.trim().is_empty());
        assert!(!settings.jwt.issuer.trim().is_empty());
        assert!(!settings.jwt.audience.trim().is_empty());
        assert!(settings.jwt.expiration_minutes.parse::<i64>().unwrap() > 0);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
            bind_addr = "127.0.0.1:4100"
            log_level = "debug"

            [jwt]
            secret = "file-secret"
            issuer = "olympiad-api"
            audience = "olympiad-spa"
            expiration_minutes = "45"
            "#,
        )
        .unwrap();

        let settings = Settings::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(settings.bind_addr.to_string(), "127.0.0.1:4100");
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.jwt.secret, "file-secret");
        assert_eq!(settings.jwt.expiration_minutes, "45");
        // keys absent from the file keep their defaults
        assert_eq!(settings.frontend_url, "http://localhost:5173");
    }
}
