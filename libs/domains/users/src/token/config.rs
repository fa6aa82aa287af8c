//! Token signing configuration, loaded through [`core_config::FromEnv`].

use chrono::Duration;
use core_config::{env_or_default, env_parse_or, env_required, ConfigError, FromEnv};
use std::fmt;

pub const DEFAULT_ISSUER: &str = "passer";
pub const DEFAULT_EXP_MINUTES: u32 = 60;

/// Loaded from:
/// - `JWT_SECRET_KEY` (required, must not be blank)
/// - `JWT_ISSUER` (default `passer`)
/// - `JWT_EXP_MINUTES` (default 60, must be positive)
#[derive(Clone)]
pub struct TokenConfig {
    pub secret: String,
    pub issuer: String,
    pub exp_minutes: u32,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer: DEFAULT_ISSUER.to_string(),
            exp_minutes: DEFAULT_EXP_MINUTES,
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    pub fn with_exp_minutes(mut self, minutes: u32) -> Self {
        self.exp_minutes = minutes;
        self
    }

    pub fn lifetime(&self) -> Duration {
        Duration::minutes(i64::from(self.exp_minutes))
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("exp_minutes", &self.exp_minutes)
            .finish()
    }
}

impl FromEnv for TokenConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env_required("JWT_SECRET_KEY")?;
        if secret.trim().is_empty() {
            return Err(ConfigError::ParseError {
                key: "JWT_SECRET_KEY".to_string(),
                details: "must not be blank".to_string(),
            });
        }

        let exp_minutes = env_parse_or("JWT_EXP_MINUTES", DEFAULT_EXP_MINUTES)?;
        if exp_minutes == 0 {
            return Err(ConfigError::ParseError {
                key: "JWT_EXP_MINUTES".to_string(),
                details: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            secret,
            issuer: env_or_default("JWT_ISSUER", DEFAULT_ISSUER),
            exp_minutes,
        })
    }
}
