// src/common/config.rs
//! Process-wide configuration loaded once at startup.
//!
//! Every value comes from the environment (optionally seeded from a `.env` file by
//! `dotenv`). Required keys that are missing or empty abort startup; nothing here is
//! re-read or mutated while the server runs.

use chrono::Duration;
use std::collections::HashSet;
use std::env;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required configuration key {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// A configuration value that must never appear in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

/// Google OAuth client registration
#[derive(Debug, Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: Secret,
    pub redirect_uri: String,
}

/// Outbound mail server settings
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: Secret,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: Secret,
    pub jwt_secret: Secret,
    pub google: GoogleOAuthConfig,
    pub smtp: SmtpConfig,
    pub frontend_url: String,
    pub port: u16,
    pub bcrypt_cost: u32,
    pub session_ttl: Duration,
    pub verification_ttl: Duration,
    pub blacklist_prune_interval: std::time::Duration,
    pub cors_origins: Vec<String>,
    pub admin_emails: HashSet<String>,
}

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_SESSION_TTL_HOURS: i64 = 24;
const DEFAULT_VERIFICATION_TTL_MINUTES: i64 = 3;
const DEFAULT_PRUNE_INTERVAL_SECS: u64 = 3600;
const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;
const MAX_VERIFICATION_TTL_MINUTES: i64 = 60 * 24 * 365;
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000";

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bcrypt_cost = parsed(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                reason: "must be between 4 and 31".to_string(),
            });
        }

        let session_hours = parsed(&lookup, "SESSION_TTL_HOURS", DEFAULT_SESSION_TTL_HOURS)?;
        let verification_minutes = parsed(
            &lookup,
            "VERIFICATION_TTL_MINUTES",
            DEFAULT_VERIFICATION_TTL_MINUTES,
        )?;
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&session_hours) {
            return Err(ConfigError::Invalid {
                key: "SESSION_TTL_HOURS",
                reason: format!("must be between 1 and {}", MAX_SESSION_TTL_HOURS),
            });
        }
        if !(1..=MAX_VERIFICATION_TTL_MINUTES).contains(&verification_minutes) {
            return Err(ConfigError::Invalid {
                key: "VERIFICATION_TTL_MINUTES",
                reason: format!("must be between 1 and {}", MAX_VERIFICATION_TTL_MINUTES),
            });
        }

        let prune_secs = parsed(
            &lookup,
            "BLACKLIST_PRUNE_INTERVAL_SECS",
            DEFAULT_PRUNE_INTERVAL_SECS,
        )?;

        let cors_origins = optional(&lookup, "CORS_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        // Parse admin emails from comma-separated env var
        let admin_emails = optional(&lookup, "ADMIN_EMAILS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            database_url: Secret::new(required(&lookup, "DATABASE_URL")?),
            jwt_secret: Secret::new(required(&lookup, "JWT_SECRET")?),
            google: GoogleOAuthConfig {
                client_id: required(&lookup, "GOOGLE_CLIENT_ID")?,
                client_secret: Secret::new(required(&lookup, "GOOGLE_CLIENT_SECRET")?),
                redirect_uri: required(&lookup, "GOOGLE_REDIRECT_URI")?,
            },
            smtp: SmtpConfig {
                server: required(&lookup, "SMTP_SERVER")?,
                port: parse_value("SMTP_PORT", &required(&lookup, "SMTP_PORT")?)?,
                username: required(&lookup, "SMTP_USERNAME")?,
                password: Secret::new(required(&lookup, "SMTP_PASSWORD")?),
            },
            frontend_url: required(&lookup, "FRONTEND_URL")?
                .trim_end_matches('/')
                .to_string(),
            port: parsed(&lookup, "PORT", DEFAULT_PORT)?,
            bcrypt_cost,
            session_ttl: Duration::hours(session_hours),
            verification_ttl: Duration::minutes(verification_minutes),
            blacklist_prune_interval: std::time::Duration::from_secs(prune_secs),
            cors_origins,
            admin_emails,
        })
    }
}

fn optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, key).ok_or(ConfigError::Missing(key))
}

fn parsed<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match optional(lookup, key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_value<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}

#[cfg(test)]
pub(crate) fn test_values() -> std::collections::HashMap<&'static str, &'static str> {
    [
        ("DATABASE_URL", "sqlite::memory:"),
        ("JWT_SECRET", "test-secret-key-for-testing-only"),
        ("GOOGLE_CLIENT_ID", "test-client-id.apps.googleusercontent.com"),
        ("GOOGLE_CLIENT_SECRET", "test-client-secret"),
        ("GOOGLE_REDIRECT_URI", "http://localhost:8080/auth/google/callback"),
        ("SMTP_SERVER", "smtp.example.com"),
        ("SMTP_PORT", "465"),
        ("SMTP_USERNAME", "noreply@example.com"),
        ("SMTP_PASSWORD", "smtp-password"),
        ("FRONTEND_URL", "http://localhost:3000/"),
        ("BCRYPT_COST", "4"),
        ("ADMIN_EMAILS", "Root@Example.com, ops@example.com"),
    ]
    .into_iter()
    .collect()
}
