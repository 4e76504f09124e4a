use std::time::Duration;
use thiserror::Error;
use tracing::warn;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEV_JWT_SECRET: &str = "dev-secret-change-in-production";
const DEFAULT_SESSION_EXPIRATION_DAYS: i64 = 14;
const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 60 * 60;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got {value:?}")]
    InvalidValue {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Runtime settings, read once at startup
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind_addr: String,
    /// In-memory stores are used when unset
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub session_expiration_days: i64,
    pub session_cleanup_interval: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source; `from_env` passes the
    /// process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET not set, using the development secret");
            DEV_JWT_SECRET.to_string()
        });

        let session_expiration_days = match lookup("SESSION_EXPIRATION_DAYS") {
            Some(value) => match value.parse::<i64>() {
                Ok(days) if days > 0 => days,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "SESSION_EXPIRATION_DAYS",
                        expected: "a positive number of days",
                        value,
                    })
                }
            },
            None => DEFAULT_SESSION_EXPIRATION_DAYS,
        };

        let cleanup_secs = match lookup("SESSION_CLEANUP_INTERVAL_SECS") {
            Some(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "SESSION_CLEANUP_INTERVAL_SECS",
                        expected: "a positive number of seconds",
                        value,
                    })
                }
            },
            None => DEFAULT_CLEANUP_INTERVAL_SECS,
        };

        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            jwt_secret,
            session_expiration_days,
            session_cleanup_interval: Duration::from_secs(cleanup_secs),
        })
    }
}
