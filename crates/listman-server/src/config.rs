//! Server configuration read from `LISTMAN_*` environment variables.

use std::time::Duration;

use crate::concurrency::MAX_LOCK_TTL;

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {key}: expected {expected}")]
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Runtime settings for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// SQLite database file.
    pub db_path: String,
    pub port: u16,
    /// Lifetime of a list lock before it auto-expires.
    pub lock_ttl: Duration,
    /// How often expired locks are swept.
    pub lock_sweep_interval: Duration,
    /// Shared token every mutating request must echo in `X-Request-Token`.
    /// When unset, all mutations are rejected.
    pub forgery_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            db_path: "listman.db".to_string(),
            port: 3000,
            lock_ttl: Duration::from_secs(30 * 60),
            lock_sweep_interval: Duration::from_secs(60),
            forgery_token: None,
        }
    }
}

impl ServerConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = ServerConfig::default();

        let db_path = lookup("LISTMAN_DB_PATH").unwrap_or(defaults.db_path);
        let port = match lookup("LISTMAN_PORT") {
            Some(value) => parse_value("LISTMAN_PORT", value, "a port number")?,
            None => defaults.port,
        };
        let lock_ttl = match lookup("LISTMAN_LOCK_TTL_SECS") {
            Some(value) => {
                let secs: u64 = parse_value("LISTMAN_LOCK_TTL_SECS", value.clone(), "seconds")?;
                let ttl = Duration::from_secs(secs);
                if ttl > MAX_LOCK_TTL {
                    return Err(ConfigError::InvalidValue {
                        key: "LISTMAN_LOCK_TTL_SECS",
                        value,
                        expected: "at most 604800 seconds",
                    });
                }
                ttl
            }
            None => defaults.lock_ttl,
        };
        let lock_sweep_interval = match lookup("LISTMAN_LOCK_SWEEP_SECS") {
            Some(value) => {
                let secs: u64 = parse_value("LISTMAN_LOCK_SWEEP_SECS", value.clone(), "seconds")?;
                if secs == 0 {
                    return Err(ConfigError::InvalidValue {
                        key: "LISTMAN_LOCK_SWEEP_SECS",
                        value,
                        expected: "a positive number of seconds",
                    });
                }
                Duration::from_secs(secs)
            }
            None => defaults.lock_sweep_interval,
        };
        let forgery_token = lookup("LISTMAN_FORGERY_TOKEN").filter(|t| !t.is_empty());

        Ok(ServerConfig {
            db_path,
            port,
            lock_ttl,
            lock_sweep_interval,
            forgery_token,
        })
    }
}

fn parse_value<T: std::str::FromStr>(
    key: &'static str,
    value: String,
    expected: &'static str,
) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            key,
            value,
            expected,
        })
}
