//! Environment-driven server configuration.
//!
//! # Invariants
//! - Every invalid value is reported with the variable that carried it.
//! - Unset variables fall back to documented defaults.

use orgchart_core::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DB_PATH_VAR: &str = "ORGCHART_DB_PATH";
pub const BIND_ADDR_VAR: &str = "ORGCHART_BIND_ADDR";
pub const LOG_LEVEL_VAR: &str = "ORGCHART_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "ORGCHART_LOG_DIR";
pub const REQUEST_TIMEOUT_VAR: &str = "ORGCHART_REQUEST_TIMEOUT_MS";
pub const BOOTSTRAP_DEPARTMENT_VAR: &str = "ORGCHART_BOOTSTRAP_DEPARTMENT";

const DEFAULT_DB_PATH: &str = "orgchart.sqlite3";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "warning", "error"];

/// Rejected configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {}=`{}`: {}", self.var, self.value, self.reason)
    }
}

impl Error for ConfigError {}

/// Runtime settings for the HTTP server process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub db_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Absolute log directory; `None` logs to stderr.
    pub log_dir: Option<PathBuf>,
    pub request_timeout: Duration,
    /// Root department name created on an empty store at startup.
    pub bootstrap_department: Option<String>,
}

impl ServerConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |var: &str| {
            lookup(var)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = PathBuf::from(read(DB_PATH_VAR).unwrap_or_else(|| DEFAULT_DB_PATH.to_string()));

        let bind_raw = read(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|err| invalid(BIND_ADDR_VAR, &bind_raw, err.to_string()))?;

        let log_level = read(LOG_LEVEL_VAR)
            .map(|value| value.to_ascii_lowercase())
            .unwrap_or_else(|| default_log_level().to_string());
        if !LOG_LEVELS.contains(&log_level.as_str()) {
            return Err(invalid(
                LOG_LEVEL_VAR,
                &log_level,
                "expected trace|debug|info|warn|error".to_string(),
            ));
        }

        let log_dir = match read(LOG_DIR_VAR) {
            Some(dir) if !Path::new(&dir).is_absolute() => {
                return Err(invalid(LOG_DIR_VAR, &dir, "must be an absolute path".to_string()));
            }
            other => other.map(PathBuf::from),
        };

        let request_timeout = match read(REQUEST_TIMEOUT_VAR) {
            None => Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            Some(raw) => match raw.parse::<u64>() {
                Ok(0) => {
                    return Err(invalid(REQUEST_TIMEOUT_VAR, &raw, "must be > 0".to_string()));
                }
                Ok(ms) => Duration::from_millis(ms),
                Err(err) => return Err(invalid(REQUEST_TIMEOUT_VAR, &raw, err.to_string())),
            },
        };

        Ok(Self {
            db_path,
            bind_addr,
            log_level,
            log_dir,
            request_timeout,
            bootstrap_department: read(BOOTSTRAP_DEPARTMENT_VAR),
        })
    }
}

fn invalid(var: &'static str, value: &str, reason: String) -> ConfigError {
    ConfigError {
        var,
        value: value.to_string(),
        reason,
    }
}
