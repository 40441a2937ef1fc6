//! Bootstrap configuration.
//!
//! # Responsibility
//! - Decide which backend is active and where its data lives.
//! - Carry logging settings for `init_logging`.
//!
//! # Invariants
//! - Unknown backend names and log levels are rejected, never defaulted.
//! - The rest backend always has an API base.

use crate::adapter::BackendKind;
use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_BACKEND: &str = "LINKBOARD_BACKEND";
pub const ENV_DB_PATH: &str = "LINKBOARD_DB_PATH";
pub const ENV_SEED_DIR: &str = "LINKBOARD_SEED_DIR";
pub const ENV_API_BASE: &str = "LINKBOARD_API_BASE";
pub const ENV_LOG_LEVEL: &str = "LINKBOARD_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "LINKBOARD_LOG_DIR";

/// Logging settings; see `logging::init_logging`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// One of `trace|debug|info|warn|error`.
    pub level: &'static str,
    /// Absolute directory for rolling log files.
    pub dir: PathBuf,
}

/// Resolved bootstrap configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    pub backend: BackendKind,
    /// Local store file. `None` keeps the store in memory.
    pub db_path: Option<PathBuf>,
    /// Directory holding `links.json` / `notice.txt` used to seed the local store.
    pub seed_dir: Option<PathBuf>,
    /// Root of the board REST API.
    pub api_base: Option<String>,
    /// `None` disables file logging.
    pub logging: Option<LogSettings>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Local,
            db_path: None,
            seed_dir: None,
            api_base: None,
            logging: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnknownBackend(String),
    MissingApiBase,
    InvalidLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownBackend(value) => write!(
                f,
                "unknown backend `{value}` in {ENV_BACKEND}; expected local|realtime|rest"
            ),
            Self::MissingApiBase => write!(f, "{ENV_API_BASE} is required for the rest backend"),
            Self::InvalidLogLevel(message) => write!(f, "{message}"),
        }
    }
}

impl Error for ConfigError {}

impl BoardConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let backend = match get(ENV_BACKEND) {
            Some(value) => {
                BackendKind::parse(&value).ok_or(ConfigError::UnknownBackend(value))?
            }
            None => BackendKind::Local,
        };

        let api_base = get(ENV_API_BASE);
        if backend == BackendKind::Rest && api_base.is_none() {
            return Err(ConfigError::MissingApiBase);
        }

        let logging = match get(ENV_LOG_DIR) {
            Some(dir) => {
                let level = match get(ENV_LOG_LEVEL) {
                    Some(level) => normalize_level(&level).map_err(ConfigError::InvalidLogLevel)?,
                    None => default_log_level(),
                };
                Some(LogSettings {
                    level,
                    dir: PathBuf::from(dir),
                })
            }
            None => None,
        };

        Ok(Self {
            backend,
            db_path: get(ENV_DB_PATH).map(PathBuf::from),
            seed_dir: get(ENV_SEED_DIR).map(PathBuf::from),
            api_base,
            logging,
        })
    }
}
