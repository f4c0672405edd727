//! Configuration module for IntelloTask.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::path::PathBuf;

/// What the data layer does when a stored collection fails to deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorruptPolicy {
    /// Return `AppError::CorruptStore` to the caller and leave the stored value untouched.
    #[default]
    Surface,
    /// Log a warning, overwrite the key with an empty collection and carry on.
    Reset,
}

impl CorruptPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CorruptPolicy::Surface => "surface",
            CorruptPolicy::Reset => "reset",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "surface" | "error" => Some(CorruptPolicy::Surface),
            "reset" => Some(CorruptPolicy::Reset),
            _ => None,
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the SQLite file backing the key-value store
    pub db_path: PathBuf,
    /// Namespace prepended to the users/tasks/comments keys
    pub key_prefix: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Seed demo users and tasks into missing keys on startup
    pub seed_demo_data: bool,
    /// Handling of malformed stored collections
    pub on_corrupt: CorruptPolicy,
    /// Directory exported reports are written to
    pub report_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./data/intellotask.sqlite"),
            key_prefix: "intellotask_".to_string(),
            log_level: "info".to_string(),
            seed_demo_data: true,
            on_corrupt: CorruptPolicy::Surface,
            report_dir: PathBuf::from("./reports"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let db_path = env::var("INTELLOTASK_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let key_prefix = env::var("INTELLOTASK_KEY_PREFIX").unwrap_or(defaults.key_prefix);

        let log_level = env::var("INTELLOTASK_LOG_LEVEL").unwrap_or(defaults.log_level);

        let seed_demo_data = match env::var("INTELLOTASK_SEED_DEMO_DATA") {
            Ok(raw) => parse_bool(&raw).unwrap_or_else(|| {
                tracing::warn!(
                    "Invalid INTELLOTASK_SEED_DEMO_DATA value {:?}, using default",
                    raw
                );
                defaults.seed_demo_data
            }),
            Err(_) => defaults.seed_demo_data,
        };

        let on_corrupt = match env::var("INTELLOTASK_ON_CORRUPT") {
            Ok(raw) => CorruptPolicy::parse(&raw).unwrap_or_else(|| {
                tracing::warn!("Invalid INTELLOTASK_ON_CORRUPT value {:?}, using default", raw);
                defaults.on_corrupt
            }),
            Err(_) => defaults.on_corrupt,
        };

        let report_dir = env::var("INTELLOTASK_REPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.report_dir);

        Self {
            db_path,
            key_prefix,
            log_level,
            seed_demo_data,
            on_corrupt,
            report_dir,
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
