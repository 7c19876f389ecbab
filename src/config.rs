//! Process-level configuration, read once at startup by the embedding
//! layer and passed into the engine as plain parameters thereafter.

use std::path::PathBuf;

pub const APP_NAME: &str = "PharmaRecall";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Days before depletion at which a restocking order should already exist.
pub const DEFAULT_LOOKAHEAD_DAYS: i64 = 7;

/// Default log filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    "info,pharmarecall=debug".to_string()
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub lookahead_days: i64,
}

impl Config {
    /// Load configuration from the environment, falling back to defaults.
    ///
    /// `PHARMARECALL_DB` — SQLite database path (default `pharmarecall.db`).
    /// `PHARMARECALL_LOOKAHEAD_DAYS` — order lookahead window (default 7);
    /// non-numeric or non-positive values fall back to the default.
    pub fn from_env() -> Self {
        let database_path = std::env::var("PHARMARECALL_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("pharmarecall.db"));

        let lookahead_days = std::env::var("PHARMARECALL_LOOKAHEAD_DAYS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|days| *days > 0)
            .unwrap_or(DEFAULT_LOOKAHEAD_DAYS);

        Config {
            database_path,
            lookahead_days,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_path: PathBuf::from("pharmarecall.db"),
            lookahead_days: DEFAULT_LOOKAHEAD_DAYS,
        }
    }
}
