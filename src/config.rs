//! Runtime configuration: where the two stores live and how long requests may take.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const LOCAL_STORE_FILE: &str = "local-requests.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `None` leaves the database unconfigured.
    pub database: Option<PathBuf>,
    pub local_store: PathBuf,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database: None,
            local_store: default_local_store(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    pub fn new(database: Option<PathBuf>, local_store: Option<PathBuf>, timeout_secs: Option<u64>) -> Config {
        Config {
            database,
            local_store: local_store.unwrap_or_else(default_local_store),
            timeout: Duration::from_secs(timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        }
    }
}

/// `<data dir>/apitester/local-requests.json`, or the working directory when the
/// platform has no data dir.
pub fn default_local_store() -> PathBuf {
    match dirs::data_dir() {
        Some(dir) => dir.join("apitester").join(LOCAL_STORE_FILE),
        None => PathBuf::from(LOCAL_STORE_FILE),
    }
}
