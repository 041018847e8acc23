use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "BK Clinic";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Key under which the auth token is persisted in the local store.
pub const TOKEN_KEY: &str = "Token";

/// Backend used when `BKCLINIC_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/";

/// Per-request timeout for backend calls.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// How long the binary waits for all dashboard fetches to settle.
pub const DASHBOARD_SETTLE_SECS: u64 = 20;

const ENV_API_URL: &str = "BKCLINIC_API_URL";
const ENV_DATA_DIR: &str = "BKCLINIC_DATA_DIR";
const ENV_EMAIL: &str = "BKCLINIC_EMAIL";
const ENV_PASSWORD: &str = "BKCLINIC_PASSWORD";

/// Log filter used when `RUST_LOG` is absent.
pub fn default_log_filter() -> String {
    "bkclinic_lib=info,bkclinic=info,warn".to_string()
}

/// Get the application data directory.
/// ~/BKClinic/ unless overridden by `BKCLINIC_DATA_DIR`.
pub fn app_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("BKClinic")
}

/// Get the durable key-value store file (holds the auth token).
pub fn storage_path() -> PathBuf {
    app_data_dir().join("storage.json")
}

/// Settings for talking to the clinic backend.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub storage_path: PathBuf,
    /// Credentials for a non-interactive login, if provided.
    pub credentials: Option<(String, String)>,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            storage_path: storage_path(),
            credentials: None,
        }
    }

    /// Read settings from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let base_url = std::env::var(ENV_API_URL).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let credentials = match (std::env::var(ENV_EMAIL), std::env::var(ENV_PASSWORD)) {
            (Ok(email), Ok(password)) => Some((email, password)),
            _ => None,
        };

        Self {
            credentials,
            ..Self::new(&base_url)
        }
    }
}
