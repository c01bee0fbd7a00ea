use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_API_PREFIX: &str = "/api/v1";

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub api_prefix: String,
    pub session_file: PathBuf,
    /// Per-request transport timeout. `None` waits for the backend indefinitely.
    pub request_timeout: Option<Duration>,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let session_file = match std::env::var("SESSION_FILE") {
            Ok(path) => PathBuf::from(path),
            Err(_) => default_session_file()?,
        };

        Ok(Config {
            base_url: std::env::var("API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            api_prefix: std::env::var("API_PREFIX")
                .unwrap_or_else(|_| DEFAULT_API_PREFIX.to_string()),
            session_file,
            request_timeout: parse_timeout(std::env::var("REQUEST_TIMEOUT_SECS").ok().as_deref())?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Configuration pointing at `base_url` with every other setting defaulted.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Config {
            base_url: base_url.into(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            session_file: PathBuf::from("session.json"),
            request_timeout: None,
            rust_log: "info".to_string(),
        }
    }

    /// Root of the versioned API, e.g. `http://localhost:8000/api/v1`.
    pub fn api_url(&self) -> String {
        let prefix = self.api_prefix.trim_matches('/');
        if prefix.is_empty() {
            self.root_url()
        } else {
            format!("{}/{}", self.root_url(), prefix)
        }
    }

    pub fn root_url(&self) -> String {
        self.base_url.trim_end_matches('/').to_string()
    }
}

fn default_session_file() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Failed to determine home directory for SESSION_FILE")?;
    Ok(home.join(".resume-client").join("session.json"))
}

/// Unset or `0` means no timeout.
fn parse_timeout(raw: Option<&str>) -> Result<Option<Duration>> {
    let Some(value) = raw else {
        return Ok(None);
    };
    let secs = value
        .trim()
        .parse::<u64>()
        .context("REQUEST_TIMEOUT_SECS must be a whole number of seconds")?;
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}
