//! Configuration module for the SmartStore client

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use url::Url;

use crate::providers::traits::{StoreError, StoreResult};

/// Default Commerce API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.commerce.naver.com/external";
/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Default configuration file
pub const DEFAULT_CONFIG_FILE: &str = "config.json";
/// Default append-only log file
pub const DEFAULT_LOG_FILE: &str = "naver_api.log";

/// Environment variable selecting the configuration file
pub const CONFIG_PATH_ENV: &str = "SMARTSTORE_CONFIG";
/// Prefix for per-key environment overrides (`SMARTSTORE_ACCESS_TOKEN`, ...)
pub const ENV_PREFIX: &str = "SMARTSTORE";

/// Placeholder values written into a freshly created configuration file
pub const PLACEHOLDER_CLIENT_ID: &str = "YOUR_CLIENT_ID";
pub const PLACEHOLDER_CLIENT_SECRET: &str = "YOUR_CLIENT_SECRET";
pub const PLACEHOLDER_ACCESS_TOKEN: &str = "YOUR_ACCESS_TOKEN";

/// API credentials and connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_log_file() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_FILE)
}

impl Settings {
    /// Configuration file path: `$SMARTSTORE_CONFIG` or `config.json`
    pub fn default_path() -> PathBuf {
        std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Load settings from a JSON file with environment overrides.
    ///
    /// Configuration priority (highest to lowest):
    /// 1. Environment variables (`SMARTSTORE_CLIENT_ID`, ...)
    /// 2. The JSON file
    /// 3. Built-in defaults for `base_url`, `timeout` and `log_file`
    ///
    /// A missing file is replaced by a placeholder template and reported as a
    /// configuration error asking the user to fill it in.
    pub fn load(path: &Path) -> StoreResult<Self> {
        if !path.exists() {
            write_placeholder(path)?;
            return Err(StoreError::config(format!(
                "configuration file created at {}; edit it with your real API credentials and run again",
                path.display()
            )));
        }

        let builder = Config::builder()
            .set_default("access_token", "")
            .and_then(|b| b.set_default("base_url", DEFAULT_BASE_URL))
            .and_then(|b| b.set_default("timeout", DEFAULT_TIMEOUT_SECS as i64))
            .and_then(|b| b.set_default("log_file", DEFAULT_LOG_FILE))
            .map_err(config_error)?
            .add_source(File::from(path).format(FileFormat::Json))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        let settings: Settings = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(config_error)?;

        settings.validate_connection()?;
        info!(path = %path.display(), base_url = %settings.base_url, "Configuration loaded");
        Ok(settings)
    }

    /// Check `base_url` and `timeout`
    pub fn validate_connection(&self) -> StoreResult<()> {
        Url::parse(&self.base_url)
            .map_err(|e| StoreError::config(format!("invalid base_url {:?}: {}", self.base_url, e)))?;
        if self.timeout == 0 {
            return Err(StoreError::config("timeout must be at least 1 second"));
        }
        Ok(())
    }

    /// Require real `client_id` / `client_secret` values (needed to sign).
    pub fn validate_client(&self) -> StoreResult<()> {
        require_real("client_id", &self.client_id)?;
        require_real("client_secret", &self.client_secret)
    }

    /// Require real client credentials and no placeholder token.
    ///
    /// An empty token is accepted: requests are then sent without an
    /// `Authorization` header.
    pub fn validate(&self) -> StoreResult<()> {
        self.validate_client()?;
        if is_placeholder(&self.access_token) {
            return Err(StoreError::config(
                "access_token is still a placeholder; run `issue-token` first",
            ));
        }
        if self.access_token.is_empty() {
            warn!("No access_token configured; requests will be sent without a bearer token");
        }
        Ok(())
    }

    /// Placeholder template written when no configuration file exists
    pub fn placeholder() -> Self {
        Settings {
            client_id: PLACEHOLDER_CLIENT_ID.to_string(),
            client_secret: PLACEHOLDER_CLIENT_SECRET.to_string(),
            access_token: PLACEHOLDER_ACCESS_TOKEN.to_string(),
            ..Settings::default()
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            client_id: String::new(),
            client_secret: String::new(),
            access_token: String::new(),
            base_url: default_base_url(),
            timeout: DEFAULT_TIMEOUT_SECS,
            log_file: default_log_file(),
        }
    }
}

/// Rewrite `access_token` in the configuration file, keeping every other key.
pub fn persist_access_token(path: &Path, token: &str) -> StoreResult<()> {
    let raw = fs::read_to_string(path)
        .map_err(|e| StoreError::config(format!("cannot read {}: {}", path.display(), e)))?;
    let mut document: Map<String, Value> = serde_json::from_str(&raw)
        .map_err(|e| StoreError::config(format!("{} is not a JSON object: {}", path.display(), e)))?;

    document.insert("access_token".to_string(), Value::String(token.to_string()));
    write_json(path, &Value::Object(document))?;

    info!(path = %path.display(), "access_token saved");
    Ok(())
}

/// Whether a credential still holds a template value
pub fn is_placeholder(value: &str) -> bool {
    matches!(
        value,
        PLACEHOLDER_CLIENT_ID | PLACEHOLDER_CLIENT_SECRET | PLACEHOLDER_ACCESS_TOKEN
    )
}

fn require_real(key: &str, value: &str) -> StoreResult<()> {
    if value.trim().is_empty() {
        return Err(StoreError::config(format!("{key} is empty")));
    }
    if is_placeholder(value) {
        return Err(StoreError::config(format!(
            "{key} is still the placeholder {value:?}; edit the configuration file"
        )));
    }
    Ok(())
}

fn write_placeholder(path: &Path) -> StoreResult<()> {
    let template = Settings::placeholder();
    let document = serde_json::json!({
        "client_id": template.client_id,
        "client_secret": template.client_secret,
        "access_token": template.access_token,
        "base_url": template.base_url,
        "timeout": template.timeout,
    });

    write_json(path, &document)?;
    warn!(path = %path.display(), "Configuration file not found; placeholder created");
    Ok(())
}

fn write_json(path: &Path, document: &Value) -> StoreResult<()> {
    let text = serde_json::to_string_pretty(document)
        .map_err(|e| StoreError::config(e.to_string()))?;
    fs::write(path, text + "\n")
        .map_err(|e| StoreError::config(format!("cannot write {}: {}", path.display(), e)))
}

fn config_error(err: config::ConfigError) -> StoreError {
    StoreError::config(err.to_string())
}
