//! Configuration management for doc-analytics.
//!
//! Handles loading configuration from TOML files and environment variables:
//! the Cube.js endpoint used for the remote analytics query, and UI settings.

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use url::Url;

/// Default Cube.js REST endpoint (the demo's local Cube instance).
pub const DEFAULT_API_URL: &str = "http://localhost:4002/cubejs-api/v1";

/// Grid page sizes the user can cycle through.
pub const PAGE_SIZE_OPTIONS: [usize; 4] = [10, 20, 50, 100];

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Remote analytics (Cube.js) settings.
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// Terminal UI settings.
    #[serde(default)]
    pub ui: UiConfig,
}

/// Remote analytics (Cube.js) configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalyticsConfig {
    /// Base URL of the Cube.js REST API, e.g. `http://localhost:4002/cubejs-api/v1`.
    pub api_url: Option<String>,

    /// API token sent in the `Authorization` header.
    pub token: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// How many times to poll while Cube.js answers "Continue wait".
    #[serde(default = "default_max_wait_polls")]
    pub max_wait_polls: u32,

    /// Whether the remote query is issued at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_wait_polls() -> u32 {
    10
}

fn default_enabled() -> bool {
    true
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            token: None,
            timeout_secs: default_timeout_secs(),
            max_wait_polls: default_max_wait_polls(),
            enabled: default_enabled(),
        }
    }
}

impl AnalyticsConfig {
    /// Returns the configured API URL, or the default one.
    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    /// Applies `CUBEJS_API_URL` / `CUBEJS_API_TOKEN` for fields the file left unset.
    pub fn apply_env_defaults(&mut self) {
        self.apply_defaults_from(|key| std::env::var(key).ok());
    }

    /// Same as [`apply_env_defaults`](Self::apply_env_defaults) with an injectable lookup.
    pub fn apply_defaults_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.api_url.is_none() {
            self.api_url = lookup("CUBEJS_API_URL");
        }
        if self.token.is_none() {
            self.token = lookup("CUBEJS_API_TOKEN");
        }
    }

    /// Returns a display-safe description (no token) for the header bar.
    pub fn display_string(&self) -> String {
        match Url::parse(self.api_url()) {
            Ok(url) => {
                let host = url.host_str().unwrap_or("unknown");
                match url.port() {
                    Some(port) => format!("{host}:{port}"),
                    None => host.to_string(),
                }
            }
            Err(_) => self.api_url().to_string(),
        }
    }
}

/// Language used for column headers and UI messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Ru,
    En,
}

impl Locale {
    /// Returns the locale code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ru => "ru",
            Self::En => "en",
        }
    }
}

impl FromStr for Locale {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ru" | "russian" => Ok(Self::Ru),
            "en" | "english" => Ok(Self::En),
            _ => Err(AppError::config(format!(
                "Invalid locale '{s}'. Expected: ru or en"
            ))),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal UI configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UiConfig {
    /// Column header and message language.
    #[serde(default)]
    pub locale: Locale,

    /// Initial grid page size.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    20
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            page_size: default_page_size(),
        }
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("doc-analytics")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file. A missing file yields defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            AppError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Checks values serde cannot check on its own.
    pub fn validate(&self) -> Result<()> {
        let api_url = self.analytics.api_url();
        let url = Url::parse(api_url)
            .map_err(|e| AppError::config(format!("Invalid analytics api_url '{api_url}': {e}")))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(AppError::config(format!(
                "Invalid scheme '{}' in analytics api_url. Expected 'http' or 'https'",
                url.scheme()
            )));
        }

        if self.analytics.timeout_secs == 0 {
            return Err(AppError::config("analytics.timeout_secs must be positive"));
        }

        if !PAGE_SIZE_OPTIONS.contains(&self.ui.page_size) {
            return Err(AppError::config(format!(
                "Invalid ui.page_size {}. Expected one of {:?}",
                self.ui.page_size, PAGE_SIZE_OPTIONS
            )));
        }

        Ok(())
    }
}
