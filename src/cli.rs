//! Command-line argument parsing for doc-analytics.
//!
//! Flags override the configuration file, which overrides the environment.

use crate::config::{Config, Locale};
use crate::error::{AppError, Result};
use crate::tui::headless::{parse_size, OutputFormat};
use clap::Parser;
use std::path::PathBuf;

/// Terminal analytics over an embedded document database and a Cube.js report.
#[derive(Parser, Debug)]
#[command(name = "doc-analytics")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(long, value_name = "PATH", env = "DOC_ANALYTICS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Cube.js REST API base URL (e.g., http://localhost:4002/cubejs-api/v1)
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Cube.js API token
    #[arg(long, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Language for column headers and messages (ru or en)
    #[arg(long, value_name = "LOCALE")]
    pub locale: Option<String>,

    /// Initial grid page size (10, 20, 50 or 100)
    #[arg(long, value_name = "N")]
    pub page_size: Option<usize>,

    /// Do not query Cube.js
    #[arg(long)]
    pub no_remote: bool,

    /// Serve the remote report from the built-in mock client
    #[arg(long, conflicts_with = "no_remote")]
    pub mock_analytics: bool,

    /// Create the schema without the sample data
    #[arg(long)]
    pub no_seed: bool,

    // === Headless mode options ===
    /// Run in headless mode (no terminal UI, for testing/automation)
    #[arg(long)]
    pub headless: bool,

    /// Comma-separated events to execute in headless mode (e.g., "key:f5,wait:100ms")
    #[arg(long, value_name = "EVENTS", conflicts_with = "script")]
    pub events: Option<String>,

    /// Path to script file with events (use "-" for stdin)
    #[arg(long, value_name = "PATH")]
    pub script: Option<String>,

    /// Screen size for headless mode (WIDTHxHEIGHT)
    #[arg(long, value_name = "SIZE", default_value = "120x40")]
    pub size: String,

    /// Output format for headless mode
    #[arg(long, value_name = "FORMAT", value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Write output to file instead of stdout
    #[arg(long, value_name = "PATH")]
    pub output_file: Option<PathBuf>,

    /// Stop on first assertion failure
    #[arg(long)]
    pub fail_fast: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Applies flag values on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut Config) -> Result<()> {
        if let Some(ref url) = self.api_url {
            config.analytics.api_url = Some(url.clone());
        }
        if let Some(ref token) = self.token {
            config.analytics.token = Some(token.clone());
        }
        if let Some(ref locale) = self.locale {
            config.ui.locale = locale.parse::<Locale>()?;
        }
        if let Some(page_size) = self.page_size {
            config.ui.page_size = page_size;
        }
        if self.no_remote {
            config.analytics.enabled = false;
        }
        if self.mock_analytics {
            config.analytics.enabled = true;
        }
        Ok(())
    }

    /// Validates headless mode arguments.
    pub fn validate_headless(&self) -> Result<()> {
        if !self.headless {
            return Ok(());
        }

        if self.events.is_none() && self.script.is_none() {
            return Err(AppError::config("--headless requires --events or --script"));
        }

        parse_size(&self.size)?;
        Ok(())
    }
}
