//! Cube.js REST client implementation.
//!
//! Issues `GET {api_url}/load?query=<json>` and polls while the server answers
//! "Continue wait".

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::analytics::query::CubeQuery;
use crate::analytics::types::{parse_load_body, LoadOutcome, ResultSet};
use crate::analytics::AnalyticsClient;
use crate::config::AnalyticsConfig;
use crate::error::{AppError, Result};

/// Delay between "Continue wait" polls.
const WAIT_POLL_DELAY_MS: u64 = 500;

/// Maximum number of attempts for transient transport errors.
const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Base delay for exponential backoff (milliseconds).
const RETRY_BASE_DELAY_MS: u64 = 500;

/// Cube.js client configuration.
#[derive(Debug, Clone)]
pub struct CubeConfig {
    /// REST API base, e.g. `http://localhost:4002/cubejs-api/v1`.
    pub api_url: String,
    /// Value of the `Authorization` header, if any.
    pub token: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Polls allowed while the result is being computed.
    pub max_wait_polls: u32,
}

impl CubeConfig {
    /// Creates a config for the given API base URL.
    pub fn new(api_url: impl Into<String>) -> Self {
        let defaults = AnalyticsConfig::default();
        Self {
            api_url: api_url.into(),
            token: None,
            timeout_secs: defaults.timeout_secs,
            max_wait_polls: defaults.max_wait_polls,
        }
    }

    /// Sets the API token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

impl From<&AnalyticsConfig> for CubeConfig {
    fn from(config: &AnalyticsConfig) -> Self {
        Self {
            api_url: config.api_url().to_string(),
            token: config.token.clone(),
            timeout_secs: config.timeout_secs,
            max_wait_polls: config.max_wait_polls,
        }
    }
}

/// HTTP client for the Cube.js REST API.
#[derive(Debug, Clone)]
pub struct CubeClient {
    config: CubeConfig,
    client: Client,
}

impl CubeClient {
    /// Creates a new client; fails if the URL is unusable.
    pub fn new(config: CubeConfig) -> Result<Self> {
        Self::load_url(&config.api_url, &CubeQuery::conversion_report())?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::remote(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Builds the `/load` URL with the query JSON in the `query` parameter.
    pub fn load_url(api_url: &str, query: &CubeQuery) -> Result<Url> {
        let base = format!("{}/load", api_url.trim_end_matches('/'));
        let mut url = Url::parse(&base)
            .map_err(|e| AppError::remote(format!("Invalid API URL '{}': {}", api_url, e)))?;

        let json = query
            .to_json()
            .map_err(|e| AppError::remote(format!("Failed to encode query: {}", e)))?;
        url.query_pairs_mut().append_pair("query", &json);

        Ok(url)
    }

    /// Determines if a request error is retryable.
    fn is_retryable_request_error(error: &reqwest::Error) -> bool {
        error.is_timeout() || error.is_connect()
    }

    /// Sends one request, retrying transport failures with backoff.
    async fn send_once(&self, url: &Url) -> Result<(u16, String)> {
        let mut delay = Duration::from_millis(RETRY_BASE_DELAY_MS);
        let mut attempt = 1;

        loop {
            let mut request = self.client.get(url.clone());
            if let Some(token) = &self.config.token {
                request = request.header("Authorization", token);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    let body = response.text().await.map_err(|e| {
                        AppError::remote(format!("Failed to read response: {}", e))
                    })?;
                    return Ok((status, body));
                }
                Err(e) => {
                    let retryable = Self::is_retryable_request_error(&e);
                    let error = if e.is_timeout() {
                        AppError::remote("Request timed out")
                    } else if e.is_connect() {
                        AppError::remote(format!(
                            "Failed to connect to {}",
                            self.config.api_url
                        ))
                    } else {
                        AppError::remote(format!("Request failed: {}", e))
                    };

                    if !retryable || attempt >= MAX_RETRY_ATTEMPTS {
                        return Err(error);
                    }

                    warn!(
                        "Cube.js request failed (attempt {}), retrying in {:?}: {}",
                        attempt, delay, error
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
            }
        }
    }
}

#[async_trait]
impl AnalyticsClient for CubeClient {
    async fn load(&self, query: &CubeQuery) -> Result<ResultSet> {
        let url = Self::load_url(&self.config.api_url, query)?;

        for poll in 0..=self.config.max_wait_polls {
            debug!("Cube.js load request (poll {})", poll);
            let (status, body) = self.send_once(&url).await?;

            match parse_load_body(status, &body)? {
                LoadOutcome::Ready(result) => {
                    debug!("Cube.js returned {} rows", result.len());
                    return Ok(result);
                }
                LoadOutcome::ContinueWait => {
                    tokio::time::sleep(Duration::from_millis(WAIT_POLL_DELAY_MS)).await;
                }
            }
        }

        Err(AppError::remote(format!(
            "Query still computing after {} polls",
            self.config.max_wait_polls
        )))
    }

    fn endpoint(&self) -> String {
        AnalyticsConfig {
            api_url: Some(self.config.api_url.clone()),
            ..AnalyticsConfig::default()
        }
        .display_string()
    }
}
