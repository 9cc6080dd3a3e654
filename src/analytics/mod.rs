//! Remote analytics (Cube.js) integration.
//!
//! Provides the query shape, a trait for analytics clients, the REST and mock
//! implementations, and the background fetcher that feeds [`RemoteState`].

pub mod client;
pub mod fetcher;
pub mod mock;
pub mod query;
pub mod types;

pub use client::{CubeClient, CubeConfig};
pub use fetcher::{FetchId, RemoteFetcher, RemoteMessage};
pub use mock::MockAnalyticsClient;
pub use query::{members, CubeQuery, OrderDirection};
pub use types::{parse_load_body, LoadOutcome, PivotRow, RemoteState, ResultSet};

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::AnalyticsConfig;
use crate::error::Result;

/// Trait for clients that can run a Cube.js query.
///
/// Implementations must be thread-safe (Send + Sync) so fetches can run on
/// background tasks.
#[async_trait]
pub trait AnalyticsClient: Send + Sync {
    /// Runs the query and returns its rows.
    async fn load(&self, query: &CubeQuery) -> Result<ResultSet>;

    /// Short display form of the endpoint (no secrets).
    fn endpoint(&self) -> String;
}

/// Creates the analytics client for the given configuration.
///
/// `mock` selects [`MockAnalyticsClient`] regardless of the configured URL.
pub fn create_client(config: &AnalyticsConfig, mock: bool) -> Result<Arc<dyn AnalyticsClient>> {
    if mock {
        return Ok(Arc::new(MockAnalyticsClient::new()));
    }
    Ok(Arc::new(CubeClient::new(CubeConfig::from(config))?))
}
