//! Background remote fetches.
//!
//! Each fetch runs as a spawned task and reports back over an mpsc channel.
//! Starting a new fetch cancels the previous one, and every message carries the
//! request id so the receiver can drop late answers.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::analytics::query::CubeQuery;
use crate::analytics::types::ResultSet;
use crate::analytics::AnalyticsClient;
use crate::error::Result;

/// Identifier of one remote fetch.
pub type FetchId = u64;

/// Message sent by a fetch task when it finishes.
#[derive(Debug)]
pub struct RemoteMessage {
    pub id: FetchId,
    pub outcome: Result<ResultSet>,
}

/// Spawns remote fetches, one at a time.
pub struct RemoteFetcher {
    client: Arc<dyn AnalyticsClient>,
    query: CubeQuery,
    tx: mpsc::Sender<RemoteMessage>,
    next_id: FetchId,
    current: Option<CancellationToken>,
}

impl RemoteFetcher {
    /// Creates a fetcher and the receiving end of its channel.
    pub fn new(
        client: Arc<dyn AnalyticsClient>,
        query: CubeQuery,
    ) -> (Self, mpsc::Receiver<RemoteMessage>) {
        let (tx, rx) = mpsc::channel(8);
        let fetcher = Self {
            client,
            query,
            tx,
            next_id: 0,
            current: None,
        };
        (fetcher, rx)
    }

    /// Describes the endpoint being queried.
    pub fn endpoint(&self) -> String {
        self.client.endpoint()
    }

    /// Starts a fetch, cancelling any fetch still running. Returns its id.
    pub fn start(&mut self) -> FetchId {
        self.cancel();

        self.next_id += 1;
        let id = self.next_id;
        let cancel = CancellationToken::new();
        self.current = Some(cancel.clone());

        let client = Arc::clone(&self.client);
        let query = self.query.clone();
        let tx = self.tx.clone();

        info!("Starting remote fetch {} against {}", id, client.endpoint());

        tokio::spawn(async move {
            tokio::select! {
                outcome = client.load(&query) => {
                    if let Err(e) = &outcome {
                        warn!("Remote fetch {} failed: {}", id, e);
                    }
                    if tx.send(RemoteMessage { id, outcome }).await.is_err() {
                        debug!("Remote fetch {} finished after receiver closed", id);
                    }
                }
                _ = cancel.cancelled() => {
                    debug!("Remote fetch {} cancelled", id);
                }
            }
        });

        id
    }

    /// Cancels the running fetch, if any.
    pub fn cancel(&mut self) {
        if let Some(token) = self.current.take() {
            token.cancel();
        }
    }
}

impl Drop for RemoteFetcher {
    fn drop(&mut self) {
        self.cancel();
    }
}
