//! Core session for doc-analytics.
//!
//! Owns the embedded database and the remote fetcher, and carries out the
//! actions the UI asks for against the [`App`] state.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::analytics::{AnalyticsClient, CubeQuery, RemoteFetcher, RemoteMessage, RemoteState};
use crate::db::DatabaseClient;
use crate::error::Result;
use crate::tui::app::{Action, App};

/// Error shown when the remote source was switched off at startup.
pub const REMOTE_DISABLED: &str = "remote analytics disabled";

/// Coordinates the local engine, the remote fetcher and the UI state.
pub struct Session {
    db: Option<Box<dyn DatabaseClient>>,
    fetcher: Option<RemoteFetcher>,
    remote_rx: Option<mpsc::Receiver<RemoteMessage>>,
}

impl Session {
    /// Creates a session. Without a client the remote source stays disabled.
    pub fn new(db: Box<dyn DatabaseClient>, client: Option<Arc<dyn AnalyticsClient>>) -> Self {
        let (fetcher, remote_rx) = match client {
            Some(client) => {
                let (fetcher, rx) = RemoteFetcher::new(client, CubeQuery::conversion_report());
                (Some(fetcher), Some(rx))
            }
            None => (None, None),
        };

        Self {
            db: Some(db),
            fetcher,
            remote_rx,
        }
    }

    /// Endpoint of the remote source, if enabled.
    pub fn endpoint(&self) -> Option<String> {
        self.fetcher.as_ref().map(RemoteFetcher::endpoint)
    }

    /// Issues the initial remote fetch, or marks the remote source disabled.
    pub fn start(&mut self, app: &mut App) {
        match self.fetcher.as_mut() {
            Some(fetcher) => {
                let id = fetcher.start();
                app.remote.begin(id);
            }
            None => {
                info!("Remote analytics disabled");
                app.remote = RemoteState::disabled(REMOTE_DISABLED);
            }
        }
        app.sync_spinner();
    }

    /// Performs an action requested by the UI.
    pub async fn perform(&mut self, app: &mut App, action: Action) {
        debug!("Performing {:?}", action);

        match action {
            Action::ExecuteLocal => {
                app.commit_query();
                match self.db.as_deref() {
                    Some(db) => {
                        app.view.execute_local(db).await;
                        if app.view.error().is_none() {
                            app.grid.rewind();
                        }
                    }
                    None => warn!("Execute requested after the database was closed"),
                }
            }
            Action::SwitchToRemote => app.view.switch_to_remote(&app.remote),
            Action::ShowLocal => app.view.show_local(),
            Action::RefreshRemote => match self.fetcher.as_mut() {
                Some(fetcher) => {
                    let id = fetcher.start();
                    app.remote.begin(id);
                    app.view.sync_remote(&app.remote);
                    app.sync_spinner();
                }
                None => debug!("Refresh ignored: remote analytics disabled"),
            },
        }

        app.sync_grid();
    }

    /// Applies a finished remote fetch. Returns false for superseded fetches.
    pub fn apply(&mut self, app: &mut App, message: RemoteMessage) -> bool {
        let id = message.id;
        if !app.remote.complete(id, message.outcome) {
            debug!("Dropping stale remote result {}", id);
            return false;
        }

        info!(
            "Remote fetch {} settled ({} rows)",
            id,
            app.remote.result().map_or(0, |r| r.len())
        );
        app.view.sync_remote(&app.remote);
        app.sync_spinner();
        app.sync_grid();
        true
    }

    /// Waits for the next remote message. Never resolves when the remote
    /// source is disabled.
    pub async fn next_remote(&mut self) -> Option<RemoteMessage> {
        match self.remote_rx.as_mut() {
            Some(rx) => rx.recv().await,
            None => std::future::pending().await,
        }
    }

    /// Waits until the remote fetch in flight settles, or `timeout` elapses.
    /// Returns whether the remote source is idle afterwards.
    pub async fn settle(&mut self, app: &mut App, timeout: Duration) -> bool {
        let wait = async {
            while app.remote.is_loading() {
                match self.next_remote().await {
                    Some(message) => {
                        self.apply(app, message);
                    }
                    None => break,
                }
            }
        };

        if tokio::time::timeout(timeout, wait).await.is_err() {
            warn!("Remote fetch still running after {:?}", timeout);
        }
        !app.remote.is_loading()
    }

    /// Cancels remote work and closes the database.
    pub async fn close(&mut self) -> Result<()> {
        if let Some(mut fetcher) = self.fetcher.take() {
            fetcher.cancel();
        }
        self.remote_rx = None;
        if let Some(db) = self.db.take() {
            db.close().await?;
        }
        Ok(())
    }
}
