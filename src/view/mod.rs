//! Dual-source query view.
//!
//! Holds the editor text, the last local result set, the current error and
//! which source (local SQL or remote analytics) the grid shows.

pub mod i18n;
pub mod presentation;

pub use presentation::{
    derive_grid, CellFormat, ColumnDef, ColumnWidth, Grid, GridView, LogicalField,
};

use tracing::{debug, info};

use crate::analytics::RemoteState;
use crate::config::Locale;
use crate::db::{DatabaseClient, QueryResult};

/// Default editor text: monthly estimate/contract counts and conversion per employee.
pub const CANONICAL_QUERY: &str = "SELECT
    strftime('%Y-%m', Documents.DateCreated) AS Month,
    Employees.FirstName || ' ' || Employees.LastName AS Employee,
    SUM(CASE WHEN Documents.Type = 'Estimate' THEN 1 ELSE 0 END) AS Estimates,
    SUM(CASE WHEN Documents.Type = 'Contract' THEN 1 ELSE 0 END) AS Contracts,
    CASE
        WHEN SUM(CASE WHEN Documents.Type = 'Contract' THEN 1 ELSE 0 END) > 0
        THEN ROUND((SUM(CASE WHEN Documents.Type = 'Estimate' THEN 1 ELSE 0 END) * 100.0 /
              SUM(CASE WHEN Documents.Type = 'Contract' THEN 1 ELSE 0 END)), 2)
        ELSE 0
    END AS ConversionPercent
FROM
    Documents
JOIN
    Employees ON Documents.ResponsibleEmployee = Employees.ID
GROUP BY
    Month, Employee
ORDER BY
    Month, Employee;";

/// Where the grid takes its rows from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveSource {
    #[default]
    Local,
    Remote,
}

impl ActiveSource {
    /// Short name for status lines and headless state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

/// The result set currently selected for display.
#[derive(Debug, Clone, Copy)]
pub enum ActiveResult<'a> {
    Local(&'a QueryResult),
    Remote(&'a RemoteState),
}

/// Error shown above the grid. Localized at render time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    /// Local execution failed with the engine's message.
    Query(String),
    /// Local execution failed without a message.
    Unknown,
    /// The remote client reported an error.
    Remote(String),
}

impl ViewError {
    /// Display text in the given locale.
    pub fn text(&self, locale: Locale) -> String {
        match self {
            Self::Query(message) => i18n::query_error(locale, message),
            Self::Unknown => i18n::unknown_error(locale).to_string(),
            Self::Remote(message) => i18n::remote_error(locale, message),
        }
    }
}

/// State of the query view.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryView {
    query: String,
    local: QueryResult,
    error: Option<ViewError>,
    source: ActiveSource,
}

impl Default for QueryView {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryView {
    /// Creates a view holding the canonical query and no results.
    pub fn new() -> Self {
        Self {
            query: CANONICAL_QUERY.to_string(),
            local: QueryResult::new(),
            error: None,
            source: ActiveSource::Local,
        }
    }

    /// Current editor text.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Replaces the editor text.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Last successful local result set.
    pub fn local_result(&self) -> &QueryResult {
        &self.local
    }

    /// Current error, if any.
    pub fn error(&self) -> Option<&ViewError> {
        self.error.as_ref()
    }

    /// Currently selected source.
    pub fn source(&self) -> ActiveSource {
        self.source
    }

    /// Runs the editor text against the local engine.
    ///
    /// On failure the previous result set and the active source are kept and
    /// only the error changes.
    pub async fn execute_local(&mut self, db: &dyn DatabaseClient) {
        match db.execute_query(&self.query).await {
            Ok(result) => {
                info!(
                    "Local query returned {} rows in {:?}",
                    result.row_count(),
                    result.execution_time
                );
                self.local = result;
                self.error = None;
                self.source = ActiveSource::Local;
            }
            Err(e) => {
                debug!("Local query failed: {}", e);
                let message = e.message().trim();
                self.error = Some(if message.is_empty() {
                    ViewError::Unknown
                } else {
                    ViewError::Query(message.to_string())
                });
            }
        }
    }

    /// Selects the remote source and mirrors its current error. Never fetches.
    pub fn switch_to_remote(&mut self, remote: &RemoteState) {
        self.source = ActiveSource::Remote;
        self.error = remote
            .error()
            .map(|message| ViewError::Remote(message.to_string()));
    }

    /// Selects the local source without re-running the query.
    pub fn show_local(&mut self) {
        self.source = ActiveSource::Local;
        if matches!(self.error, Some(ViewError::Remote(_))) {
            self.error = None;
        }
    }

    /// Re-reads the remote error after a fetch completes while remote is shown.
    pub fn sync_remote(&mut self, remote: &RemoteState) {
        if self.source == ActiveSource::Remote {
            self.switch_to_remote(remote);
        }
    }

    /// The result set to present.
    pub fn active<'a>(&'a self, remote: &'a RemoteState) -> ActiveResult<'a> {
        match self.source {
            ActiveSource::Local => ActiveResult::Local(&self.local),
            ActiveSource::Remote => ActiveResult::Remote(remote),
        }
    }
}
