//! Result types for the remote analytics client.

use crate::error::{AppError, Result};
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

/// Message Cube.js returns while a query is still being computed.
pub const CONTINUE_WAIT: &str = "Continue wait";

/// One row of a pivoted result, keyed by cube member name.
pub type PivotRow = Map<String, JsonValue>;

/// Rows returned by a Cube.js `load` call.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResultSet {
    #[serde(default)]
    data: Vec<PivotRow>,
}

impl ResultSet {
    /// Creates a result set from raw rows.
    pub fn new(data: Vec<PivotRow>) -> Self {
        Self { data }
    }

    /// Rows keyed by member name.
    ///
    /// Without time dimensions the pivot is the raw row list, in server order.
    pub fn table_pivot(&self) -> &[PivotRow] {
        &self.data
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Raw `/load` response body.
#[derive(Debug, Deserialize)]
struct LoadResponse {
    #[serde(default)]
    data: Option<Vec<PivotRow>>,
    #[serde(default)]
    error: Option<String>,
}

/// Interpretation of one `/load` response.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The result is ready.
    Ready(ResultSet),
    /// Cube.js is still computing; ask again.
    ContinueWait,
}

/// Interprets a `/load` response given its HTTP status and body.
pub fn parse_load_body(status: u16, body: &str) -> Result<LoadOutcome> {
    let parsed: Option<LoadResponse> = serde_json::from_str(body).ok();

    if let Some(error) = parsed.as_ref().and_then(|r| r.error.as_deref()) {
        if error == CONTINUE_WAIT {
            return Ok(LoadOutcome::ContinueWait);
        }
        return Err(AppError::remote(error.to_string()));
    }

    if !(200..300).contains(&status) {
        let snippet: String = body.chars().take(200).collect();
        return Err(AppError::remote(format!("HTTP {status}: {snippet}")));
    }

    match parsed {
        Some(LoadResponse {
            data: Some(data), ..
        }) => Ok(LoadOutcome::Ready(ResultSet::new(data))),
        Some(_) => Err(AppError::remote("Response has no data field")),
        None => Err(AppError::remote("Failed to parse response body")),
    }
}

/// Observed state of the remote query: rows, a loading flag, or an error.
///
/// Results are tagged with the request that produced them; a completion for
/// anything but the newest request is ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteState {
    result: Option<ResultSet>,
    loading: bool,
    error: Option<String>,
    pending: Option<u64>,
}

impl RemoteState {
    /// State for a session with the remote source switched off.
    pub fn disabled(reason: impl Into<String>) -> Self {
        Self {
            error: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Marks request `id` as in flight. Earlier rows stay visible to callers
    /// that ignore the loading flag.
    pub fn begin(&mut self, id: u64) {
        self.pending = Some(id);
        self.loading = true;
        self.error = None;
    }

    /// Records the outcome of request `id`. Returns false for stale requests.
    pub fn complete(&mut self, id: u64, outcome: Result<ResultSet>) -> bool {
        if self.pending != Some(id) {
            return false;
        }

        self.pending = None;
        self.loading = false;
        match outcome {
            Ok(result) => {
                self.result = Some(result);
                self.error = None;
            }
            Err(e) => {
                self.result = None;
                self.error = Some(e.message().to_string());
            }
        }
        true
    }

    /// Latest rows, if a fetch has succeeded.
    pub fn result(&self) -> Option<&ResultSet> {
        self.result.as_ref()
    }

    /// Whether a fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Latest error message, if the last fetch failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
