//! Mock analytics client for testing and offline use.
//!
//! Answers the conversion report from the seed dataset, formatted the way
//! Cube.js formats measures (numbers as strings).

use async_trait::async_trait;
use serde_json::{json, Map};
use std::time::Duration;

use crate::analytics::query::{members, CubeQuery};
use crate::analytics::types::{PivotRow, ResultSet};
use crate::analytics::AnalyticsClient;
use crate::db::seed::{BATCHES, EMPLOYEES};
use crate::error::{AppError, Result};

/// Mock analytics client returning canned rows or a canned error.
#[derive(Debug, Clone, Default)]
pub struct MockAnalyticsClient {
    /// Rows to return instead of the seed report.
    rows: Option<Vec<PivotRow>>,
    /// Error message to fail with.
    failure: Option<String>,
    /// Simulated latency.
    delay: Option<Duration>,
}

impl MockAnalyticsClient {
    /// Creates a mock that answers with the seed report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns these rows instead of the seed report.
    pub fn with_rows(mut self, rows: Vec<PivotRow>) -> Self {
        self.rows = Some(rows);
        self
    }

    /// Fails every load with the given message.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Sleeps before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// The conversion report over the seed dataset, ordered by month then employee.
    pub fn seed_report() -> Vec<PivotRow> {
        let mut rows: Vec<(String, String, u32, u32)> = BATCHES
            .iter()
            .map(|batch| {
                let (first, last) = EMPLOYEES[(batch.employee_id - 1) as usize];
                (
                    batch.month.to_string(),
                    format!("{} {}", first, last),
                    batch.estimates,
                    batch.contracts,
                )
            })
            .collect();
        rows.sort();

        rows.into_iter()
            .map(|(month, employee, estimates, contracts)| {
                let conversion = if contracts > 0 {
                    f64::from(estimates) * 100.0 / f64::from(contracts)
                } else {
                    0.0
                };

                let mut row = Map::new();
                row.insert(members::MONTH.to_string(), json!(month));
                row.insert(members::EMPLOYEE.to_string(), json!(employee));
                row.insert(members::ESTIMATES.to_string(), json!(estimates.to_string()));
                row.insert(members::CONTRACTS.to_string(), json!(contracts.to_string()));
                row.insert(
                    members::CONVERSION_PERCENT.to_string(),
                    json!(format!("{:.2}", conversion)),
                );
                row
            })
            .collect()
    }
}

#[async_trait]
impl AnalyticsClient for MockAnalyticsClient {
    async fn load(&self, _query: &CubeQuery) -> Result<ResultSet> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = &self.failure {
            return Err(AppError::remote(message.clone()));
        }

        let rows = self.rows.clone().unwrap_or_else(Self::seed_report);
        Ok(ResultSet::new(rows))
    }

    fn endpoint(&self) -> String {
        "mock".to_string()
    }
}
