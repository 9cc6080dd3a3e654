//! Declarative Cube.js query objects.

use serde::{Deserialize, Serialize};

/// Cube member names used by the conversion report.
pub mod members {
    pub const ESTIMATES: &str = "analytics.estimates";
    pub const CONTRACTS: &str = "analytics.contracts";
    pub const CONVERSION_PERCENT: &str = "analytics.conversion_percent";
    pub const MONTH: &str = "analytics.month";
    pub const EMPLOYEE: &str = "analytics.employee";
}

/// Sort direction for an `order` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    Asc,
    Desc,
}

/// A Cube.js `load` query.
///
/// `order` serializes in the array-of-pairs form (`[["member", "asc"], …]`),
/// which keeps the sort priority explicit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CubeQuery {
    pub measures: Vec<String>,
    pub dimensions: Vec<String>,
    pub order: Vec<(String, OrderDirection)>,
    pub time_dimensions: Vec<serde_json::Value>,
    pub filters: Vec<serde_json::Value>,
}

impl CubeQuery {
    /// The fixed report shown by the remote source: three measures grouped by
    /// month and employee, ordered by month then employee.
    pub fn conversion_report() -> Self {
        Self {
            measures: vec![
                members::ESTIMATES.to_string(),
                members::CONTRACTS.to_string(),
                members::CONVERSION_PERCENT.to_string(),
            ],
            dimensions: vec![members::MONTH.to_string(), members::EMPLOYEE.to_string()],
            order: vec![
                (members::MONTH.to_string(), OrderDirection::Asc),
                (members::EMPLOYEE.to_string(), OrderDirection::Asc),
            ],
            time_dimensions: Vec::new(),
            filters: Vec::new(),
        }
    }

    /// Serializes the query as the JSON expected in the `query` URL parameter.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
