//! Embedded database layer for doc-analytics.
//!
//! Provides a trait-based interface for executing SQL, the in-memory SQLite
//! implementation, and the startup bootstrapper that creates and seeds the
//! sample schema.

mod script;
pub mod seed;
mod sqlite;
mod types;

pub use script::split_statements;
pub use sqlite::SqliteClient;
pub use types::{ColumnInfo, QueryResult, Row, Value};

use crate::error::Result;
use async_trait::async_trait;
use tracing::info;

/// Trait defining the interface for database clients.
///
/// All database operations are async and return Results with AppError.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Executes a SQL script and returns the first result set that has rows.
    async fn execute_query(&self, sql: &str) -> Result<QueryResult>;

    /// Closes the database connection.
    async fn close(&self) -> Result<()>;
}

/// Options for [`bootstrap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapOptions {
    /// Insert the sample dataset after creating the schema.
    pub seed: bool,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self { seed: true }
    }
}

/// Opens the embedded engine, creates the schema and inserts the sample data.
///
/// Every failure along the way is reported as [`AppError::Init`]; no handle is
/// returned in that case.
pub async fn bootstrap(options: &BootstrapOptions) -> Result<SqliteClient> {
    let client = SqliteClient::open_in_memory().await?;

    seed::create_schema(client.pool()).await?;

    if options.seed {
        seed::insert_seed_data(client.pool()).await?;
    }

    info!("Database ready (seeded: {})", options.seed);
    Ok(client)
}
