//! In-memory SQLite client implementation.
//!
//! Provides the `SqliteClient` struct that implements the `DatabaseClient` trait
//! for the embedded engine using sqlx.

use crate::db::script::split_statements;
use crate::db::{ColumnInfo, DatabaseClient, QueryResult, Row, Value};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column as SqlxColumn, Row as SqlxRow, TypeInfo, ValueRef};
use std::time::{Duration, Instant};
use tracing::debug;

/// Statement timeout in seconds.
const QUERY_TIMEOUT_SECS: u64 = 30;

/// Embedded SQLite database client.
///
/// The pool is pinned to one connection that never expires: every connection
/// to `:memory:` would otherwise open its own, empty database.
#[derive(Debug, Clone)]
pub struct SqliteClient {
    pool: SqlitePool,
}

impl SqliteClient {
    /// Opens a fresh in-memory database with foreign-key enforcement on.
    pub async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .in_memory(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| AppError::init(format!("Failed to open in-memory database: {e}")))?;

        debug!("Opened in-memory SQLite database");
        Ok(Self { pool })
    }

    /// Returns the underlying pool (used by the seeding code).
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Runs a single statement and returns its rows.
    async fn run_statement(&self, sql: &str) -> Result<Vec<SqliteRow>> {
        tokio::time::timeout(
            Duration::from_secs(QUERY_TIMEOUT_SECS),
            sqlx::query(sql).fetch_all(&self.pool),
        )
        .await
        .map_err(|_| {
            AppError::query(format!(
                "Query timed out after {QUERY_TIMEOUT_SECS} seconds"
            ))
        })?
        .map_err(|e| AppError::query(format_query_error(e)))
    }
}

#[async_trait]
impl DatabaseClient for SqliteClient {
    async fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        let start = Instant::now();
        let statements = split_statements(sql);
        debug!("Executing script with {} statement(s)", statements.len());

        // The first statement that yields rows is the one displayed; later
        // statements still run, in order.
        let mut shown: Option<QueryResult> = None;

        for statement in &statements {
            let rows = self.run_statement(statement).await?;

            if shown.is_none() && !rows.is_empty() {
                shown = Some(convert_rows(&rows));
            }
        }

        Ok(shown
            .unwrap_or_default()
            .with_execution_time(start.elapsed()))
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}

/// Converts sqlx rows into a result set, taking column metadata from the first row.
fn convert_rows(rows: &[SqliteRow]) -> QueryResult {
    let columns = rows
        .first()
        .map(|first| {
            first
                .columns()
                .iter()
                .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
                .collect()
        })
        .unwrap_or_default();

    let rows: Vec<Row> = rows.iter().map(convert_row).collect();

    QueryResult::with_data(columns, rows)
}

/// Converts one row, dispatching on each value's runtime storage class.
fn convert_row(row: &SqliteRow) -> Row {
    (0..row.columns().len())
        .map(|i| convert_value(row, i))
        .collect()
}

fn convert_value(row: &SqliteRow, index: usize) -> Value {
    let storage_class = match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(raw) => raw.type_info().name().to_string(),
        Err(_) => return Value::Null,
    };

    match storage_class.as_str() {
        "INTEGER" | "BOOLEAN" => row
            .try_get::<i64, _>(index)
            .map(Value::Int)
            .unwrap_or(Value::Null),
        "REAL" | "NUMERIC" => row
            .try_get::<f64, _>(index)
            .map(Value::Float)
            .unwrap_or(Value::Null),
        "BLOB" => row
            .try_get::<Vec<u8>, _>(index)
            .map(Value::Bytes)
            .unwrap_or(Value::Null),
        _ => row
            .try_get::<String, _>(index)
            .map(Value::String)
            .unwrap_or(Value::Null),
    }
}

/// Extracts the engine's own message from a sqlx error.
fn format_query_error(e: sqlx::Error) -> String {
    match e {
        sqlx::Error::Database(db_err) => db_err.message().to_string(),
        other => other.to_string(),
    }
}
