//! Startup and local query integration tests.
//!
//! Exercise the seeded in-memory database through the public client API.

use doc_analytics::db::seed::{BATCHES, EMPLOYEES, PROJECTS};
use doc_analytics::db::{bootstrap, BootstrapOptions, DatabaseClient, QueryResult, Value};
use doc_analytics::view::CANONICAL_QUERY;
use pretty_assertions::assert_eq;

async fn count(db: &dyn DatabaseClient, table: &str) -> i64 {
    let result = db
        .execute_query(&format!("SELECT COUNT(*) AS n FROM {table}"))
        .await
        .unwrap();
    match result.rows[0][0] {
        Value::Int(n) => n,
        ref other => panic!("Expected integer count, got {other:?}"),
    }
}

fn text(result: &QueryResult, row: usize, column: &str) -> String {
    result.value(row, column).unwrap().to_display_string()
}

#[tokio::test]
async fn test_seeded_row_counts() {
    let db = bootstrap(&BootstrapOptions::default()).await.unwrap();

    let documents: u32 = BATCHES.iter().map(|b| b.estimates + b.contracts).sum();
    assert_eq!(count(&db, "Projects").await, PROJECTS.len() as i64);
    assert_eq!(count(&db, "Employees").await, EMPLOYEES.len() as i64);
    assert_eq!(count(&db, "Documents").await, i64::from(documents));
    assert_eq!(documents, 43);

    db.close().await.unwrap();
}

#[tokio::test]
async fn test_canonical_query_report() {
    let db = bootstrap(&BootstrapOptions::default()).await.unwrap();
    let result = db.execute_query(CANONICAL_QUERY).await.unwrap();

    assert_eq!(result.row_count(), 4);
    let rows: Vec<(String, String)> = (0..4)
        .map(|i| (text(&result, i, "Month"), text(&result, i, "Employee")))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("2025-01".to_string(), "Иван Иванов".to_string()),
            ("2025-02".to_string(), "Анна Смирнова".to_string()),
            ("2025-03".to_string(), "Александр Кузнецов".to_string()),
            ("2025-04".to_string(), "Мария Петрова".to_string()),
        ]
    );

    assert_eq!(
        result.rows[1],
        vec![
            Value::from("2025-02"),
            Value::from("Анна Смирнова"),
            Value::Int(8),
            Value::Int(4),
            Value::Float(200.0),
        ]
    );
    assert_eq!(result.value(3, "ConversionPercent"), Some(&Value::Float(250.0)));
}

#[tokio::test]
async fn test_conversion_formula_holds_for_every_row() {
    let db = bootstrap(&BootstrapOptions::default()).await.unwrap();
    let result = db.execute_query(CANONICAL_QUERY).await.unwrap();

    for row in 0..result.row_count() {
        let estimates = result.value(row, "Estimates").and_then(Value::as_f64).unwrap();
        let contracts = result.value(row, "Contracts").and_then(Value::as_f64).unwrap();
        let conversion = result
            .value(row, "ConversionPercent")
            .and_then(Value::as_f64)
            .unwrap();

        let expected = if contracts > 0.0 {
            (estimates * 100.0 / contracts * 100.0).round() / 100.0
        } else {
            0.0
        };
        assert_eq!(conversion, expected, "row {row}");
    }
}

#[tokio::test]
async fn test_query_is_idempotent() {
    let db = bootstrap(&BootstrapOptions::default()).await.unwrap();
    let first = db.execute_query(CANONICAL_QUERY).await.unwrap();
    let second = db.execute_query(CANONICAL_QUERY).await.unwrap();

    assert_eq!(first.columns, second.columns);
    assert_eq!(first.rows, second.rows);
}

#[tokio::test]
async fn test_unseeded_database_yields_empty_report() {
    let db = bootstrap(&BootstrapOptions { seed: false }).await.unwrap();
    let result = db.execute_query(CANONICAL_QUERY).await.unwrap();
    assert!(result.is_empty());
}

#[tokio::test]
async fn test_script_shows_first_result_with_rows() {
    let db = bootstrap(&BootstrapOptions::default()).await.unwrap();
    let result = db
        .execute_query(
            "CREATE TABLE Notes (Body TEXT); \
             INSERT INTO Notes VALUES ('first'); \
             SELECT Body FROM Notes; \
             SELECT 2 AS two;",
        )
        .await
        .unwrap();

    assert_eq!(result.column_names(), vec!["Body"]);
    assert_eq!(result.rows, vec![vec![Value::from("first")]]);
}

#[tokio::test]
async fn test_missing_table_reports_engine_message() {
    let db = bootstrap(&BootstrapOptions::default()).await.unwrap();
    let err = db
        .execute_query("SELECT * FROM NoSuchTable")
        .await
        .unwrap_err();

    assert_eq!(err.category(), "Query Error");
    assert!(err.message().contains("no such table: NoSuchTable"));
}

#[tokio::test]
async fn test_foreign_keys_are_enforced() {
    let db = bootstrap(&BootstrapOptions::default()).await.unwrap();
    let result = db
        .execute_query(
            "INSERT INTO Documents (DateCreated, Type, ResponsibleEmployee, Project) \
             VALUES ('2025-05-01', 'Estimate', 99, 1)",
        )
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_escaped_quotes_reach_engine_verbatim() {
    let db = bootstrap(&BootstrapOptions::default()).await.unwrap();
    let result = db
        .execute_query("SELECT 'O''Brien' AS name, 1 AS \"a\"\"b\"; SELECT 2")
        .await
        .unwrap();

    assert_eq!(result.column_names(), vec!["name", "a\"b"]);
    assert_eq!(result.rows, vec![vec![Value::from("O'Brien"), Value::Int(1)]]);
}

#[tokio::test]
async fn test_hex_integer_literal() {
    let db = bootstrap(&BootstrapOptions::default()).await.unwrap();
    let result = db.execute_query("SELECT 0x1F AS h;").await.unwrap();
    assert_eq!(result.rows, vec![vec![Value::Int(31)]]);
}

#[tokio::test]
async fn test_script_with_cyrillic_literals_across_lines() {
    let db = bootstrap(&BootstrapOptions::default()).await.unwrap();
    let result = db
        .execute_query(
            "CREATE TABLE Notes (Body TEXT);\n\
             INSERT INTO Notes VALUES ('Иван; Анна');\n\
             SELECT Body FROM Notes;",
        )
        .await
        .unwrap();
    assert_eq!(result.rows, vec![vec![Value::from("Иван; Анна")]]);
}
