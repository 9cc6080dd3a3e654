//! In-process headless runs over a seeded session.
//!
//! These drive the same runner as `--headless` without spawning the binary,
//! so the remote source can be scripted with the mock client.

use std::sync::Arc;
use std::time::Duration;

use doc_analytics::analytics::{AnalyticsClient, MockAnalyticsClient};
use doc_analytics::app::Session;
use doc_analytics::config::{Locale, UiConfig};
use doc_analytics::db::{bootstrap, BootstrapOptions};
use doc_analytics::tui::headless::{HeadlessConfig, HeadlessResult, HeadlessRunner};
use pretty_assertions::assert_eq;

async fn run(
    events: &str,
    client: Option<Arc<dyn AnalyticsClient>>,
    locale: Locale,
) -> HeadlessResult {
    let db = bootstrap(&BootstrapOptions::default()).await.unwrap();
    let session = Session::new(Box::new(db), client);
    let ui = UiConfig {
        locale,
        ..UiConfig::default()
    };

    let mut runner = HeadlessRunner::new(HeadlessConfig::default(), &ui, session).unwrap();
    runner.load_events(events).unwrap();
    runner.run().await.unwrap()
}

#[tokio::test]
async fn test_execute_canonical_query() {
    let result = run("key:f5", None, Locale::Ru).await;

    assert_eq!(result.state.row_count, 4);
    assert_eq!(result.state.grid, "rows");
    assert_eq!(result.state.error, None);
    for name in [
        "Иван Иванов",
        "Анна Смирнова",
        "Александр Кузнецов",
        "Мария Петрова",
    ] {
        assert!(result.screen.contains(name), "missing {name}");
    }
    assert!(result.screen.contains("Месяц"));
    assert!(result.screen.contains("200%"));
    assert!(result.screen.contains("250%"));
}

#[tokio::test]
async fn test_broken_query_keeps_previous_rows() {
    let result = run(
        "key:f5,type: SELEC,key:f5,assert:state:row_count=4",
        None,
        Locale::Ru,
    )
    .await;

    assert_eq!(result.assertions_failed, 0);
    assert_eq!(result.state.source, "local");
    let error = result.state.error.unwrap();
    assert!(error.starts_with("Произошла ошибка: "), "{error}");
    assert!(result.screen.contains("Иван Иванов"));
}

#[tokio::test]
async fn test_missing_table_error_text() {
    let db = bootstrap(&BootstrapOptions::default()).await.unwrap();
    let session = Session::new(Box::new(db), None);
    let mut runner =
        HeadlessRunner::new(HeadlessConfig::default(), &UiConfig::default(), session).unwrap();
    runner
        .load_events("type:; SELECT * FROM NoSuchTable,key:f5")
        .unwrap();

    let result = runner.run().await.unwrap();
    assert_eq!(
        result.state.error.as_deref(),
        Some("Произошла ошибка: no such table: NoSuchTable")
    );
    assert_eq!(result.state.grid, "empty");
}

#[tokio::test]
async fn test_remote_round_trip() {
    let client: Arc<dyn AnalyticsClient> = Arc::new(MockAnalyticsClient::new());
    let result = run(
        "key:f6,wait:10ms,assert:state:source=remote,assert:state:row_count=4,key:f7",
        Some(client),
        Locale::En,
    )
    .await;

    assert_eq!(result.assertions_passed, 2);
    assert_eq!(result.state.source, "local");
    assert_eq!(result.state.grid, "empty");
    assert_eq!(result.state.error, None);
}

#[tokio::test]
async fn test_remote_loading_placeholder() {
    let client: Arc<dyn AnalyticsClient> =
        Arc::new(MockAnalyticsClient::new().with_delay(Duration::from_secs(60)));
    let result = run("key:f6", Some(client), Locale::En).await;

    assert!(result.state.remote_loading);
    assert_eq!(result.state.grid, "loading");
    assert!(result.screen.contains("Loading data from Cube.js..."));
}

#[tokio::test]
async fn test_remote_failure_surfaces_on_switch() {
    let client: Arc<dyn AnalyticsClient> =
        Arc::new(MockAnalyticsClient::failing("Network request failed"));
    let result = run("wait:10ms,key:f6", Some(client), Locale::Ru).await;

    assert_eq!(
        result.state.error.as_deref(),
        Some("Ошибка Cube.js: Network request failed")
    );
    assert_eq!(result.state.source, "remote");
    assert!(result.screen.contains("Ошибка Cube.js: Network request failed"));
}

#[tokio::test]
async fn test_remote_error_cleared_by_show_local() {
    let client: Arc<dyn AnalyticsClient> = Arc::new(MockAnalyticsClient::failing("down"));
    let result = run("wait:10ms,key:f6,key:f7", Some(client), Locale::Ru).await;

    assert_eq!(result.state.source, "local");
    assert_eq!(result.state.error, None);
}

#[tokio::test]
async fn test_grid_paging_and_filter() {
    let result = run(
        "key:f5,key:tab,key:-,assert:state:page_size=10,key:/,type:Анна,key:enter",
        None,
        Locale::Ru,
    )
    .await;

    assert_eq!(result.assertions_failed, 0);
    assert_eq!(result.state.focus, "Grid");
    assert_eq!(result.state.filter, "Анна");
    assert_eq!(result.state.visible_rows, 1);
    assert!(result.screen.contains("Анна Смирнова"));
    assert!(!result.screen.contains("Мария Петрова"));
}

#[tokio::test]
async fn test_sort_descending_by_employee() {
    let result = run(
        "key:f5,key:tab,key:right,key:s,key:s,assert:state:sort=Employee:desc",
        None,
        Locale::Ru,
    )
    .await;

    assert_eq!(result.assertions_failed, 0);
    let first = result.screen.find("Мария Петрова").unwrap();
    let last = result.screen.find("Александр Кузнецов").unwrap();
    assert!(first < last);
}

#[tokio::test]
async fn test_quit_stops_script() {
    let result = run("key:ctrl+q,key:f5", None, Locale::Ru).await;

    assert_eq!(result.events_executed, 1);
    assert!(!result.state.running);
}
