//! Source switching and grid derivation over a live session.

use std::sync::Arc;
use std::time::Duration;

use doc_analytics::analytics::{members, AnalyticsClient, MockAnalyticsClient, PivotRow};
use doc_analytics::app::{Session, REMOTE_DISABLED};
use doc_analytics::config::{Locale, UiConfig};
use doc_analytics::db::{bootstrap, BootstrapOptions, Value};
use doc_analytics::tui::app::{Action, App};
use doc_analytics::view::{ActiveSource, GridView, ViewError};
use pretty_assertions::assert_eq;
use serde_json::{json, Map};

async fn start(client: Option<Arc<dyn AnalyticsClient>>, locale: Locale) -> (Session, App) {
    let db = bootstrap(&BootstrapOptions::default()).await.unwrap();
    let mut session = Session::new(Box::new(db), client);
    let ui = UiConfig {
        locale,
        ..UiConfig::default()
    };
    let mut app = App::new(&ui, session.endpoint());
    session.start(&mut app);
    (session, app)
}

fn rows(view: GridView) -> Vec<Vec<Value>> {
    match view {
        GridView::Rows(grid) => grid.rows,
        other => panic!("Expected rows, got {other:?}"),
    }
}

#[tokio::test]
async fn test_local_then_remote_then_local() {
    let client: Arc<dyn AnalyticsClient> = Arc::new(MockAnalyticsClient::new());
    let (mut session, mut app) = start(Some(client), Locale::Ru).await;

    session.perform(&mut app, Action::ExecuteLocal).await;
    let local = rows(app.grid_view());
    assert_eq!(local.len(), 4);

    session.perform(&mut app, Action::SwitchToRemote).await;
    session.settle(&mut app, Duration::from_secs(5)).await;
    assert_eq!(app.view.source(), ActiveSource::Remote);
    let remote = rows(app.grid_view());
    assert_eq!(remote.len(), 4);
    assert_eq!(remote[0][1], Value::from("Иван Иванов"));
    assert_eq!(remote[3][4], Value::Float(250.0));

    session.perform(&mut app, Action::ShowLocal).await;
    assert_eq!(app.view.source(), ActiveSource::Local);
    assert_eq!(rows(app.grid_view()), local);

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_show_local_does_not_rerun_query() {
    let (mut session, mut app) = start(None, Locale::Ru).await;

    session.perform(&mut app, Action::ExecuteLocal).await;
    app.editor.set_text("SELECT 1 AS one");
    session.perform(&mut app, Action::SwitchToRemote).await;
    session.perform(&mut app, Action::ShowLocal).await;

    assert_eq!(app.grid_view().row_count(), 4);
}

#[tokio::test]
async fn test_remote_headers_are_localized() {
    let client: Arc<dyn AnalyticsClient> = Arc::new(MockAnalyticsClient::new());
    let (mut session, mut app) = start(Some(client), Locale::En).await;

    session.perform(&mut app, Action::SwitchToRemote).await;
    session.settle(&mut app, Duration::from_secs(5)).await;

    let GridView::Rows(grid) = app.grid_view() else {
        panic!("Expected rows");
    };
    let headers: Vec<&str> = grid.columns.iter().map(|c| c.header.as_str()).collect();
    assert_eq!(
        headers,
        vec!["Month", "Employee", "Estimates", "Contracts", "Conversion (%)"]
    );
}

#[tokio::test]
async fn test_remote_rows_with_missing_fields() {
    let mut row = PivotRow::new();
    row.insert(members::MONTH.to_string(), json!("2025-05"));
    row.insert(members::ESTIMATES.to_string(), json!("n/a"));
    row.insert(members::CONTRACTS.to_string(), json!(3));
    let client: Arc<dyn AnalyticsClient> =
        Arc::new(MockAnalyticsClient::new().with_rows(vec![row, Map::new()]));
    let (mut session, mut app) = start(Some(client), Locale::Ru).await;

    session.perform(&mut app, Action::SwitchToRemote).await;
    session.settle(&mut app, Duration::from_secs(5)).await;

    let rows = rows(app.grid_view());
    assert_eq!(
        rows[0],
        vec![
            Value::from("2025-05"),
            Value::from("Неизвестный сотрудник"),
            Value::Float(0.0),
            Value::Float(3.0),
            Value::Float(0.0),
        ]
    );
    assert_eq!(rows[1][0], Value::from(""));
}

#[tokio::test]
async fn test_remote_empty_result_is_not_an_error() {
    let client: Arc<dyn AnalyticsClient> =
        Arc::new(MockAnalyticsClient::new().with_rows(Vec::new()));
    let (mut session, mut app) = start(Some(client), Locale::Ru).await;

    session.perform(&mut app, Action::SwitchToRemote).await;
    session.settle(&mut app, Duration::from_secs(5)).await;

    assert_eq!(app.grid_view(), GridView::Empty);
    assert_eq!(app.view.error(), None);
}

#[tokio::test]
async fn test_remote_error_arrives_while_shown() {
    let client: Arc<dyn AnalyticsClient> = Arc::new(
        MockAnalyticsClient::failing("Network request failed")
            .with_delay(Duration::from_millis(20)),
    );
    let (mut session, mut app) = start(Some(client), Locale::Ru).await;

    session.perform(&mut app, Action::SwitchToRemote).await;
    assert_eq!(app.grid_view(), GridView::Loading);
    assert_eq!(app.view.error(), None);

    session.settle(&mut app, Duration::from_secs(5)).await;
    assert_eq!(
        app.view.error(),
        Some(&ViewError::Remote("Network request failed".to_string()))
    );
}

#[tokio::test]
async fn test_refresh_replaces_remote_rows() {
    let client: Arc<dyn AnalyticsClient> = Arc::new(MockAnalyticsClient::new());
    let (mut session, mut app) = start(Some(client), Locale::Ru).await;

    session.perform(&mut app, Action::SwitchToRemote).await;
    session.settle(&mut app, Duration::from_secs(5)).await;

    session.perform(&mut app, Action::RefreshRemote).await;
    assert!(app.remote.is_loading());
    assert_eq!(app.grid_view(), GridView::Loading);

    assert!(session.settle(&mut app, Duration::from_secs(5)).await);
    assert_eq!(app.grid_view().row_count(), 4);
}

#[tokio::test]
async fn test_disabled_remote_shows_reason() {
    let (mut session, mut app) = start(None, Locale::En).await;

    session.perform(&mut app, Action::SwitchToRemote).await;
    assert_eq!(
        app.view.error().map(|e| e.text(app.locale)),
        Some(format!("Cube.js error: {REMOTE_DISABLED}"))
    );
}
