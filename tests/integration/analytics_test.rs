//! Cube.js client tests against a local HTTP stub.
//!
//! The stub answers each connection with the next canned response and records
//! the request head, so polling and the wire format can be checked without a
//! Cube.js server.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use doc_analytics::analytics::{
    AnalyticsClient, CubeClient, CubeConfig, CubeQuery, MockAnalyticsClient,
};
use doc_analytics::app::Session;
use doc_analytics::config::UiConfig;
use doc_analytics::db::{bootstrap, BootstrapOptions, Value};
use doc_analytics::tui::app::{Action, App};
use doc_analytics::view::GridView;
use pretty_assertions::assert_eq;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

type Requests = Arc<Mutex<Vec<String>>>;

/// Serves `responses` in order, one per connection. Returns the API base URL.
async fn serve(responses: Vec<(u16, String)>) -> (String, Requests) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests: Requests = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&requests);

    tokio::spawn(async move {
        for (status, body) in responses {
            let (mut socket, _) = listener.accept().await.unwrap();

            let mut head = Vec::new();
            let mut chunk = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&chunk[..n]);
            }
            seen.lock()
                .unwrap()
                .push(String::from_utf8_lossy(&head).to_string());

            let response = format!(
                "HTTP/1.1 {status} STUB\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        }
    });

    (format!("http://{addr}/cubejs-api/v1"), requests)
}

fn report_body() -> String {
    let data = serde_json::Value::Array(
        MockAnalyticsClient::seed_report()
            .into_iter()
            .map(serde_json::Value::Object)
            .collect(),
    );
    serde_json::json!({ "query": {}, "data": data, "annotation": {} }).to_string()
}

fn client(api_url: &str, max_wait_polls: u32) -> CubeClient {
    let mut config = CubeConfig::new(api_url)
        .with_token("test-token")
        .with_timeout(5);
    config.max_wait_polls = max_wait_polls;
    CubeClient::new(config).unwrap()
}

#[tokio::test]
async fn test_load_sends_query_and_token() {
    let (api_url, requests) = serve(vec![(200, report_body())]).await;

    let result = client(&api_url, 3)
        .load(&CubeQuery::conversion_report())
        .await
        .unwrap();
    assert_eq!(result.len(), 4);

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let head = requests[0].to_lowercase();
    assert!(head.contains("authorization: test-token"), "{head}");

    let path = requests[0]
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap();
    let url = url::Url::parse(&format!("http://stub{path}")).unwrap();
    assert_eq!(url.path(), "/cubejs-api/v1/load");
    let (_, query) = url.query_pairs().find(|(k, _)| k == "query").unwrap();
    let sent: serde_json::Value = serde_json::from_str(&query).unwrap();
    assert_eq!(
        sent,
        serde_json::to_value(CubeQuery::conversion_report()).unwrap()
    );
}

#[tokio::test]
async fn test_load_polls_while_continue_wait() {
    let wait = r#"{"error":"Continue wait"}"#.to_string();
    let (api_url, requests) = serve(vec![(200, wait), (200, report_body())]).await;

    let result = client(&api_url, 3)
        .load(&CubeQuery::conversion_report())
        .await
        .unwrap();

    assert_eq!(result.len(), 4);
    assert_eq!(requests.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_load_gives_up_after_max_polls() {
    let wait = r#"{"error":"Continue wait"}"#.to_string();
    let (api_url, _) = serve(vec![(200, wait.clone()), (200, wait)]).await;

    let err = client(&api_url, 1)
        .load(&CubeQuery::conversion_report())
        .await
        .unwrap_err();
    assert_eq!(err.message(), "Query still computing after 1 polls");
}

#[tokio::test]
async fn test_load_reports_server_error() {
    let body = r#"{"error":"Cube 'analytics' not found"}"#.to_string();
    let (api_url, _) = serve(vec![(400, body)]).await;

    let err = client(&api_url, 3)
        .load(&CubeQuery::conversion_report())
        .await
        .unwrap_err();
    assert_eq!(err.category(), "Remote Error");
    assert_eq!(err.message(), "Cube 'analytics' not found");
}

#[tokio::test]
async fn test_cube_report_reaches_grid() {
    let (api_url, _) = serve(vec![(200, report_body())]).await;
    let cube: Arc<dyn AnalyticsClient> = Arc::new(client(&api_url, 3));

    let db = bootstrap(&BootstrapOptions::default()).await.unwrap();
    let mut session = Session::new(Box::new(db), Some(cube));
    let mut app = App::new(&UiConfig::default(), session.endpoint());
    assert!(app.endpoint.as_deref().is_some_and(|e| e.starts_with("127.0.0.1:")));

    session.start(&mut app);
    session.perform(&mut app, Action::SwitchToRemote).await;
    assert!(session.settle(&mut app, Duration::from_secs(10)).await);

    let GridView::Rows(grid) = app.grid_view() else {
        panic!("Expected rows, got {:?}", app.grid_view());
    };
    assert_eq!(grid.rows.len(), 4);
    assert_eq!(grid.value(0, "Employee"), Some(&Value::from("Иван Иванов")));
    assert_eq!(grid.value(0, "Estimates"), Some(&Value::Float(10.0)));
    assert_eq!(grid.value(3, "ConversionPercent"), Some(&Value::Float(250.0)));

    session.close().await.unwrap();
}
