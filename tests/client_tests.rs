// Metrics client tests against a fake upstream: list, detail, soft parsing

mod common;

use common::{Upstream, client_for, detail};
use fleetmon::metrics_client::parse_percent;

#[test]
fn parse_percent_strips_quotes_and_percent() {
    assert_eq!(parse_percent(Some("42%"), "ip", "cpu"), Some(42.0));
    assert_eq!(parse_percent(Some("\"42%\""), "ip", "cpu"), Some(42.0));
    assert_eq!(parse_percent(Some(" 42.5% "), "ip", "cpu"), Some(42.5));
    assert_eq!(parse_percent(Some("0%"), "ip", "cpu"), Some(0.0));
}

#[test]
fn parse_percent_fails_soft() {
    assert_eq!(parse_percent(None, "ip", "cpu"), None);
    assert_eq!(parse_percent(Some(""), "ip", "cpu"), None);
    assert_eq!(parse_percent(Some("N/A"), "ip", "cpu"), None);
    assert_eq!(parse_percent(Some("%"), "ip", "cpu"), None);
}

#[tokio::test]
async fn list_servers_returns_upstream_identifiers() {
    let upstream = Upstream {
        servers: vec!["10.0.0.1".into(), "10.0.0.2".into()],
        ..Default::default()
    };
    let (addr, server) = common::serve(upstream).await;
    let client = client_for(addr.port());
    assert_eq!(client.list_servers().await, vec!["10.0.0.1", "10.0.0.2"]);
    server.abort();
}

#[tokio::test]
async fn list_servers_empty_on_connection_refused() {
    // grab a free port, then close the listener before the client calls it
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = client_for(port);
    assert!(client.list_servers().await.is_empty());
}

#[tokio::test]
async fn list_servers_empty_on_malformed_body() {
    let upstream = Upstream {
        servers_raw: Some("{not json".into()),
        ..Default::default()
    };
    let (addr, server) = common::serve(upstream).await;
    let client = client_for(addr.port());
    assert!(client.list_servers().await.is_empty());
    server.abort();
}

#[tokio::test]
async fn fetch_detail_parses_quoted_percent_metrics() {
    let mut upstream = Upstream::default();
    upstream
        .details
        .insert("10.0.0.1".into(), detail("\"42%\"", "17%", "web"));
    let (addr, server) = common::serve(upstream).await;
    let client = client_for(addr.port());

    let fetched = client.fetch_detail("10.0.0.1").await;
    assert_eq!(fetched.ip, "10.0.0.1");
    assert_eq!(fetched.cpu, Some(42.0));
    assert_eq!(fetched.memory, Some(17.0));
    assert_eq!(fetched.service.as_deref(), Some("web"));
    server.abort();
}

#[tokio::test]
async fn fetch_detail_degrades_on_http_error() {
    let (addr, server) = common::serve(Upstream::default()).await;
    let client = client_for(addr.port());

    // no detail registered -> upstream 404s
    let fetched = client.fetch_detail("10.0.0.1").await;
    assert_eq!(fetched.ip, "10.0.0.1");
    assert_eq!(fetched.cpu, None);
    assert_eq!(fetched.memory, None);
    assert_eq!(fetched.service, None);
    server.abort();
}

#[tokio::test]
async fn fetch_detail_tolerates_missing_fields() {
    let mut upstream = Upstream::default();
    upstream
        .details
        .insert("10.0.0.1".into(), serde_json::json!({ "service": "web" }));
    let (addr, server) = common::serve(upstream).await;
    let client = client_for(addr.port());

    let fetched = client.fetch_detail("10.0.0.1").await;
    assert_eq!(fetched.cpu, None);
    assert_eq!(fetched.memory, None);
    assert_eq!(fetched.service.as_deref(), Some("web"));
    server.abort();
}

#[tokio::test]
async fn fetch_detail_bad_percent_value_fails_soft_per_field() {
    let mut upstream = Upstream::default();
    upstream
        .details
        .insert("10.0.0.1".into(), detail("garbage", "50%", "web"));
    let (addr, server) = common::serve(upstream).await;
    let client = client_for(addr.port());

    let fetched = client.fetch_detail("10.0.0.1").await;
    assert_eq!(fetched.cpu, None);
    assert_eq!(fetched.memory, Some(50.0));
    server.abort();
}
