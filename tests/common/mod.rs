// Shared test helpers: a fake upstream inventory service on an ephemeral
// port, plus record/snapshot builders. Not every test binary uses every
// helper.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;

use fleetmon::config::UpstreamConfig;
use fleetmon::metrics_client::MetricsClient;
use fleetmon::models::{HealthStatus, ServerRecord, Snapshot};

#[derive(Clone, Default)]
pub struct Upstream {
    pub servers: Vec<String>,
    /// Raw body override for GET /servers (e.g. malformed JSON).
    pub servers_raw: Option<String>,
    /// ip -> body for GET /{ip}; an ip not present here returns 404.
    pub details: HashMap<String, serde_json::Value>,
}

pub async fn serve(upstream: Upstream) -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let state = Arc::new(upstream);
    let app = Router::new()
        .route("/servers", get(list_servers))
        .route("/{ip}", get(server_detail))
        .with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, handle)
}

async fn list_servers(State(state): State<Arc<Upstream>>) -> Response {
    match &state.servers_raw {
        Some(raw) => raw.clone().into_response(),
        None => Json(state.servers.clone()).into_response(),
    }
}

async fn server_detail(
    State(state): State<Arc<Upstream>>,
    Path(ip): Path<String>,
) -> Response {
    match state.details.get(&ip) {
        Some(body) => Json(body.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub fn detail(cpu: &str, memory: &str, service: &str) -> serde_json::Value {
    serde_json::json!({ "cpu": cpu, "memory": memory, "service": service })
}

pub fn client_for(port: u16) -> MetricsClient {
    MetricsClient::new(&UpstreamConfig::default(), port).expect("client")
}

pub fn record(ip: &str, cpu: f64, memory: f64, service: &str, status: HealthStatus) -> ServerRecord {
    ServerRecord {
        ip: ip.to_string(),
        cpu: Some(cpu),
        memory: Some(memory),
        service: Some(service.to_string()),
        status,
    }
}

pub fn snapshot_of(servers: Vec<ServerRecord>) -> Snapshot {
    Snapshot {
        written_at_ms: 0,
        servers,
    }
}
