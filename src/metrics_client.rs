// Upstream inventory service client: server list + per-server detail

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use tracing::warn;

use crate::config::UpstreamConfig;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream returned status {0}")]
    Status(StatusCode),
    #[error("malformed body: {0}")]
    Decode(String),
}

/// Raw per-server fetch result. Numeric fields stay absent when the fetch
/// failed or a metric value did not parse; classification happens later.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedDetail {
    pub ip: String,
    pub cpu: Option<f64>,
    pub memory: Option<f64>,
    pub service: Option<String>,
}

impl FetchedDetail {
    fn unreachable(ip: &str) -> Self {
        Self {
            ip: ip.to_string(),
            cpu: None,
            memory: None,
            service: None,
        }
    }
}

/// Wire shape of GET /{ip}: cpu/memory arrive as quoted percent strings
/// (e.g. "42%"); any field may be missing.
#[derive(Debug, Deserialize)]
struct DetailBody {
    #[serde(default)]
    cpu: Option<String>,
    #[serde(default)]
    memory: Option<String>,
    #[serde(default)]
    service: Option<String>,
}

pub struct MetricsClient {
    client: reqwest::Client,
    base_url: String,
    headers: HeaderMap,
}

impl MetricsClient {
    pub fn new(config: &UpstreamConfig, port: u16) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        let mut headers = HeaderMap::new();
        headers.insert("cpu", HeaderValue::from_str(&config.filter.cpu)?);
        headers.insert("memory", HeaderValue::from_str(&config.filter.memory)?);
        headers.insert("service", HeaderValue::from_str(&config.filter.service)?);
        Ok(Self {
            client,
            base_url: format!("http://{}:{}", config.host, port),
            headers,
        })
    }

    /// Lists server identifiers for the configured filter. Transport errors,
    /// error statuses, and malformed bodies are logged and yield an empty
    /// list; the caller sees degraded data, never a failure.
    pub async fn list_servers(&self) -> Vec<String> {
        match self.try_list_servers().await {
            Ok(servers) => servers,
            Err(e) => {
                warn!(error = %e, operation = "list_servers", "server list fetch failed");
                Vec::new()
            }
        }
    }

    async fn try_list_servers(&self) -> Result<Vec<String>, ClientError> {
        let url = format!("{}/servers", self.base_url);
        let response = self
            .client
            .get(&url)
            .headers(self.headers.clone())
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Fetches one server's detail. The ip is always the caller's, never
    /// read back from the response. Failures degrade to a record with
    /// absent fields rather than aborting the batch.
    pub async fn fetch_detail(&self, ip: &str) -> FetchedDetail {
        let body = match self.try_fetch_detail(ip).await {
            Ok(b) => b,
            Err(e) => {
                warn!(error = %e, operation = "fetch_detail", server = ip, "detail fetch failed");
                return FetchedDetail::unreachable(ip);
            }
        };
        FetchedDetail {
            cpu: parse_percent(body.cpu.as_deref(), ip, "cpu"),
            memory: parse_percent(body.memory.as_deref(), ip, "memory"),
            service: body.service,
            ip: ip.to_string(),
        }
    }

    async fn try_fetch_detail(&self, ip: &str) -> Result<DetailBody, ClientError> {
        let url = format!("{}/{}", self.base_url, ip);
        let response = self
            .client
            .get(&url)
            .headers(self.headers.clone())
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

/// Strips surrounding quotes and percent signs from an upstream metric
/// value and parses the remainder. Absent or unparsable values yield None
/// so one bad field cannot abort a whole refresh cycle.
pub fn parse_percent(raw: Option<&str>, ip: &str, field: &'static str) -> Option<f64> {
    let raw = raw?;
    let trimmed = raw.trim_matches(|c: char| c == '"' || c == '%' || c.is_whitespace());
    match trimmed.parse::<f64>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(
                operation = "parse_percent",
                server = ip,
                field,
                value = raw,
                "unparsable metric value"
            );
            None
        }
    }
}
