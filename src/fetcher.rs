// Parallel fan-out of per-server detail fetches

use futures_util::StreamExt;
use futures_util::stream;
use tracing::debug;

use crate::metrics_client::{FetchedDetail, MetricsClient};

/// Fetches every server's detail with at most `max_concurrency` requests in
/// flight. The whole batch is awaited; there is no early cancellation of
/// stragglers, and per-server failures come back as degraded records so one
/// unreachable server never blanks the snapshot. Result order is
/// unspecified.
pub async fn fetch_all(
    client: &MetricsClient,
    servers: &[String],
    max_concurrency: usize,
) -> Vec<FetchedDetail> {
    let batch: Vec<FetchedDetail> = stream::iter(servers)
        .map(|ip| client.fetch_detail(ip))
        .buffer_unordered(max_concurrency.max(1))
        .collect()
        .await;
    debug!(
        operation = "fetch_all",
        requested = servers.len(),
        fetched = batch.len(),
        "detail batch complete"
    );
    batch
}
