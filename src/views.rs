// Console views over the snapshot cache. Each view refreshes the cache when
// stale, then reads; plain reads never fetch on their own.

use std::time::Duration;

use tracing::{info, warn};

use crate::aggregate;
use crate::metrics_client::MetricsClient;
use crate::models::{ServerRecord, Snapshot};
use crate::snapshot_repo::SnapshotRepo;

/// Check-then-refresh-then-read. The explicit check is what keeps repeat
/// views cheap while a recent acquisition cycle is still within the TTL.
async fn current_snapshot(
    repo: &SnapshotRepo,
    client: &MetricsClient,
) -> anyhow::Result<Snapshot> {
    if !repo.is_fresh() {
        repo.refresh(client, None).await?;
    }
    repo.read()
}

fn fmt_metric(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{v}"),
        None => "-".into(),
    }
}

fn fmt_mean(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{v:.2}"),
        None => "-".into(),
    }
}

fn print_record(record: &ServerRecord) {
    println!(
        "{}\t{}\t{}\t{}\t{}",
        record.ip,
        fmt_metric(record.cpu),
        fmt_metric(record.memory),
        record.service.as_deref().unwrap_or("-"),
        record.status
    );
}

/// One tab-separated line per server: ip, cpu, memory, service, status.
pub async fn print_servers(repo: &SnapshotRepo, client: &MetricsClient) -> anyhow::Result<()> {
    let snapshot = current_snapshot(repo, client).await?;
    for record in &snapshot.servers {
        print_record(record);
    }
    Ok(())
}

/// Per-service mean cpu/memory table.
pub async fn print_service_averages(
    repo: &SnapshotRepo,
    client: &MetricsClient,
) -> anyhow::Result<()> {
    let snapshot = current_snapshot(repo, client).await?;
    println!(
        "{:<20} {:>10} {:>10} {:>8}",
        "service", "cpu", "memory", "healthy"
    );
    for agg in aggregate::means_by_service(&snapshot) {
        println!(
            "{:<20} {:>10} {:>10} {:>8}",
            agg.service,
            fmt_mean(agg.mean_cpu),
            fmt_mean(agg.mean_memory),
            agg.healthy_count
        );
    }
    Ok(())
}

/// Services with fewer healthy members than `min_healthy`, or the all-clear
/// line when there are none.
pub async fn print_unhealthy_services(
    repo: &SnapshotRepo,
    client: &MetricsClient,
    min_healthy: usize,
) -> anyhow::Result<()> {
    let snapshot = current_snapshot(repo, client).await?;
    let partition = aggregate::unhealthy_services(&snapshot, min_healthy);
    if partition.below.is_empty() {
        println!("No unhealthy services");
        return Ok(());
    }
    println!("{:<20} {:>15}", "service", "healthy_count");
    for entry in &partition.below {
        println!("{:<20} {:>15}", entry.service, entry.healthy_count);
    }
    Ok(())
}

/// Prints one service's members every `refresh_secs` seconds. Each tick
/// re-checks snapshot freshness, so a long-running watch keeps triggering
/// full acquisition cycles as the TTL expires. Refresh failures are logged
/// and the loop carries on with the next tick.
async fn watch_service(
    repo: &SnapshotRepo,
    client: &MetricsClient,
    service: &str,
    refresh_secs: u64,
) {
    let mut tick = tokio::time::interval(Duration::from_secs(refresh_secs.max(1)));
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tick.tick().await;
        println!("{service}");
        match current_snapshot(repo, client).await {
            Ok(snapshot) => {
                for record in aggregate::service_records(&snapshot, service) {
                    print_record(record);
                }
            }
            Err(e) => {
                warn!(error = %e, operation = "watch_service", service, "refresh failed");
            }
        }
        println!();
    }
}

/// Runs every requested watch loop until the process is interrupted
/// (ctrl-c, or SIGTERM on unix), then prints `Exiting` and returns
/// normally. Loops poll concurrently, each on its own interval.
pub async fn watch_services(
    repo: &SnapshotRepo,
    client: &MetricsClient,
    watches: &[(String, u64)],
) -> anyhow::Result<()> {
    if watches.is_empty() {
        return Ok(());
    }
    for (service, refresh_secs) in watches {
        info!(service = %service, refresh_secs = *refresh_secs, "watching service");
    }
    let loops = futures_util::future::join_all(
        watches
            .iter()
            .map(|(service, refresh_secs)| watch_service(repo, client, service, *refresh_secs)),
    );
    tokio::select! {
        _ = loops => {}
        _ = shutdown_signal() => {
            println!("Exiting");
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            Ok(s) => s,
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
