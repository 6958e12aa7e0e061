use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use fleetmon::*;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let args = cli::Args::parse();
    let watches = args.service_watches()?;
    let app_config = config::AppConfig::load()?;

    let client = metrics_client::MetricsClient::new(&app_config.upstream, args.port)?;
    let repo = snapshot_repo::SnapshotRepo::new(
        &app_config.cache.path,
        Duration::from_secs(app_config.cache.ttl_secs),
        app_config.upstream.max_concurrency,
        app_config.health.clone(),
    );

    let start = Instant::now();

    if args.printservers {
        views::print_servers(&repo, &client).await?;
    }
    if args.avg {
        views::print_service_averages(&repo, &client).await?;
    }
    if args.unhealthyservices {
        views::print_unhealthy_services(&repo, &client, app_config.health.min_healthy).await?;
    }
    views::watch_services(&repo, &client, &watches).await?;

    println!("Elapsed time: {:.3}", start.elapsed().as_secs_f64());
    Ok(())
}
