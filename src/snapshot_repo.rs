// Snapshot cache: one JSON document on disk, TTL staleness from the stored
// write stamp, atomic replace on refresh.

use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::HealthConfig;
use crate::fetcher;
use crate::health;
use crate::metrics_client::MetricsClient;
use crate::models::{ServerRecord, Snapshot};

pub struct SnapshotRepo {
    path: PathBuf,
    ttl: Duration,
    max_concurrency: usize,
    limits: HealthConfig,
    /// Serializes refresh cycles; readers are unaffected since the file
    /// replace is atomic.
    refresh_guard: Mutex<()>,
}

impl SnapshotRepo {
    pub fn new(
        path: impl Into<PathBuf>,
        ttl: Duration,
        max_concurrency: usize,
        limits: HealthConfig,
    ) -> Self {
        Self {
            path: path.into(),
            ttl,
            max_concurrency,
            limits,
            refresh_guard: Mutex::new(()),
        }
    }

    /// True while the stored snapshot is strictly younger than the TTL. A
    /// missing, unreadable, or malformed file counts as stale, as does a
    /// write stamp in the future (clock skew).
    pub fn is_fresh(&self) -> bool {
        let snapshot = match self.load() {
            Ok(s) => s,
            Err(_) => return false,
        };
        unix_millis()
            .checked_sub(snapshot.written_at_ms)
            .is_some_and(|age_ms| Duration::from_millis(age_ms) < self.ttl)
    }

    /// Loads the persisted snapshot. Freshness is the caller's concern;
    /// plain reads never trigger a fetch.
    pub fn read(&self) -> anyhow::Result<Snapshot> {
        self.load()
    }

    /// Rebuilds the snapshot from upstream and atomically replaces the
    /// file. With no `servers` supplied the upstream list is fetched first.
    /// An empty list still overwrites with an empty snapshot (that is the
    /// upstream truth); only a storage write failure leaves the previous
    /// snapshot in place.
    pub async fn refresh(
        &self,
        client: &MetricsClient,
        servers: Option<Vec<String>>,
    ) -> anyhow::Result<Snapshot> {
        let _guard = self.refresh_guard.lock().await;

        let servers = match servers {
            Some(s) => s,
            None => client.list_servers().await,
        };
        let batch = fetcher::fetch_all(client, &servers, self.max_concurrency).await;

        let records: Vec<ServerRecord> = batch
            .into_iter()
            .map(|d| ServerRecord {
                status: health::classify(d.cpu, d.memory, &self.limits),
                ip: d.ip,
                cpu: d.cpu,
                memory: d.memory,
                service: d.service,
            })
            .collect();

        let snapshot = Snapshot {
            written_at_ms: unix_millis(),
            servers: records,
        };
        self.store(&snapshot)?;
        debug!(
            operation = "refresh",
            servers = snapshot.servers.len(),
            "snapshot replaced"
        );
        Ok(snapshot)
    }

    fn load(&self) -> anyhow::Result<Snapshot> {
        let data = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Write-to-temp-then-rename so a concurrent reader never observes a
    /// torn document.
    fn store(&self, snapshot: &Snapshot) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, serde_json::to_string(snapshot)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_else(|e| {
            warn!(error = %e, operation = "unix_millis", "system time before epoch");
            0
        })
}
