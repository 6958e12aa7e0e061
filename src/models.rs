// Server records, snapshots, and derived per-service views

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
    /// Metrics missing or unparsable; excluded from mean aggregation.
    Unknown,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HealthStatus::Healthy => "Healthy",
            HealthStatus::Unhealthy => "Unhealthy",
            HealthStatus::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

/// One server's metrics plus its stored classification. cpu/memory/service
/// stay absent in the persisted JSON when the fetch or parse failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerRecord {
    pub ip: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    pub status: HealthStatus,
}

/// One complete acquisition cycle. Replaced wholesale on refresh, never
/// mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Unix millis at write time; the sole staleness signal.
    pub written_at_ms: u64,
    pub servers: Vec<ServerRecord>,
}

/// Per-service means over the members carrying both numeric fields.
/// Recomputed on every view request, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceAggregate {
    pub service: String,
    pub mean_cpu: Option<f64>,
    pub mean_memory: Option<f64>,
    pub healthy_count: usize,
    /// Members that contributed to the means.
    pub sample_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceHealth {
    pub service: String,
    pub healthy_count: usize,
}

/// Split of services on the healthy-member threshold. Exhaustive and
/// disjoint over the services present in the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HealthPartition {
    pub below: Vec<ServiceHealth>,
    pub at_or_above: Vec<ServiceHealth>,
}
