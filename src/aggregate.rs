// Derived per-service views: means, healthy counts, threshold partition.
// Pure functions over a snapshot; nothing here touches storage.

use std::collections::{BTreeMap, HashMap};

use crate::models::{
    HealthPartition, HealthStatus, ServerRecord, ServiceAggregate, ServiceHealth, Snapshot,
};

/// Groups records by service and averages cpu/memory over the members that
/// carry both numeric fields; a group with no such member gets None means.
/// Records without a service cannot be attributed and are skipped. Output
/// is sorted by service name.
pub fn means_by_service(snapshot: &Snapshot) -> Vec<ServiceAggregate> {
    let mut by_service: HashMap<&str, Vec<&ServerRecord>> = HashMap::new();
    for record in &snapshot.servers {
        if let Some(service) = record.service.as_deref() {
            by_service.entry(service).or_default().push(record);
        }
    }

    let mut out: Vec<ServiceAggregate> = Vec::with_capacity(by_service.len());
    for (service, members) in by_service {
        let cpus: Vec<f64> = members
            .iter()
            .filter_map(|r| r.cpu.filter(|_| r.memory.is_some()))
            .collect();
        let memories: Vec<f64> = members
            .iter()
            .filter_map(|r| r.memory.filter(|_| r.cpu.is_some()))
            .collect();
        let healthy_count = members
            .iter()
            .filter(|r| r.status == HealthStatus::Healthy)
            .count();
        let (mean_cpu, mean_memory) = if cpus.is_empty() {
            (None, None)
        } else {
            (Some(mean_f64(&cpus)), Some(mean_f64(&memories)))
        };
        out.push(ServiceAggregate {
            service: service.to_string(),
            mean_cpu,
            mean_memory,
            healthy_count,
            sample_count: cpus.len(),
        });
    }
    out.sort_by(|a, b| a.service.cmp(&b.service));
    out
}

/// Healthy members per service. Services whose members are all Unhealthy or
/// Unknown still appear, with a count of zero.
pub fn health_counts(snapshot: &Snapshot) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for record in &snapshot.servers {
        let Some(service) = record.service.as_deref() else {
            continue;
        };
        let entry = counts.entry(service.to_string()).or_insert(0);
        if record.status == HealthStatus::Healthy {
            *entry += 1;
        }
    }
    counts
}

/// Splits services on `healthy_count < min_healthy`. Every service in the
/// snapshot lands in exactly one side; an empty `below` is the normal
/// all-clear outcome, not an error.
pub fn unhealthy_services(snapshot: &Snapshot, min_healthy: usize) -> HealthPartition {
    let mut partition = HealthPartition::default();
    for (service, healthy_count) in health_counts(snapshot) {
        let entry = ServiceHealth {
            service,
            healthy_count,
        };
        if entry.healthy_count < min_healthy {
            partition.below.push(entry);
        } else {
            partition.at_or_above.push(entry);
        }
    }
    partition
}

/// Members of one service, in snapshot order.
pub fn service_records<'a>(snapshot: &'a Snapshot, service: &str) -> Vec<&'a ServerRecord> {
    snapshot
        .servers
        .iter()
        .filter(|r| r.service.as_deref() == Some(service))
        .collect()
}

fn mean_f64(v: &[f64]) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    v.iter().sum::<f64>() / (v.len() as f64)
}
