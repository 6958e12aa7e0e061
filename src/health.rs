// Health classification against CPU/memory thresholds

use crate::config::HealthConfig;
use crate::models::HealthStatus;

/// Healthy iff both metrics are strictly below their limits; a value equal
/// to its limit is Unhealthy. A record missing either metric is Unknown,
/// never Healthy. Applied once per record during refresh and stored.
pub fn classify(cpu: Option<f64>, memory: Option<f64>, limits: &HealthConfig) -> HealthStatus {
    match (cpu, memory) {
        (Some(cpu), Some(memory)) => {
            if cpu < limits.cpu_limit && memory < limits.memory_limit {
                HealthStatus::Healthy
            } else {
                HealthStatus::Unhealthy
            }
        }
        _ => HealthStatus::Unknown,
    }
}
