// Runtime configuration. Every field has a default matching the stock
// deployment, so the binary runs with no config file present.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub upstream: UpstreamConfig,
    pub cache: CacheConfig,
    pub health: HealthConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub host: String,
    /// Per-request timeout for both the list and detail calls.
    pub request_timeout_secs: u64,
    /// Ceiling on concurrent detail fetches during a refresh.
    pub max_concurrency: usize,
    pub filter: FilterConfig,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            request_timeout_secs: 5,
            max_concurrency: 16,
            filter: FilterConfig::default(),
        }
    }
}

/// Filter attributes sent as headers on every upstream request.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub cpu: String,
    pub memory: String,
    pub service: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            cpu: "100%".into(),
            memory: "53%".into(),
            service: "GroupService".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub path: String,
    /// Max snapshot age before a view triggers a refresh.
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: "server.json".into(),
            ttl_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    pub cpu_limit: f64,
    pub memory_limit: f64,
    /// Minimum healthy servers for a service to count as healthy.
    pub min_healthy: usize,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            cpu_limit: 80.0,
            memory_limit: 80.0,
            min_healthy: 2,
        }
    }
}

impl AppConfig {
    /// Loads from CONFIG_FILE (default fleetmon.toml). A missing file means
    /// stock defaults; an unreadable or invalid one is an error.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "fleetmon.toml".into());
        match std::fs::read_to_string(&path) {
            Ok(s) => Self::load_from_str(&s),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
            Err(e) => Err(anyhow::anyhow!("reading {}: {}", path, e)),
        }
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.upstream.host.is_empty(),
            "upstream.host must be non-empty"
        );
        anyhow::ensure!(
            self.upstream.request_timeout_secs > 0,
            "upstream.request_timeout_secs must be > 0, got {}",
            self.upstream.request_timeout_secs
        );
        anyhow::ensure!(
            self.upstream.max_concurrency > 0,
            "upstream.max_concurrency must be > 0, got {}",
            self.upstream.max_concurrency
        );
        anyhow::ensure!(!self.cache.path.is_empty(), "cache.path must be non-empty");
        anyhow::ensure!(
            self.cache.ttl_secs > 0,
            "cache.ttl_secs must be > 0, got {}",
            self.cache.ttl_secs
        );
        anyhow::ensure!(
            (0.0..=100.0).contains(&self.health.cpu_limit),
            "health.cpu_limit must be between 0 and 100, got {}",
            self.health.cpu_limit
        );
        anyhow::ensure!(
            (0.0..=100.0).contains(&self.health.memory_limit),
            "health.memory_limit must be between 0 and 100, got {}",
            self.health.memory_limit
        );
        anyhow::ensure!(
            self.health.min_healthy > 0,
            "health.min_healthy must be > 0, got {}",
            self.health.min_healthy
        );
        Ok(())
    }
}
