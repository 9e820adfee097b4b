use serde::Deserialize;

use crate::normalizer::MetricKind;
use crate::store::validate_store_name;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub sampling: SamplingConfig,
    pub storage: StorageConfig,
    pub host: HostConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Pause between the end of one pass and the start of the next.
    pub interval_secs: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self { interval_secs: 60 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Csv,
    Sqlite,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Directory holding `<store>.csv` files.
    pub dir: String,
    pub sqlite_path: String,
    pub containers_store: String,
    pub networks_store: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Csv,
            dir: ".".into(),
            sqlite_path: "data/metrics.db".into(),
            containers_store: "containers_info".into(),
            networks_store: "networks_info".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub enabled: bool,
    pub store: String,
    /// Metric source tags read every tick, in column order.
    pub sources: Vec<String>,
    pub disk_mount: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            store: "host_info".into(),
            sources: vec![
                "virtual_memory".into(),
                "disk_memory".into(),
                "host_cpu_usage".into(),
            ],
            disk_mount: "/".into(),
        }
    }
}

impl AppConfig {
    /// Reads `CONFIG_FILE` (or `config.toml`). Without either file the
    /// defaults are used.
    pub fn load() -> anyhow::Result<Self> {
        let explicit = std::env::var("CONFIG_FILE").ok();
        let path = explicit.clone().unwrap_or_else(|| "config.toml".into());
        match std::fs::read_to_string(&path) {
            Ok(s) => Self::load_from_str(&s),
            Err(e) if explicit.is_none() && e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path, "no config file; using defaults");
                Ok(Self::default())
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
            self.sampling.interval_secs > 0,
            "sampling.interval_secs must be > 0, got {}",
            self.sampling.interval_secs
        );
        match self.storage.backend {
            StorageBackend::Csv => anyhow::ensure!(
                !self.storage.dir.is_empty(),
                "storage.dir must be non-empty"
            ),
            StorageBackend::Sqlite => anyhow::ensure!(
                !self.storage.sqlite_path.is_empty(),
                "storage.sqlite_path must be non-empty"
            ),
        }
        for (field, name) in [
            ("storage.containers_store", &self.storage.containers_store),
            ("storage.networks_store", &self.storage.networks_store),
            ("host.store", &self.host.store),
        ] {
            anyhow::ensure!(
                validate_store_name(name).is_ok(),
                "{} must match [A-Za-z0-9_-]+, got {:?}",
                field,
                name
            );
        }
        for tag in &self.host.sources {
            anyhow::ensure!(
                !MetricKind::from_tag(tag).is_container_source(),
                "host.sources entry {:?} is a container metric source",
                tag
            );
        }
        Ok(())
    }
}
