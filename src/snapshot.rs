// Builds one tick's records from the runtime (and optionally the host).

use tracing::{debug, error, warn};

use crate::docker_repo::{ContainerDescriptor, ContainerRuntime};
use crate::error::{Error, Result};
use crate::models::{
    ContainerState, ContainerSummary, HostSummary, MetricType, NetworkSnapshot, PercentMetric,
};
use crate::normalizer::{MetricKind, MetricSource, normalize};
use crate::sysinfo_repo::SysinfoRepo;

/// Strips a single leading '/' from a Docker container name.
pub fn container_name(raw: &str) -> &str {
    raw.strip_prefix('/').unwrap_or(raw)
}

pub struct SnapshotBuilder<R> {
    runtime: R,
}

impl<R: ContainerRuntime + Sync> SnapshotBuilder<R> {
    pub fn new(runtime: R) -> Self {
        Self { runtime }
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// One summary per running container, in listing order. Containers whose
    /// stats or state cannot be read are left out; a failed listing is an error.
    pub async fn containers(&self, timestamp: f64) -> Result<Vec<ContainerSummary>> {
        let descriptors = self.runtime.list_containers().await?;
        let mut summaries = Vec::with_capacity(descriptors.len());
        for d in &descriptors {
            match self.summarize(d, timestamp).await {
                Ok(s) => summaries.push(s),
                Err(e @ Error::UnknownContainerState(_)) => {
                    error!(
                        error = %e,
                        container_id = %d.id,
                        operation = "map_container_state",
                        "Docker reported a state outside the known vocabulary; skipping container"
                    );
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        container_id = %d.id,
                        operation = "container_stats",
                        "skipping container"
                    );
                }
            }
        }
        debug!(
            listed = descriptors.len(),
            summarized = summaries.len(),
            "container snapshot built"
        );
        Ok(summaries)
    }

    async fn summarize(&self, d: &ContainerDescriptor, timestamp: f64) -> Result<ContainerSummary> {
        let stats = self.runtime.container_stats(&d.id).await?;
        let state = ContainerState::from_docker(&d.status)?;
        let memory = normalize(MetricSource::ContainerMemoryUsage(
            stats.memory_stats.as_ref(),
        ));
        let cpu = normalize(MetricSource::ContainerCpuUsage(&stats));
        Ok(ContainerSummary {
            id: d.id.clone(),
            timestamp,
            name: container_name(&d.name).to_string(),
            image: d.image.clone(),
            state,
            metrics: vec![memory, cpu],
        })
    }

    pub async fn networks(&self, timestamp: f64) -> Result<Vec<NetworkSnapshot>> {
        let networks = self.runtime.list_networks().await?;
        Ok(networks
            .into_iter()
            .map(|n| NetworkSnapshot::new(n, timestamp))
            .collect())
    }
}

/// A failed host reading becomes the zero metric of its type.
fn reading_or_zero<T>(
    reading: Result<T>,
    tag: &str,
    metric_type: MetricType,
    to_metric: impl FnOnce(T) -> PercentMetric,
) -> PercentMetric {
    match reading {
        Ok(r) => to_metric(r),
        Err(e) => {
            warn!(
                error = %e,
                metric_source = %tag,
                operation = "host_summary",
                "host reading failed; using zero metric"
            );
            PercentMetric::zero(metric_type)
        }
    }
}

/// Reads each host source tag in order and normalizes it. Unknown tags and
/// failed readings yield the zero metric.
pub async fn host_summary(
    repo: &SysinfoRepo,
    sources: &[String],
    disk_mount: &str,
    timestamp: f64,
) -> HostSummary {
    let mut metrics = Vec::with_capacity(sources.len());
    for tag in sources {
        let metric = match MetricKind::from_tag(tag) {
            MetricKind::VirtualMemory => reading_or_zero(
                repo.virtual_memory().await,
                tag,
                MetricType::MemoryUsage,
                |u| normalize(MetricSource::VirtualMemory(&u)),
            ),
            MetricKind::DiskMemory => reading_or_zero(
                repo.disk_usage(disk_mount).await,
                tag,
                MetricType::DiskUsage,
                |u| normalize(MetricSource::DiskMemory(&u)),
            ),
            MetricKind::HostCpuUsage => reading_or_zero(
                repo.cpu_usage().await,
                tag,
                MetricType::CpuUsage,
                |pct| normalize(MetricSource::HostCpuUsage(pct)),
            ),
            // Container sources have no host payload.
            MetricKind::ContainerCpuUsage
            | MetricKind::ContainerMemoryUsage
            | MetricKind::Unrecognized(_) => normalize(MetricSource::Unrecognized(tag)),
        };
        metrics.push(metric);
    }
    HostSummary {
        timestamp,
        hostname: repo.hostname(),
        metrics,
    }
}
