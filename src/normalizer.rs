// Raw metric sources -> PercentMetric

use bollard::models::{ContainerMemoryStats, ContainerStatsResponse};
use std::fmt;
use tracing::warn;

use crate::models::{HostUsage, MetricType, PercentMetric};

const NANOS_PER_SEC: f64 = 1e9;

/// Tag naming a metric source, as used in config and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricKind {
    VirtualMemory,
    DiskMemory,
    HostCpuUsage,
    ContainerCpuUsage,
    ContainerMemoryUsage,
    Unrecognized(String),
}

impl MetricKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "virtual_memory" => MetricKind::VirtualMemory,
            "disk_memory" => MetricKind::DiskMemory,
            "host_cpu_usage" => MetricKind::HostCpuUsage,
            "container_cpu_usage" => MetricKind::ContainerCpuUsage,
            "container_memory_usage" => MetricKind::ContainerMemoryUsage,
            other => MetricKind::Unrecognized(other.to_string()),
        }
    }

    pub fn as_tag(&self) -> &str {
        match self {
            MetricKind::VirtualMemory => "virtual_memory",
            MetricKind::DiskMemory => "disk_memory",
            MetricKind::HostCpuUsage => "host_cpu_usage",
            MetricKind::ContainerCpuUsage => "container_cpu_usage",
            MetricKind::ContainerMemoryUsage => "container_memory_usage",
            MetricKind::Unrecognized(tag) => tag,
        }
    }

    /// Sources that need a container stats blob rather than a host reading.
    pub fn is_container_source(&self) -> bool {
        matches!(
            self,
            MetricKind::ContainerCpuUsage | MetricKind::ContainerMemoryUsage
        )
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// A metric source together with its raw payload.
#[derive(Debug, Clone, Copy)]
pub enum MetricSource<'a> {
    VirtualMemory(&'a HostUsage),
    DiskMemory(&'a HostUsage),
    /// Host CPU utilisation, already a percentage.
    HostCpuUsage(f64),
    /// Full stats blob; needs both `cpu_stats` and `precpu_stats`.
    ContainerCpuUsage(&'a ContainerStatsResponse),
    /// The stats blob's memory section; Docker may omit it or send it empty.
    ContainerMemoryUsage(Option<&'a ContainerMemoryStats>),
    Unrecognized(&'a str),
}

pub fn normalize(source: MetricSource<'_>) -> PercentMetric {
    match source {
        MetricSource::VirtualMemory(u) => {
            PercentMetric::reported(MetricType::MemoryUsage, u.used, u.total, u.percent)
        }
        MetricSource::DiskMemory(u) => {
            PercentMetric::reported(MetricType::DiskUsage, u.used, u.total, u.percent)
        }
        MetricSource::HostCpuUsage(pct) => {
            PercentMetric::reported(MetricType::CpuUsage, pct, 100.0, pct)
        }
        MetricSource::ContainerCpuUsage(stats) => {
            let pct = container_cpu_percent(stats);
            PercentMetric::reported(MetricType::CpuUsage, pct, 100.0, pct)
        }
        MetricSource::ContainerMemoryUsage(memory) => container_memory(memory),
        MetricSource::Unrecognized(tag) => {
            // Zero metric, tagged CpuUsage.
            warn!(metric_source = %tag, "no normalization for metric source");
            PercentMetric::zero(MetricType::CpuUsage)
        }
    }
}

/// CPU time consumed between the two samples, as a percentage of one second.
fn container_cpu_percent(stats: &ContainerStatsResponse) -> f64 {
    let total_usage = |cpu: Option<&bollard::models::ContainerCpuStats>| {
        cpu.and_then(|c| c.cpu_usage.as_ref())
            .and_then(|u| u.total_usage)
            .unwrap_or(0)
    };
    let current = total_usage(stats.cpu_stats.as_ref());
    let previous = total_usage(stats.precpu_stats.as_ref());
    current.abs_diff(previous) as f64 * 100.0 / NANOS_PER_SEC
}

fn container_memory(memory: Option<&ContainerMemoryStats>) -> PercentMetric {
    let Some(m) = memory else {
        return PercentMetric::zero(MetricType::MemoryUsage);
    };
    match (m.usage, m.limit) {
        (Some(usage), Some(limit)) => {
            PercentMetric::new(MetricType::MemoryUsage, usage as f64, limit as f64)
        }
        _ => PercentMetric::zero(MetricType::MemoryUsage),
    }
}
