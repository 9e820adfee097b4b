// Host-level readings and the per-tick host record

use serde::{Deserialize, Serialize};

use super::PercentMetric;

/// A used/total reading with the percentage as computed by the host repo.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HostUsage {
    pub used: f64,
    pub total: f64,
    pub percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostSummary {
    pub timestamp: f64,
    pub hostname: String,
    pub metrics: Vec<PercentMetric>,
}
