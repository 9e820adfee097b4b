// Normalized percent-based metric

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetricType {
    MemoryUsage,
    DiskUsage,
    CpuUsage,
    NetworkIn,
    NetworkOut,
}

/// `percent` is `value / total * 100`, or 0 when `total` is 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentMetric {
    pub metric_type: MetricType,
    pub value: f64,
    pub total: f64,
    pub percent: f64,
}

impl PercentMetric {
    /// Derives `percent` from `value` and `total`. A zero (or negative) total
    /// means "no data" and yields an all-zero metric.
    pub fn new(metric_type: MetricType, value: f64, total: f64) -> Self {
        if total > 0.0 {
            Self {
                metric_type,
                value,
                total,
                percent: value / total * 100.0,
            }
        } else {
            Self::zero(metric_type)
        }
    }

    /// Keeps the percentage as reported by the source.
    pub fn reported(metric_type: MetricType, value: f64, total: f64, percent: f64) -> Self {
        Self {
            metric_type,
            value,
            total,
            percent,
        }
    }

    pub fn zero(metric_type: MetricType) -> Self {
        Self {
            metric_type,
            value: 0.0,
            total: 0.0,
            percent: 0.0,
        }
    }
}
