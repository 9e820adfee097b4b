// Domain models: one tick's container, network and host records

mod container;
mod host;
mod metric;
mod network;

pub use container::{ContainerState, ContainerSummary};
pub use host::{HostSummary, HostUsage};
pub use metric::{MetricType, PercentMetric};
pub use network::NetworkSnapshot;
