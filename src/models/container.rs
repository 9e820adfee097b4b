// Docker container models

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::PercentMetric;
use crate::error::Error;

/// Docker container lifecycle state; serializes to lowercase (e.g. "running").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerState {
    Restarting,
    Dead,
    Created,
    Exited,
    Paused,
    Running,
    Removing,
}

impl ContainerState {
    /// Exact lookup of a Docker status string. Anything outside the known
    /// vocabulary is an error; there is no fallback state.
    pub fn from_docker(s: &str) -> Result<Self, Error> {
        match s {
            "restarting" => Ok(ContainerState::Restarting),
            "dead" => Ok(ContainerState::Dead),
            "created" => Ok(ContainerState::Created),
            "exited" => Ok(ContainerState::Exited),
            "paused" => Ok(ContainerState::Paused),
            "running" => Ok(ContainerState::Running),
            "removing" => Ok(ContainerState::Removing),
            other => Err(Error::UnknownContainerState(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerState::Restarting => "restarting",
            ContainerState::Dead => "dead",
            ContainerState::Created => "created",
            ContainerState::Exited => "exited",
            ContainerState::Paused => "paused",
            ContainerState::Running => "running",
            ContainerState::Removing => "removing",
        }
    }
}

impl FromStr for ContainerState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_docker(s)
    }
}

impl std::fmt::Display for ContainerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One running container as seen in a single tick. Field order is the
/// column order of the containers store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerSummary {
    pub id: String,
    pub timestamp: f64,
    pub name: String,
    pub image: String,
    pub state: ContainerState,
    pub metrics: Vec<PercentMetric>,
}
