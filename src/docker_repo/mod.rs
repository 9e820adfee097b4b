// Docker container/network listing and one-shot stats via bollard

use bollard::Docker;
use bollard::query_parameters::{ListContainersOptions, ListNetworksOptions, StatsOptions};
use bollard::models::ContainerStatsResponse;
use futures_util::StreamExt;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::future::Future;
use tracing::instrument;

use crate::error::{Error, Result};

/// What the agent needs to know about a container before fetching its stats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerDescriptor {
    pub id: String,
    /// Raw Docker name, usually with a leading '/'.
    pub name: String,
    pub image: String,
    /// Docker status string, e.g. "running".
    pub status: String,
}

/// The container runtime as seen by the sampler. All calls are awaited one
/// at a time by the caller.
pub trait ContainerRuntime {
    fn list_containers(&self) -> impl Future<Output = Result<Vec<ContainerDescriptor>>> + Send;

    /// A single point-in-time stats blob, carrying both the current and the
    /// previous CPU counters.
    fn container_stats(&self, id: &str)
    -> impl Future<Output = Result<ContainerStatsResponse>> + Send;

    fn list_networks(&self) -> impl Future<Output = Result<Vec<Map<String, Value>>>> + Send;
}

pub struct DockerRepo {
    docker: Docker,
}

impl DockerRepo {
    /// Connects using the local defaults (unix socket, or `DOCKER_HOST`).
    pub fn connect() -> Result<Self> {
        let docker = Docker::connect_with_local_defaults()?;
        Ok(Self { docker })
    }
}

impl ContainerRuntime for DockerRepo {
    #[instrument(skip(self), fields(repo = "docker", operation = "list_containers"))]
    async fn list_containers(&self) -> Result<Vec<ContainerDescriptor>> {
        let mut filters = HashMap::new();
        filters.insert("status".to_string(), vec!["running".to_string()]);

        let filter = ListContainersOptions {
            all: false,
            filters: Some(filters),
            ..Default::default()
        };

        let containers = self.docker.list_containers(Some(filter)).await?;
        Ok(containers
            .into_iter()
            .map(|c| {
                let id = c.id.unwrap_or_default();
                let name = c
                    .names
                    .as_ref()
                    .and_then(|n| n.first())
                    .cloned()
                    .unwrap_or_else(|| id.clone());
                ContainerDescriptor {
                    name,
                    image: c.image.unwrap_or_default(),
                    status: c.state.as_ref().map(ToString::to_string).unwrap_or_default(),
                    id,
                }
            })
            .collect())
    }

    #[instrument(skip(self), fields(repo = "docker", operation = "container_stats"))]
    async fn container_stats(&self, id: &str) -> Result<ContainerStatsResponse> {
        // one_shot stays off so Docker fills precpu_stats.
        let options = StatsOptions {
            stream: false,
            ..Default::default()
        };
        let mut stream = self.docker.stats(id, Some(options));
        match stream.next().await {
            Some(Ok(s)) => Ok(s),
            Some(Err(e)) => Err(e.into()),
            None => Err(Error::StatsUnavailable(id.to_string())),
        }
    }

    #[instrument(skip(self), fields(repo = "docker", operation = "list_networks"))]
    async fn list_networks(&self) -> Result<Vec<Map<String, Value>>> {
        let networks = self
            .docker
            .list_networks(None::<ListNetworksOptions>)
            .await?;
        let mut out = Vec::with_capacity(networks.len());
        for n in networks {
            match serde_json::to_value(n)? {
                Value::Object(map) => out.push(map),
                other => out.push(Map::from_iter([("value".to_string(), other)])),
            }
        }
        Ok(out)
    }
}
