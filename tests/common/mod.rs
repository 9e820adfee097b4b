// Shared test helpers: an in-memory ContainerRuntime

#![allow(dead_code)]

use bollard::models::{
    ContainerCpuStats, ContainerCpuUsage, ContainerMemoryStats, ContainerStatsResponse,
};
use docker_agent::Error;
use docker_agent::docker_repo::{ContainerDescriptor, ContainerRuntime};
use serde_json::{Map, Value, json};
use std::sync::Mutex;

pub struct FakeContainer {
    pub descriptor: ContainerDescriptor,
    /// `None` makes the stats call fail, as if the container vanished.
    pub stats: Option<ContainerStatsResponse>,
}

#[derive(Default)]
pub struct FakeRuntime {
    pub containers: Vec<FakeContainer>,
    pub networks: Vec<Map<String, Value>>,
    pub fail_listing: bool,
    pub stats_calls: Mutex<Vec<String>>,
}

impl ContainerRuntime for FakeRuntime {
    async fn list_containers(&self) -> docker_agent::Result<Vec<ContainerDescriptor>> {
        if self.fail_listing {
            return Err(Error::Io(std::io::Error::other("docker daemon unreachable")));
        }
        Ok(self
            .containers
            .iter()
            .map(|c| c.descriptor.clone())
            .collect())
    }

    async fn container_stats(&self, id: &str) -> docker_agent::Result<ContainerStatsResponse> {
        self.stats_calls.lock().unwrap().push(id.to_string());
        self.containers
            .iter()
            .find(|c| c.descriptor.id == id)
            .and_then(|c| c.stats.clone())
            .ok_or_else(|| Error::StatsUnavailable(id.to_string()))
    }

    async fn list_networks(&self) -> docker_agent::Result<Vec<Map<String, Value>>> {
        Ok(self.networks.clone())
    }
}

fn cpu(total_usage: u64) -> ContainerCpuStats {
    ContainerCpuStats {
        cpu_usage: Some(ContainerCpuUsage {
            total_usage: Some(total_usage),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn stats(usage: u64, limit: u64, cpu_now: u64, cpu_prev: u64) -> ContainerStatsResponse {
    ContainerStatsResponse {
        cpu_stats: Some(cpu(cpu_now)),
        precpu_stats: Some(cpu(cpu_prev)),
        memory_stats: Some(ContainerMemoryStats {
            usage: Some(usage),
            limit: Some(limit),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn container(id: &str, status: &str, stats: Option<ContainerStatsResponse>) -> FakeContainer {
    FakeContainer {
        descriptor: ContainerDescriptor {
            id: id.to_string(),
            name: format!("/{id}-name"),
            image: "nginx:1.27".to_string(),
            status: status.to_string(),
        },
        stats,
    }
}

pub fn network(name: &str) -> Map<String, Value> {
    match json!({
        "Name": name,
        "Id": format!("{name}-id"),
        "Driver": "bridge",
        "IPAM": {"Driver": "default", "Config": [{"Subnet": "172.17.0.0/16"}]},
        "Options": {}
    }) {
        Value::Object(m) => m,
        _ => unreachable!(),
    }
}

pub fn csv_lines(path: &std::path::Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(String::from)
        .collect()
}
