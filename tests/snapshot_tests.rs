// SnapshotBuilder against an in-memory runtime

mod common;

use common::*;
use docker_agent::models::{ContainerState, MetricType};
use docker_agent::snapshot::SnapshotBuilder;

#[tokio::test]
async fn single_running_container_is_summarized() {
    let runtime = FakeRuntime {
        containers: vec![container(
            "c1",
            "running",
            Some(stats(50, 100, 2_000_000_000, 1_000_000_000)),
        )],
        ..Default::default()
    };
    let builder = SnapshotBuilder::new(runtime);
    let summaries = builder.containers(1_700_000_000.0).await.unwrap();
    assert_eq!(summaries.len(), 1);

    let s = &summaries[0];
    assert_eq!(s.id, "c1");
    assert_eq!(s.name, "c1-name");
    assert_eq!(s.image, "nginx:1.27");
    assert_eq!(s.timestamp, 1_700_000_000.0);
    assert_eq!(s.state, ContainerState::Running);

    let memory = s.metrics[0];
    assert_eq!(memory.metric_type, MetricType::MemoryUsage);
    assert_eq!((memory.value, memory.total, memory.percent), (50.0, 100.0, 50.0));

    let cpu = s.metrics[1];
    assert_eq!(cpu.metric_type, MetricType::CpuUsage);
    assert!((cpu.value - 100.0).abs() < 1e-9);
    assert_eq!(cpu.total, 100.0);
    assert!((cpu.percent - 100.0).abs() < 1e-9);
}

#[tokio::test]
async fn failed_stats_call_skips_only_that_container() {
    let runtime = FakeRuntime {
        containers: vec![
            container("a", "running", Some(stats(1, 2, 0, 0))),
            container("b", "running", None),
            container("c", "paused", Some(stats(1, 4, 0, 0))),
        ],
        ..Default::default()
    };
    let builder = SnapshotBuilder::new(runtime);
    let summaries = builder.containers(1.0).await.unwrap();
    let ids: Vec<&str> = summaries.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, ["a", "c"]);
    assert_eq!(summaries[1].state, ContainerState::Paused);
}

#[tokio::test]
async fn unknown_status_skips_container() {
    let runtime = FakeRuntime {
        containers: vec![
            container("a", "hibernating", Some(stats(1, 2, 0, 0))),
            container("b", "exited", Some(stats(1, 2, 0, 0))),
        ],
        ..Default::default()
    };
    let builder = SnapshotBuilder::new(runtime);
    let summaries = builder.containers(1.0).await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].id, "b");
    assert_eq!(summaries[0].state, ContainerState::Exited);
}

#[tokio::test]
async fn one_stats_call_per_listed_container() {
    let runtime = FakeRuntime {
        containers: vec![
            container("a", "running", Some(stats(1, 2, 0, 0))),
            container("b", "running", Some(stats(1, 2, 0, 0))),
        ],
        ..Default::default()
    };
    let builder = SnapshotBuilder::new(runtime);
    builder.containers(1.0).await.unwrap();
    let calls = builder.runtime().stats_calls.lock().unwrap().clone();
    assert_eq!(calls, ["a", "b"]);
}

#[tokio::test]
async fn listing_failure_is_an_error() {
    let runtime = FakeRuntime {
        fail_listing: true,
        ..Default::default()
    };
    let builder = SnapshotBuilder::new(runtime);
    assert!(builder.containers(1.0).await.is_err());
}

#[tokio::test]
async fn networks_get_the_tick_timestamp() {
    let runtime = FakeRuntime {
        networks: vec![network("bridge"), network("host")],
        ..Default::default()
    };
    let builder = SnapshotBuilder::new(runtime);
    let networks = builder.networks(42.5).await.unwrap();
    assert_eq!(networks.len(), 2);
    for n in &networks {
        assert_eq!(n.timestamp(), 42.5);
    }
    assert_eq!(networks[1].get("Name"), Some(&serde_json::json!("host")));
}
