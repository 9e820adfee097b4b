// Sampling loop: list -> build -> persist, then sleep. One pass at a time.

use serde::Serialize;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

use crate::docker_repo::ContainerRuntime;
use crate::error::Result;
use crate::snapshot::{SnapshotBuilder, host_summary};
use crate::store::{self, Store};
use crate::sysinfo_repo::SysinfoRepo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerState {
    Idle,
    Sampling,
}

pub struct SamplerConfig {
    /// Measured from the end of a pass, so passes drift by their own duration.
    pub interval: Duration,
    pub containers_store: String,
    pub networks_store: String,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            containers_store: "containers_info".into(),
            networks_store: "networks_info".into(),
        }
    }
}

/// Host sampling, when enabled.
pub struct HostSampling {
    pub repo: SysinfoRepo,
    pub sources: Vec<String>,
    pub disk_mount: String,
    pub store: String,
}

/// Rows written by one pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub containers: usize,
    pub networks: usize,
    pub host: bool,
}

pub struct SamplingLoop<R, S> {
    builder: SnapshotBuilder<R>,
    store: S,
    host: Option<HostSampling>,
    config: SamplerConfig,
}

/// Unix time in seconds for the current tick.
pub fn unix_timestamp() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_else(|e| {
            tracing::warn!(
                error = %e,
                operation = "get_timestamp",
                "system time error"
            );
            0.0
        })
}

impl<R, S> SamplingLoop<R, S>
where
    R: ContainerRuntime + Send + Sync + 'static,
    S: Store + Send + Sync + 'static,
{
    pub fn new(runtime: R, store: S, config: SamplerConfig) -> Self {
        Self {
            builder: SnapshotBuilder::new(runtime),
            store,
            host: None,
            config,
        }
    }

    pub fn with_host(mut self, host: HostSampling) -> Self {
        self.host = Some(host);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn persist_all<T: Serialize>(&self, store_name: &str, records: &[T]) -> Result<()> {
        for r in records {
            store::append(&self.store, store_name, r).await?;
        }
        Ok(())
    }

    /// Runs one full pass. Per-container and per-host-metric failures are
    /// absorbed; listing and persistence failures are returned.
    pub async fn sample_once(&self) -> Result<TickReport> {
        let timestamp = unix_timestamp();

        let containers = self.builder.containers(timestamp).await?;
        let networks = self.builder.networks(timestamp).await?;
        self.persist_all(&self.config.containers_store, &containers)
            .await?;
        self.persist_all(&self.config.networks_store, &networks)
            .await?;

        let mut report = TickReport {
            containers: containers.len(),
            networks: networks.len(),
            host: false,
        };
        if let Some(host) = &self.host {
            let summary =
                host_summary(&host.repo, &host.sources, &host.disk_mount, timestamp).await;
            store::append(&self.store, &host.store, &summary).await?;
            report.host = true;
        }

        tracing::info!(
            containers = report.containers,
            networks = report.networks,
            host = report.host,
            "Containers and networks metrics saved"
        );
        Ok(report)
    }

    /// Samples until `shutdown_rx` fires (or its sender is dropped). The signal
    /// is only observed between passes. Returns the first fatal pass error.
    #[tracing::instrument(
        name = "sampler",
        level = "debug",
        skip_all,
        fields(interval_secs = self.config.interval.as_secs())
    )]
    pub async fn run(
        self,
        mut shutdown_rx: oneshot::Receiver<()>,
        state_tx: watch::Sender<SamplerState>,
    ) -> Result<()> {
        loop {
            state_tx.send_replace(SamplerState::Sampling);
            let result = self.sample_once().await;
            state_tx.send_replace(SamplerState::Idle);
            if let Err(e) = result {
                tracing::error!(error = %e, operation = "sample_once", "sampling pass failed");
                return Err(e);
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.interval) => {}
                _ = &mut shutdown_rx => {
                    tracing::debug!("Sampler shutting down");
                    break;
                }
            }
        }
        Ok(())
    }
}

/// Handle to a spawned sampler.
pub struct SamplerHandle {
    shutdown_tx: oneshot::Sender<()>,
    state_rx: watch::Receiver<SamplerState>,
    /// Taken once the loop's result has been observed.
    join: Option<JoinHandle<Result<()>>>,
}

impl SamplerHandle {
    pub fn state(&self) -> SamplerState {
        *self.state_rx.borrow()
    }

    pub fn is_finished(&self) -> bool {
        self.join.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Asks the loop to stop after the current pass and waits for it. Returns
    /// `Ok(())` if `finished` already reported the loop's result.
    pub async fn stop(self) -> Result<()> {
        let _ = self.shutdown_tx.send(());
        match self.join {
            Some(join) => join.await?,
            None => Ok(()),
        }
    }

    /// Waits for the loop to end on its own, which only happens on a fatal
    /// pass error. Cancel-safe: dropping the future leaves the handle intact.
    pub async fn finished(&mut self) -> Result<()> {
        let Some(join) = self.join.as_mut() else {
            return Ok(());
        };
        let result = join.await;
        self.join = None;
        result?
    }
}

pub fn spawn<R, S>(sampler: SamplingLoop<R, S>) -> SamplerHandle
where
    R: ContainerRuntime + Send + Sync + 'static,
    S: Store + Send + Sync + 'static,
{
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let (state_tx, state_rx) = watch::channel(SamplerState::Idle);
    let join = tokio::spawn(sampler.run(shutdown_rx, state_tx));
    SamplerHandle {
        shutdown_tx,
        state_rx,
        join: Some(join),
    }
}
