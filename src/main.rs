use anyhow::Result;
use docker_agent::config::{AppConfig, StorageBackend};
use docker_agent::store::{CsvStore, SqliteStore, StoreBackend};
use docker_agent::worker::{self, HostSampling, SamplerConfig, SamplingLoop};
use docker_agent::*;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    tracing::info!(
        "{} {} starting",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
    let app_config = AppConfig::load()?;

    let docker_repo = docker_repo::DockerRepo::connect()?;
    let store = match app_config.storage.backend {
        StorageBackend::Csv => StoreBackend::Csv(CsvStore::new(&app_config.storage.dir)?),
        StorageBackend::Sqlite => {
            StoreBackend::Sqlite(SqliteStore::connect(&app_config.storage.sqlite_path).await?)
        }
    };

    let mut sampler = SamplingLoop::new(
        docker_repo,
        store,
        SamplerConfig {
            interval: Duration::from_secs(app_config.sampling.interval_secs),
            containers_store: app_config.storage.containers_store.clone(),
            networks_store: app_config.storage.networks_store.clone(),
        },
    );
    if app_config.host.enabled {
        sampler = sampler.with_host(HostSampling {
            repo: sysinfo_repo::SysinfoRepo::new(),
            sources: app_config.host.sources.clone(),
            disk_mount: app_config.host.disk_mount.clone(),
            store: app_config.host.store.clone(),
        });
    }

    tracing::info!(
        interval_secs = app_config.sampling.interval_secs,
        backend = ?app_config.storage.backend,
        host = app_config.host.enabled,
        "sampler started"
    );
    let mut handle = worker::spawn(sampler);

    let stop_requested = tokio::select! {
        result = handle.finished() => {
            result?;
            false
        }
        _ = shutdown_signal() => true,
    };
    if stop_requested {
        tracing::info!("Received shutdown signal");
        handle.stop().await?;
    }

    Ok(())
}
