// Host memory / disk / cpu readings via sysinfo

use crate::error::{Error, Result};
use crate::models::HostUsage;
use std::path::Path;
use std::sync::{Arc, Mutex};
use sysinfo::{Disks, System};
use tracing::instrument;

pub struct SysinfoRepo {
    sys: Arc<Mutex<System>>,
    disks: Arc<Mutex<Disks>>,
}

impl Default for SysinfoRepo {
    fn default() -> Self {
        Self::new()
    }
}

fn usage(used: u64, total: u64) -> HostUsage {
    let percent = if total > 0 {
        (used as f64 / total as f64) * 100.0
    } else {
        0.0
    };
    HostUsage {
        used: used as f64,
        total: total as f64,
        percent,
    }
}

impl SysinfoRepo {
    pub fn new() -> Self {
        let mut sys = System::new();
        // Baseline for the first global_cpu_usage() delta.
        sys.refresh_cpu_all();
        sys.refresh_memory();
        let disks = Disks::new_with_refreshed_list();
        Self {
            sys: Arc::new(Mutex::new(sys)),
            disks: Arc::new(Mutex::new(disks)),
        }
    }

    pub fn hostname(&self) -> String {
        System::host_name().unwrap_or_default()
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "virtual_memory"))]
    pub async fn virtual_memory(&self) -> Result<HostUsage> {
        let sys = self.sys.clone();
        tokio::task::spawn_blocking(move || {
            let mut sys = sys
                .lock()
                .map_err(|e| Error::Host(format!("sysinfo lock poisoned: {}", e)))?;
            sys.refresh_memory();
            let total = sys.total_memory();
            let used = total.saturating_sub(sys.available_memory());
            Ok(usage(used, total))
        })
        .await?
    }

    /// Usage of the filesystem mounted at `mount`. Unknown mounts read as empty.
    #[instrument(skip(self), fields(repo = "sysinfo", operation = "disk_usage"))]
    pub async fn disk_usage(&self, mount: &str) -> Result<HostUsage> {
        let disks = self.disks.clone();
        let mount = mount.to_string();
        tokio::task::spawn_blocking(move || {
            let mut disks = disks
                .lock()
                .map_err(|e| Error::Host(format!("sysinfo disks lock poisoned: {}", e)))?;
            disks.refresh(true);
            let found = disks
                .list()
                .iter()
                .find(|d| d.mount_point() == Path::new(&mount));
            Ok(match found {
                Some(d) => {
                    let total = d.total_space();
                    usage(total.saturating_sub(d.available_space()), total)
                }
                None => {
                    tracing::warn!(mount = %mount, "no disk mounted at path");
                    usage(0, 0)
                }
            })
        })
        .await?
    }

    /// Global CPU utilisation since the previous call, clamped to 0..=100.
    #[instrument(skip(self), fields(repo = "sysinfo", operation = "cpu_usage"))]
    pub async fn cpu_usage(&self) -> Result<f64> {
        let sys = self.sys.clone();
        tokio::task::spawn_blocking(move || {
            let mut sys = sys
                .lock()
                .map_err(|e| Error::Host(format!("sysinfo lock poisoned: {}", e)))?;
            sys.refresh_cpu_all();
            Ok((sys.global_cpu_usage() as f64).clamp(0.0, 100.0))
        })
        .await?
    }
}
