//! PSOM worker attachment

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::debug;

/// Default deadline for the pipeline to come up, 10 minutes
pub const DEFAULT_WAIT_SECS: u64 = 600;

const POLL_PERIOD: Duration = Duration::from_secs(5);

/// Spawn `psom_worker.py` against a running pipeline folder.
///
/// PSOM creates `logs/tmp/` once the pipeline accepts workers; the spawn
/// waits for that marker up to `wait_secs` and fails when it never shows.
pub async fn attach_worker(pipeline_dir: &Path, worker_id: u32, wait_secs: u64) -> Result<Child> {
    let marker = pipeline_dir.join("logs/tmp");
    let deadline = tokio::time::Instant::now() + Duration::from_secs(wait_secs);

    while !marker.exists() {
        if tokio::time::Instant::now() >= deadline {
            bail!(
                "pipeline under {} never came up ({} missing)",
                pipeline_dir.display(),
                marker.display()
            );
        }
        debug!("waiting for {}", marker.display());
        tokio::time::sleep(POLL_PERIOD).await;
    }

    Command::new("psom_worker.py")
        .arg("-d")
        .arg(pipeline_dir)
        .arg("-w")
        .arg(worker_id.to_string())
        .kill_on_drop(true)
        .spawn()
        .context("spawning psom_worker.py")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_attach_worker_times_out_without_marker() {
        let dir = tempfile::tempdir().unwrap();
        let result = attach_worker(dir.path(), 1, 0).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    #[ignore] // Requires psom_worker.py to be installed
    async fn test_attach_worker_spawns_when_marker_exists() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("logs/tmp")).unwrap();
        let child = attach_worker(dir.path(), 1, 1).await;
        assert!(child.is_ok());
    }
}
