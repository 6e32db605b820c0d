//! Result synchronisation out of the staging folder
//!
//! The BIDS app variant runs in a scratch folder under the final output
//! folder. After the run, results move into place with rsync and the
//! run's PSOM status files merge into the final logs so earlier runs
//! stay visible.

use crate::core::value;
use crate::octave::{self, ScriptRunner};
use anyhow::{bail, Context, Result};
use std::path::Path;
use tokio::process::Command;
use tracing::info;

/// Move results into place and merge run status into the final logs.
///
/// Nothing happens when staging and final are the same folder.
pub async fn sync_results(
    staging: &Path,
    final_dir: &Path,
    runner: &dyn ScriptRunner,
) -> Result<()> {
    if staging == final_dir {
        return Ok(());
    }
    info!("sync {} to {}", staging.display(), final_dir.display());
    rsync(staging, final_dir).await?;
    concat_status(staging, final_dir, runner).await?;
    Ok(())
}

/// `logs` and `report` stay behind; they are merged separately
async fn rsync(staging: &Path, final_dir: &Path) -> Result<()> {
    let status = Command::new("rsync")
        .args(rsync_args(staging, final_dir))
        .kill_on_drop(true)
        .status()
        .await
        .context("failed to spawn rsync")?;

    if !status.success() {
        bail!("rsync exited with {}", status);
    }
    Ok(())
}

/// The trailing slash on the source makes rsync copy the folder's
/// contents rather than the folder itself
fn rsync_args(staging: &Path, final_dir: &Path) -> Vec<String> {
    vec![
        "-a".to_string(),
        "--remove-source-files".to_string(),
        "--exclude".to_string(),
        "logs".to_string(),
        "--exclude".to_string(),
        "report".to_string(),
        format!("{}/", staging.display()),
        final_dir.display().to_string(),
    ]
}

/// Merge `PIPE_status.mat` and `PIPE_jobs.mat` from the staging logs into
/// the final logs through a one-shot octave script
pub async fn concat_status(
    staging: &Path,
    final_dir: &Path,
    runner: &dyn ScriptRunner,
) -> Result<()> {
    std::fs::create_dir_all(final_dir.join("logs"))
        .with_context(|| format!("creating {}/logs", final_dir.display()))?;

    let lines = concat_status_lines(staging, final_dir);
    let script = octave::write_temp_script("octave_run", &lines.join(";\n"))?;
    runner.run_file(&script).await?;
    Ok(())
}

/// Status fields named after group-level jobs are voided to `'none'`, so a
/// later group run recomputes them over the merged subjects
fn concat_status_lines(staging: &Path, final_dir: &Path) -> Vec<String> {
    let src_status = staging.join("logs/PIPE_status.mat");
    let dest_status = final_dir.join("logs/PIPE_status.mat");
    let src_jobs = staging.join("logs/PIPE_jobs.mat");
    let dest_jobs = final_dir.join("logs/PIPE_jobs.mat");

    vec![
        format!(
            "new_status = load({})",
            value::quote(&src_status.display().to_string())
        ),
        "fe = fieldnames(new_status)".to_string(),
        "for fn = fe'; if strfind(fn{1},'group'); new_status.(fn{1}) = 'none'; end; end"
            .to_string(),
        format!(
            "save({},'-append','-struct','new_status')",
            value::quote(&dest_status.display().to_string())
        ),
        format!(
            "jobs = load({})",
            value::quote(&src_jobs.display().to_string())
        ),
        format!(
            "save({},'-append','-struct','jobs')",
            value::quote(&dest_jobs.display().to_string())
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::octave::LaunchError;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::Mutex;

    struct RecordingRunner {
        scripts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ScriptRunner for RecordingRunner {
        async fn run_file(&self, script: &Path) -> Result<(), LaunchError> {
            let text = std::fs::read_to_string(script)?;
            self.scripts.lock().unwrap().push(text);
            Ok(())
        }
    }

    #[test]
    fn test_rsync_args() {
        let args = rsync_args(Path::new("/out/stage_ab12"), Path::new("/out"));
        assert_eq!(
            args,
            &[
                "-a",
                "--remove-source-files",
                "--exclude",
                "logs",
                "--exclude",
                "report",
                "/out/stage_ab12/",
                "/out",
            ]
        );
    }

    #[test]
    fn test_concat_status_lines() {
        let lines = concat_status_lines(Path::new("/stage"), Path::new("/final"));
        assert_eq!(
            lines,
            &[
                "new_status = load('/stage/logs/PIPE_status.mat')",
                "fe = fieldnames(new_status)",
                "for fn = fe'; if strfind(fn{1},'group'); new_status.(fn{1}) = 'none'; end; end",
                "save('/final/logs/PIPE_status.mat','-append','-struct','new_status')",
                "jobs = load('/stage/logs/PIPE_jobs.mat')",
                "save('/final/logs/PIPE_jobs.mat','-append','-struct','jobs')",
            ]
        );
    }

    #[tokio::test]
    async fn test_sync_results_same_folder_is_a_no_op() {
        let runner = RecordingRunner {
            scripts: Mutex::new(Vec::new()),
        };
        let dir = PathBuf::from("/same");
        sync_results(&dir, &dir, &runner).await.unwrap();
        assert!(runner.scripts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concat_status_creates_final_logs() {
        let staging = tempfile::tempdir().unwrap();
        let final_dir = tempfile::tempdir().unwrap();
        let runner = RecordingRunner {
            scripts: Mutex::new(Vec::new()),
        };

        concat_status(staging.path(), final_dir.path(), &runner)
            .await
            .unwrap();

        assert!(final_dir.path().join("logs").is_dir());
        let scripts = runner.scripts.lock().unwrap();
        assert_eq!(scripts.len(), 1);
        assert!(scripts[0].contains("PIPE_status.mat"));
        assert!(scripts[0].contains("'-append','-struct','jobs'"));
    }
}
