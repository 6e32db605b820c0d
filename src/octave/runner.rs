//! Octave invocation through a subprocess

use crate::octave::{LaunchError, ScriptRunner};
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

/// Default timeout for a pipeline run, 3 hours
pub const DEFAULT_TIMEOUT_SECS: u64 = 10800;

/// Runs scripts through the `octave` interpreter
#[derive(Debug, Clone)]
pub struct OctaveRunner {
    /// Path to the octave executable
    octave_path: String,

    /// Pass `--no-gui` when invoking
    no_gui: bool,

    /// Timeout for the whole run in seconds
    timeout_secs: u64,
}

impl Default for OctaveRunner {
    fn default() -> Self {
        Self {
            octave_path: "octave".to_string(),
            no_gui: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl OctaveRunner {
    /// Create a runner for the given executable and timeout
    pub fn new(octave_path: String, timeout_secs: u64) -> Self {
        Self {
            octave_path,
            no_gui: false,
            timeout_secs,
        }
    }

    /// Pass `--no-gui` to octave
    pub fn with_no_gui(mut self) -> Self {
        self.no_gui = true;
        self
    }

    /// Get the octave executable path
    #[cfg(test)]
    pub fn octave_path(&self) -> &str {
        &self.octave_path
    }
}

#[async_trait]
impl ScriptRunner for OctaveRunner {
    /// Run a script file to completion.
    ///
    /// The child inherits stdout and stderr so pipeline progress shows up
    /// directly, and is killed if the launcher is dropped mid-run.
    ///
    /// # Errors
    /// Returns `LaunchError` if:
    /// - The octave executable cannot be spawned
    /// - octave exits with a non-zero status or dies on a signal
    /// - The run exceeds the configured timeout
    async fn run_file(&self, script: &Path) -> Result<(), LaunchError> {
        let mut command = Command::new(&self.octave_path);
        if self.no_gui {
            command.arg("--no-gui");
        }
        command.arg(script);
        command.kill_on_drop(true);

        info!("{} {}", self.octave_path, script.display());

        let status = timeout(Duration::from_secs(self.timeout_secs), command.status())
            .await
            .map_err(|_| LaunchError::Timeout(self.timeout_secs))?
            .map_err(|e| LaunchError::Spawn {
                command: self.octave_path.clone(),
                source: e,
            })?;

        if status.success() {
            debug!("octave run finished");
            return Ok(());
        }

        match status.code() {
            Some(code) => Err(LaunchError::Exit(code)),
            None => Err(LaunchError::Killed),
        }
    }
}

/// Write script text to a kept temporary file, e.g. `niak_script_k3v9.m`.
///
/// The file survives the launcher so a failed run can be replayed by hand.
pub fn write_temp_script(prefix: &str, text: &str) -> Result<PathBuf, LaunchError> {
    let mut file = tempfile::Builder::new()
        .prefix(prefix)
        .suffix(".m")
        .tempfile()?;
    file.write_all(text.as_bytes())?;
    let (_, path) = file.keep().map_err(|e| LaunchError::Io(e.error))?;
    Ok(path)
}

/// Write script text to a fixed location, creating parent directories
pub fn write_named_script(path: &Path, text: &str) -> Result<(), LaunchError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, text)?;
    Ok(())
}
