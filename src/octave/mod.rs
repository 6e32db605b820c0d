//! Octave subprocess launching

pub mod runner;

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

pub use runner::{write_named_script, write_temp_script, OctaveRunner, DEFAULT_TIMEOUT_SECS};

/// Error types for script launches
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("octave exited with code {0}")]
    Exit(i32),

    #[error("octave was terminated by a signal")]
    Killed,

    #[error("timeout after {0} seconds")]
    Timeout(u64),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for running generated scripts - allows for a mock interpreter
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    /// Run a script file to completion
    async fn run_file(&self, script: &Path) -> Result<(), LaunchError>;
}
