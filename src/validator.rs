//! Optional BIDS dataset validation

use anyhow::{Context, Result};
use std::path::Path;
use tokio::process::Command;
use tracing::{error, info, warn};

/// What the validator should overlook
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatorFlags {
    pub ignore_warnings: bool,
    pub ignore_nifti_headers: bool,
}

/// Run `bids-validator` against the dataset when one is installed.
///
/// A machine without the validator gets a warning and the launch goes
/// ahead; so does a dataset the validator rejects. Only a validator that
/// is present but cannot be run is an error.
pub async fn validate_dataset(path: &Path, flags: ValidatorFlags) -> Result<()> {
    let probe = Command::new("bids-validator")
        .arg("--version")
        .kill_on_drop(true)
        .output()
        .await;

    let version = match probe {
        Ok(output) => String::from_utf8_lossy(&output.stdout).trim().to_string(),
        Err(_) => {
            warn!("cannot validate bids inputs, 'bids-validator' is not on the system");
            return Ok(());
        }
    };
    info!("bids-validator version {}", version);

    let mut command = Command::new("bids-validator");
    if flags.ignore_nifti_headers {
        command.arg("--ignoreNiftiHeaders");
    }
    if flags.ignore_warnings {
        command.arg("--ignoreWarnings");
    }
    command.arg(path);

    let output = command
        .kill_on_drop(true)
        .output()
        .await
        .context("running bids-validator")?;

    info!("{}", String::from_utf8_lossy(&output.stdout));
    if !output.stderr.is_empty() {
        error!("{}", String::from_utf8_lossy(&output.stderr));
    }
    if !output.status.success() {
        warn!("bids dataset not valid!");
    }
    Ok(())
}
