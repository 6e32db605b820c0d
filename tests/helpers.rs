//! Test utility functions for niakrun

use async_trait::async_trait;
use niakrun::octave::LaunchError;
use niakrun::ScriptRunner;
use std::path::Path;
use std::sync::Mutex;

/// Script runner that records the scripts it is asked to run
pub struct RecordingRunner {
    scripts: Mutex<Vec<String>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(Vec::new()),
        }
    }

    /// Scripts seen so far, in run order
    pub fn scripts(&self) -> Vec<String> {
        self.scripts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScriptRunner for RecordingRunner {
    async fn run_file(&self, script: &Path) -> Result<(), LaunchError> {
        let text = std::fs::read_to_string(script)?;
        self.scripts.lock().unwrap().push(text);
        Ok(())
    }
}

/// Runner that fails every run, for exercising the failure paths
pub struct FailingRunner;

#[async_trait]
impl ScriptRunner for FailingRunner {
    async fn run_file(&self, _script: &Path) -> Result<(), LaunchError> {
        Err(LaunchError::Exit(1))
    }
}

/// Lay out a minimal BIDS dataset in `dir`
pub fn make_bids_dataset(dir: &Path) {
    std::fs::write(
        dir.join("dataset_description.json"),
        r#"{"Name": "test dataset", "BIDSVersion": "1.0.2"}"#,
    )
    .unwrap();
    std::fs::create_dir_all(dir.join("sub-0001/func")).unwrap();
    std::fs::write(dir.join("sub-0001/func/sub-0001_task-rest_bold.nii.gz"), "").unwrap();
}

/// Lay out a dataset with a demographics roster in `dir`
pub fn make_demographics_dataset(dir: &Path) {
    std::fs::write(dir.join("cohort_demographics.txt"), "sub01\nsub02\n").unwrap();
}

/// Lay out the fixed two-subject minc inputs in `dir`
pub fn make_legacy_dataset(dir: &Path) {
    for subject in 1..=2 {
        std::fs::write(dir.join(format!("anat_subject{}.mnc.gz", subject)), "").unwrap();
        std::fs::write(dir.join(format!("func_motor_subject{}.mnc.gz", subject)), "").unwrap();
    }
}
