//! fMRI preprocessing, CBRAIN launch style
//!
//! The script goes to a kept temporary file and octave runs with
//! `--no-gui`. Results are written straight to the output folder, no
//! staging involved.

use crate::core::descriptor::{CastingTable, DescriptorError};
use crate::core::script::OctaveScript;
use crate::core::subjects;
use crate::grabber::{self, BidsSelection, InputLayout};
use crate::octave::{self, ScriptRunner};
use crate::pipelines::{self, Settings, NIAK_FMRI_PREPROCESS};
use anyhow::Result;
use std::path::Path;
use tracing::info;

/// CBRAIN-style preprocessing launch
#[derive(Debug, Clone)]
pub struct FmriPreprocess {
    core: pipelines::PipelineCore,

    /// Subjects to narrow a BIDS grab to, empty means all
    subjects: Vec<u32>,

    func_hint: String,
    anat_hint: String,
}

impl FmriPreprocess {
    /// Create a launch over `folder_in`, writing to `folder_out`.
    ///
    /// `subjects` is a range expression (`"1,3-5"`); hints narrow which
    /// BIDS files count as functional and anatomical runs.
    pub fn new(
        folder_in: &Path,
        folder_out: &Path,
        subjects: &str,
        func_hint: &str,
        anat_hint: &str,
    ) -> Self {
        let folder_in = pipelines::resolve_input(folder_in);
        Self {
            core: pipelines::PipelineCore::new(folder_in, folder_out.to_path_buf()),
            subjects: subjects::unroll(subjects),
            func_hint: func_hint.to_string(),
            anat_hint: anat_hint.to_string(),
        }
    }

    /// Cast and partition `FLAG=VALUE` pairs from the command line
    pub fn apply_cli_options(
        &mut self,
        table: &CastingTable,
        options: &[(String, String)],
    ) -> Result<(), DescriptorError> {
        self.core.apply_options(table, options)
    }

    /// Build the Octave script for the current input layout
    pub fn script(&self) -> Result<OctaveScript> {
        let layout = grabber::sniff(&self.core.folder_in)?;
        let folder_in = self.core.folder_in.display().to_string();

        let grabber_lines = match layout {
            InputLayout::Demographics { roster } => {
                grabber::demographics_lines(&folder_in, &roster)
            }
            InputLayout::Bids => {
                let selection = BidsSelection {
                    subjects: self.subjects.clone(),
                    func_hint: self.func_hint.clone(),
                    anat_hint: self.anat_hint.clone(),
                };
                grabber::bids_lines(&folder_in, &selection)
            }
            InputLayout::Legacy => grabber::legacy_two_subject_lines(&folder_in),
        };

        Ok(self.core.assemble(NIAK_FMRI_PREPROCESS, &[], &grabber_lines))
    }

    /// Install the PSOM site configuration, write the script to a kept
    /// temporary file and run it
    pub async fn run(&self, runner: &dyn ScriptRunner, settings: &Settings) -> Result<()> {
        pipelines::install_psom_config(&settings.niak_config_path)?;

        let script = self.script()?;
        info!("{}", script.render());
        let script_path = octave::write_temp_script("niak_script_", &script.render())?;
        runner.run_file(&script_path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipelines::PipelineKind;
    use std::fs;

    #[test]
    fn test_script_over_bids_input() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("dataset_description.json"),
            r#"{"Name": "t"}"#,
        )
        .unwrap();

        let launch = FmriPreprocess::new(dir.path(), Path::new("/out"), "1-2", "rest", "");
        let script = launch.script().unwrap();
        let text = script.render();

        assert!(text.starts_with("opt.folder_out='/out';\n"));
        assert!(text.contains("opt_gr = struct()"));
        assert!(text.contains("opt_gr.subject_list = {1, 2}"));
        assert!(text.contains("opt_gr.func_hint = 'rest'"));
        assert!(!text.contains("anat_hint"));
        assert!(text.ends_with("niak_pipeline_fmri_preprocess(files_in, opt);\n"));
    }

    #[test]
    fn test_script_over_legacy_input() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("anat_subject1.mnc.gz"), "").unwrap();

        let launch = FmriPreprocess::new(dir.path(), Path::new("/out"), "", "", "");
        let script = launch.script().unwrap();
        let folder = dir.path().display().to_string();

        assert!(script
            .lines()
            .contains(&format!("files_in.subject1.anat='{}/anat_subject1.mnc.gz'", folder)));
        assert!(script
            .lines()
            .contains(&format!("files_in.subject2.fmri.session1.motor='{}/func_motor_subject2.mnc.gz'", folder)));
    }

    #[test]
    fn test_cli_options_reach_the_script() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("dataset_description.json"),
            r#"{"Name": "t"}"#,
        )
        .unwrap();

        let mut launch = FmriPreprocess::new(dir.path(), Path::new("/out"), "", "", "");
        let table = PipelineKind::FmriPreprocess
            .descriptor()
            .unwrap()
            .casting_table();
        launch
            .apply_cli_options(
                &table,
                &[("--opt-time_filter-hp".to_string(), "0.01".to_string())],
            )
            .unwrap();

        let script = launch.script().unwrap();
        assert!(script.lines().contains(&"opt.time_filter.hp=0.01".to_string()));
    }
}
