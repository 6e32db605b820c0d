//! fMRI preprocessing, BIDS app launch style
//!
//! Participant-level runs stage into a scratch folder under the final
//! output folder and sync back when octave is done, whatever the
//! outcome. Group-level runs write in place and reuse the status the
//! participant runs left behind.

use crate::core::descriptor::{CastingTable, DescriptorError};
use crate::core::script::OctaveScript;
use crate::core::tuning::TuningConfig;
use crate::core::value::{self, OctaveValue};
use crate::grabber::{self, InputLayout};
use crate::octave::{self, ScriptRunner};
use crate::pipelines::{self, Settings, NIAK_FMRI_PREPROCESS};
use crate::sync;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Acquisition and filtering knobs of the preprocessing run
#[derive(Debug, Clone)]
pub struct PreprocessParams {
    /// PSOM workers, `opt.psom.max_queued`
    pub n_thread: u32,

    /// Slice timing acquisition type; left to NIAK when unset
    pub acquisition_type: Option<String>,

    pub scanner_type: String,

    /// Slice timing delay in units of TR
    pub delay_in_tr: f64,

    /// Volumes suppressed at the start of each run
    pub suppress_vol: u32,

    /// Time filter cutoffs in Hz
    pub hp: f64,
    pub lp: f64,

    /// `-distance` argument of the non-uniformity correction
    pub nu_correct_distance: u32,

    /// Spatial smoothing kernel in mm
    pub smooth_fwhm: f64,

    pub skip_slice_timing: bool,
}

impl Default for PreprocessParams {
    fn default() -> Self {
        Self {
            n_thread: 1,
            acquisition_type: None,
            scanner_type: String::new(),
            delay_in_tr: 0.0,
            suppress_vol: 0,
            hp: 0.01,
            lp: f64::INFINITY,
            nu_correct_distance: 50,
            smooth_fwhm: 6.0,
            skip_slice_timing: false,
        }
    }
}

impl PreprocessParams {
    /// Octave option lines these knobs translate to
    pub fn option_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("opt.psom.max_queued = {}", self.n_thread)];
        if let Some(acquisition) = &self.acquisition_type {
            lines.push(format!(
                "opt.slice_timing.type_acquisition = {}",
                value::quote(acquisition)
            ));
        }
        lines.push(format!(
            "opt.slice_timing.type_scanner = {}",
            value::quote(&self.scanner_type)
        ));
        lines.push(format!(
            "opt.slice_timing.delay_in_tr = {}",
            OctaveValue::Float(self.delay_in_tr)
        ));
        lines.push(format!(
            "opt.slice_timing.suppress_vol = {}",
            self.suppress_vol
        ));
        lines.push(format!(
            "opt.t1_preprocess.nu_correct.arg = '-distance {}'",
            self.nu_correct_distance
        ));
        lines.push(format!("opt.time_filter.hp = {}", OctaveValue::Float(self.hp)));
        lines.push(format!("opt.time_filter.lp = {}", OctaveValue::Float(self.lp)));
        lines.push(format!(
            "opt.smooth_vol.fwhm = {}",
            OctaveValue::Float(self.smooth_fwhm)
        ));
        if self.skip_slice_timing {
            lines.push("opt.slice_timing.flag_skip = true".to_string());
        }
        lines
    }
}

/// BIDS-app-style preprocessing launch
#[derive(Debug, Clone)]
pub struct FmriPreprocessBids {
    core: pipelines::PipelineCore,

    /// Where results must end up; the core writes to the staging folder
    folder_out_final: PathBuf,

    subjects: Vec<u32>,

    /// `opt.tune` prelude from the tuning file
    tuning: TuningConfig,

    group: bool,
}

impl FmriPreprocessBids {
    /// Create a launch; participant level stages under `folder_out`,
    /// group level runs in place.
    pub fn new(
        folder_in: &Path,
        folder_out: &Path,
        subjects: Vec<u32>,
        tuning: TuningConfig,
        params: &PreprocessParams,
        group: bool,
        settings: &Settings,
    ) -> Result<Self> {
        let folder_in = pipelines::resolve_symlink(folder_in);
        let staging = stage_folder(folder_out, &subjects, group, settings.debug)?;
        debug!("staging folder {}", staging.display());

        let mut core = pipelines::PipelineCore::new(folder_in, staging);
        if group {
            core.push_pipeline_option("opt.psom.flag_update = false");
            core.push_pipeline_option("opt.psom.flag_verbose = 2");
        } else {
            core.push_pipeline_option("opt.size_output = 'all'");
        }
        for line in params.option_lines() {
            core.push_pipeline_option(line);
        }

        Ok(Self {
            core,
            folder_out_final: folder_out.to_path_buf(),
            subjects,
            tuning,
            group,
        })
    }

    /// Cast and partition `FLAG=VALUE` pairs from the command line.
    ///
    /// Applied after the parameter lines, so an explicit flag overrides
    /// the corresponding knob.
    pub fn apply_cli_options(
        &mut self,
        table: &CastingTable,
        options: &[(String, String)],
    ) -> Result<(), DescriptorError> {
        self.core.apply_options(table, options)
    }

    /// The scratch (or in-place) folder octave writes into
    pub fn staging_folder(&self) -> &Path {
        &self.core.folder_out
    }

    pub fn is_group(&self) -> bool {
        self.group
    }

    /// Build the Octave script for the current input layout
    pub fn script(&self) -> Result<OctaveScript> {
        let layout = grabber::sniff(&self.core.folder_in)?;
        let folder_in = self.core.folder_in.display().to_string();

        let grabber_lines = match layout {
            InputLayout::Demographics { roster } => {
                grabber::demographics_lines(&folder_in, &roster)
            }
            InputLayout::Bids => grabber::bids_app_lines(&folder_in, &self.subjects),
            InputLayout::Legacy => grabber::legacy_two_subject_lines(&folder_in),
        };

        Ok(self
            .core
            .assemble(NIAK_FMRI_PREPROCESS, self.tuning.lines(), &grabber_lines))
    }

    /// Where the script is written before the run
    pub fn script_path(&self) -> PathBuf {
        self.core.folder_out.join("pipeline.m")
    }

    /// Write `pipeline.m`, run it, then sync the staging folder into the
    /// final folder. The sync runs even when octave fails, and the run
    /// failure is still the one reported.
    pub async fn run(&self, runner: &dyn ScriptRunner) -> Result<()> {
        let script = self.script()?;
        info!("{}", script.render());

        let script_path = self.script_path();
        octave::write_named_script(&script_path, &script.render())?;

        let run_result = runner.run_file(&script_path).await;
        let sync_result =
            sync::sync_results(&self.core.folder_out, &self.folder_out_final, runner).await;

        run_result.context("octave run failed")?;
        sync_result
    }
}

/// Pick the folder octave writes into.
///
/// Group runs go straight to the final folder. Participant runs stage in
/// a scratch folder named after the first subject (or `all`), or in a
/// fixed `results_debug` folder under debug so reruns land in one place.
fn stage_folder(
    final_dir: &Path,
    subjects: &[u32],
    group: bool,
    debug: bool,
) -> Result<PathBuf> {
    if group {
        return Ok(final_dir.to_path_buf());
    }

    std::fs::create_dir_all(final_dir)
        .with_context(|| format!("creating output folder {}", final_dir.display()))?;

    if debug {
        let staging = final_dir.join("results_debug");
        std::fs::create_dir_all(&staging)?;
        return Ok(staging);
    }

    let suffix = subjects
        .first()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "all".to_string());
    let staging = tempfile::Builder::new()
        .prefix("results")
        .suffix(&suffix)
        .tempdir_in(final_dir)
        .with_context(|| format!("creating staging folder under {}", final_dir.display()))?;
    Ok(staging.keep())
}
