//! CLI command definitions

use crate::core::tuning::DEFAULT_SUBJECT_PAD;
use crate::octave::DEFAULT_TIMEOUT_SECS;
use crate::pipelines::{basc::DEFAULT_MIN_NB_VOL, PipelineKind, PreprocessParams};
use crate::worker::DEFAULT_WAIT_SECS;
use clap::Args;
use std::path::PathBuf;

/// What to launch and where, shared by `run` and `script`
#[derive(Debug, Args, Clone)]
pub struct LaunchArgs {
    /// Pipeline to launch
    #[arg(short, long, value_enum)]
    pub pipeline: PipelineKind,

    /// Input dataset folder
    #[arg(short, long)]
    pub input: PathBuf,

    /// Folder the results end up in
    #[arg(short, long)]
    pub output: PathBuf,

    /// Subjects to include, as a range expression ("1,3-5"); all when empty
    #[arg(short, long, default_value = "")]
    pub subjects: String,

    /// Tuning YAML file with per-subject option overrides
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Zero padding width of the subject labels in the tuning prelude
    #[arg(long, default_value_t = DEFAULT_SUBJECT_PAD)]
    pub subject_pad: usize,

    /// Extra pipeline options (FLAG=VALUE, repeatable)
    #[arg(long = "opt", value_parser = parse_key_value, allow_hyphen_values = true)]
    pub options: Vec<(String, String)>,

    /// Boutique descriptor to cast options with, instead of the shipped one
    #[arg(long)]
    pub descriptor: Option<PathBuf>,

    /// Filename hint selecting the functional runs of a BIDS grab
    #[arg(long, default_value = "")]
    pub func_hint: String,

    /// Filename hint selecting the anatomical scans of a BIDS grab
    #[arg(long, default_value = "")]
    pub anat_hint: String,

    /// Minimal number of volumes a run needs to enter the stability analysis
    #[arg(long, default_value_t = DEFAULT_MIN_NB_VOL)]
    pub min_nb_vol: u32,

    #[command(flatten)]
    pub preprocess: PreprocessArgs,
}

/// Preprocessing knobs of the BIDS app variant
#[derive(Debug, Args, Clone)]
pub struct PreprocessArgs {
    /// PSOM workers to queue jobs on
    #[arg(long, default_value_t = 1)]
    pub n_thread: u32,

    /// Slice timing acquisition type (e.g. "interleaved ascending")
    #[arg(long)]
    pub acquisition_type: Option<String>,

    /// Scanner model, when slice timing needs it
    #[arg(long, default_value = "")]
    pub scanner_type: String,

    /// Slice timing delay in units of TR
    #[arg(long, default_value_t = 0.0)]
    pub delay_in_tr: f64,

    /// Volumes suppressed at the start of each run
    #[arg(long, default_value_t = 0)]
    pub suppress_vol: u32,

    /// High-pass cutoff of the time filter, in Hz
    #[arg(long, default_value_t = 0.01)]
    pub hp: f64,

    /// Low-pass cutoff of the time filter, in Hz
    #[arg(long, default_value_t = f64::INFINITY)]
    pub lp: f64,

    /// Distance argument of the non-uniformity correction, in mm
    #[arg(long, default_value_t = 50)]
    pub nu_correct_distance: u32,

    /// Spatial smoothing kernel, in mm
    #[arg(long, default_value_t = 6.0)]
    pub smooth_fwhm: f64,

    /// Skip the slice timing correction
    #[arg(long)]
    pub skip_slice_timing: bool,

    /// Run the group stage over existing participant results
    #[arg(long)]
    pub group: bool,
}

impl From<&PreprocessArgs> for PreprocessParams {
    fn from(args: &PreprocessArgs) -> Self {
        PreprocessParams {
            n_thread: args.n_thread,
            acquisition_type: args.acquisition_type.clone(),
            scanner_type: args.scanner_type.clone(),
            delay_in_tr: args.delay_in_tr,
            suppress_vol: args.suppress_vol,
            hp: args.hp,
            lp: args.lp,
            nu_correct_distance: args.nu_correct_distance,
            smooth_fwhm: args.smooth_fwhm,
            skip_slice_timing: args.skip_slice_timing,
        }
    }
}

/// Launch a pipeline through Octave
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    #[command(flatten)]
    pub launch: LaunchArgs,

    /// Octave executable to run the script with
    #[arg(long, default_value = "octave")]
    pub octave: String,

    /// Wall time limit of the Octave run, in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Don't check BIDS inputs with bids-validator first
    #[arg(long)]
    pub skip_validation: bool,

    /// Pass --ignoreWarnings to bids-validator
    #[arg(long)]
    pub ignore_warnings: bool,

    /// Pass --ignoreNiftiHeaders to bids-validator
    #[arg(long)]
    pub ignore_nifti_headers: bool,
}

/// Print the Octave script a launch would run
#[derive(Debug, Args, Clone)]
pub struct ScriptCommand {
    #[command(flatten)]
    pub launch: LaunchArgs,
}

/// Check launch inputs without launching anything
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Input dataset folder to sniff
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Tuning YAML file to check
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Zero padding width of the subject labels in the tuning prelude
    #[arg(long, default_value_t = DEFAULT_SUBJECT_PAD)]
    pub subject_pad: usize,

    /// Pass --ignoreWarnings to bids-validator
    #[arg(long)]
    pub ignore_warnings: bool,

    /// Pass --ignoreNiftiHeaders to bids-validator
    #[arg(long)]
    pub ignore_nifti_headers: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// List the supported pipelines
#[derive(Debug, Args, Clone)]
pub struct ListCommand {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Attach a PSOM worker to a running pipeline
#[derive(Debug, Args, Clone)]
pub struct WorkerCommand {
    /// PSOM pipeline folder to attach to
    #[arg(short, long)]
    pub dir: PathBuf,

    /// Worker slot number
    #[arg(short, long)]
    pub worker_id: u32,

    /// Seconds to wait for the pipeline folder to show up
    #[arg(long, default_value_t = DEFAULT_WAIT_SECS)]
    pub wait_secs: u64,
}

/// Parse FLAG=VALUE pairs
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let parts: Vec<&str> = s.splitn(2, '=').collect();
    if parts.len() != 2 {
        return Err(format!("Invalid FLAG=VALUE pair: {}", s));
    }
    Ok((parts[0].to_string(), parts[1].to_string()))
}
