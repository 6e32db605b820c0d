//! Supported NIAK pipelines
//!
//! Each pipeline turns its inputs into one Octave script: `opt.folder_out`
//! first, then the grabber lines that fill `files_in`, then the option
//! assignments, then the call into NIAK.

pub mod basc;
pub mod fmri_preprocess;
pub mod fmri_preprocess_bids;

pub use basc::Basc;
pub use fmri_preprocess::FmriPreprocess;
pub use fmri_preprocess_bids::{FmriPreprocessBids, PreprocessParams};

use crate::core::descriptor::{self, BoutiqueDescriptor, CastingTable, DescriptorError};
use crate::core::script::OctaveScript;
use crate::core::value;
use crate::octave::ScriptRunner;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// NIAK entry point of the preprocessing pipelines
pub const NIAK_FMRI_PREPROCESS: &str = "niak_pipeline_fmri_preprocess";

/// NIAK entry point of the stability analysis
pub const NIAK_STABILITY_REST: &str = "niak_pipeline_stability_rest";

/// PSOM site configuration installed before CBRAIN-style runs
const PSOM_GB_VARS_LOCAL: &str = include_str!("../../assets/psom_gb_vars_local.m");

/// The pipelines this launcher knows how to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineKind {
    /// Preprocessing, CBRAIN launch style
    FmriPreprocess,
    /// Preprocessing, BIDS app launch style
    FmriPreprocessBids,
    /// Stability analysis over preprocessed outputs
    Basc,
}

impl PipelineKind {
    pub fn all() -> [PipelineKind; 3] {
        [
            PipelineKind::FmriPreprocess,
            PipelineKind::FmriPreprocessBids,
            PipelineKind::Basc,
        ]
    }

    /// Name the pipeline is published under
    pub fn published_name(&self) -> &'static str {
        match self {
            PipelineKind::FmriPreprocess => "Niak_fmri_preprocess",
            PipelineKind::FmriPreprocessBids => "Niak_fmri_preprocess_bids",
            PipelineKind::Basc => "Niak_basc",
        }
    }

    /// Resolve a published name, including the older aliases
    pub fn from_published(name: &str) -> Option<PipelineKind> {
        match name {
            "Niak_fmri_preprocess" => Some(PipelineKind::FmriPreprocess),
            "Niak_fmri_preprocess_bids" => Some(PipelineKind::FmriPreprocessBids),
            "Niak_basc" | "Niak_stability_rest" => Some(PipelineKind::Basc),
            _ => None,
        }
    }

    /// NIAK function the generated script calls
    pub fn niak_function(&self) -> &'static str {
        match self {
            PipelineKind::FmriPreprocess | PipelineKind::FmriPreprocessBids => {
                NIAK_FMRI_PREPROCESS
            }
            PipelineKind::Basc => NIAK_STABILITY_REST,
        }
    }

    /// Boutique descriptor shipped with the launcher
    pub fn descriptor_source(&self) -> &'static str {
        match self {
            PipelineKind::FmriPreprocess => {
                include_str!("../../assets/descriptors/fmri_preprocess.json")
            }
            PipelineKind::FmriPreprocessBids => {
                include_str!("../../assets/descriptors/fmri_preprocess_bids.json")
            }
            PipelineKind::Basc => include_str!("../../assets/descriptors/basc.json"),
        }
    }

    /// Parse the shipped descriptor
    pub fn descriptor(&self) -> Result<BoutiqueDescriptor, DescriptorError> {
        BoutiqueDescriptor::from_json(self.descriptor_source())
    }
}

/// Environment-driven launcher settings
#[derive(Debug, Clone)]
pub struct Settings {
    /// Where the PSOM site configuration gets installed
    pub niak_config_path: PathBuf,

    /// Debug staging: results land in a fixed `results_debug` folder
    pub debug: bool,
}

impl Settings {
    /// Read `NIAK_CONFIG_PATH` and `DEBUG` from the environment
    pub fn from_env() -> Self {
        let niak_config_path = std::env::var("NIAK_CONFIG_PATH")
            .unwrap_or_else(|_| "/local_config".to_string())
            .into();
        let debug = std::env::var("DEBUG").map(|v| !v.is_empty()).unwrap_or(false);
        Self {
            niak_config_path,
            debug,
        }
    }
}

/// Install the PSOM site configuration into the config folder.
///
/// PSOM reads `psom_gb_vars_local.m` from there; without it the pipeline
/// falls back to defaults that do not fit the CBRAIN execution nodes.
pub fn install_psom_config(config_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(config_dir)
        .with_context(|| format!("creating config folder {}", config_dir.display()))?;
    let target = config_dir.join("psom_gb_vars_local.m");
    std::fs::write(&target, PSOM_GB_VARS_LOCAL)
        .with_context(|| format!("installing {}", target.display()))?;
    debug!("installed psom config at {}", target.display());
    Ok(target)
}

/// Absolute-ize a relative input folder against the working directory
pub fn resolve_input(folder_in: &Path) -> PathBuf {
    if folder_in.is_relative() {
        if let Ok(cwd) = std::env::current_dir() {
            let joined = cwd.join(folder_in);
            if joined.exists() {
                return joined;
            }
        }
    }
    folder_in.to_path_buf()
}

/// Resolve a symlinked input folder to its target, one level deep
pub fn resolve_symlink(folder_in: &Path) -> PathBuf {
    if folder_in.is_symlink() {
        if let Ok(target) = std::fs::read_link(folder_in) {
            return target;
        }
    }
    folder_in.to_path_buf()
}

/// Option marshaling shared by every pipeline
#[derive(Debug, Clone)]
pub struct PipelineCore {
    /// Input folder the grabber reads
    pub folder_in: PathBuf,

    /// Folder the pipeline writes into (staging for the BIDS app variant)
    pub folder_out: PathBuf,

    /// Cast `opt_g.*` assignments, applied before the grab
    grabber_options: Vec<String>,

    /// Cast `opt.*` assignments and variant extras
    pipeline_options: Vec<String>,
}

impl PipelineCore {
    pub fn new(folder_in: PathBuf, folder_out: PathBuf) -> Self {
        Self {
            folder_in,
            folder_out,
            grabber_options: Vec::new(),
            pipeline_options: Vec::new(),
        }
    }

    /// Cast `FLAG=VALUE` pairs through the descriptor and partition them
    /// between the grabber and the pipeline
    pub fn apply_options(
        &mut self,
        table: &CastingTable,
        options: &[(String, String)],
    ) -> Result<(), DescriptorError> {
        for (flag, raw) in options {
            let (path, cast) = table.cast(flag, raw)?;
            let line = format!("{}={}", path, cast);
            if descriptor::is_grabber_path(&path) {
                self.grabber_options.push(line);
            } else {
                self.pipeline_options.push(line);
            }
        }
        Ok(())
    }

    pub fn push_pipeline_option(&mut self, line: impl Into<String>) {
        self.pipeline_options.push(line.into());
    }

    pub fn grabber_options(&self) -> &[String] {
        &self.grabber_options
    }

    pub fn pipeline_options(&self) -> &[String] {
        &self.pipeline_options
    }

    /// Assemble the full script: prelude (tuning), output folder, grabber
    /// options and strategy, then the pipeline options
    pub fn assemble(
        &self,
        entry_point: &str,
        prelude: &[String],
        grabber_lines: &[String],
    ) -> OctaveScript {
        let mut script = OctaveScript::new(entry_point);
        script.extend(prelude.iter().cloned());
        script.push(format!(
            "opt.folder_out={}",
            value::quote(&self.folder_out.display().to_string())
        ));
        script.extend(self.grabber_options.iter().cloned());
        script.extend(grabber_lines.iter().cloned());
        script.extend(self.pipeline_options.iter().cloned());
        script
    }
}

/// A fully assembled launch, ready to script or run
#[derive(Debug, Clone)]
pub enum Launch {
    FmriPreprocess(FmriPreprocess),
    FmriPreprocessBids(FmriPreprocessBids),
    Basc(Basc),
}

impl Launch {
    pub fn kind(&self) -> PipelineKind {
        match self {
            Launch::FmriPreprocess(_) => PipelineKind::FmriPreprocess,
            Launch::FmriPreprocessBids(_) => PipelineKind::FmriPreprocessBids,
            Launch::Basc(_) => PipelineKind::Basc,
        }
    }

    /// The Octave script this launch would run
    pub fn script(&self) -> Result<OctaveScript> {
        match self {
            Launch::FmriPreprocess(pipeline) => pipeline.script(),
            Launch::FmriPreprocessBids(pipeline) => pipeline.script(),
            Launch::Basc(pipeline) => Ok(pipeline.script()),
        }
    }

    pub async fn run(&self, runner: &dyn ScriptRunner, settings: &Settings) -> Result<()> {
        match self {
            Launch::FmriPreprocess(pipeline) => pipeline.run(runner, settings).await,
            Launch::FmriPreprocessBids(pipeline) => pipeline.run(runner).await,
            Launch::Basc(pipeline) => pipeline.run(runner, settings).await,
        }
    }
}
