//! Stability analysis over preprocessed outputs
//!
//! Only works on the outputs of a preprocessing run; the grabber reads
//! the preprocessed tree directly, no layout sniffing involved.

use crate::core::descriptor::{CastingTable, DescriptorError};
use crate::core::script::OctaveScript;
use crate::core::subjects;
use crate::grabber;
use crate::octave::{self, ScriptRunner};
use crate::pipelines::{self, Settings, NIAK_STABILITY_REST};
use anyhow::Result;
use std::path::Path;
use tracing::info;

/// Default for `opt_g.min_nb_vol`, the volume count below which a run is
/// dropped from the analysis
pub const DEFAULT_MIN_NB_VOL: u32 = 100;

/// BASC launch over a preprocessed tree
#[derive(Debug, Clone)]
pub struct Basc {
    core: pipelines::PipelineCore,

    /// Subjects to include, empty means all
    subjects: Vec<u32>,

    min_nb_vol: u32,
}

impl Basc {
    pub fn new(folder_in: &Path, folder_out: &Path, subjects: &str, min_nb_vol: u32) -> Self {
        let folder_in = pipelines::resolve_input(folder_in);
        Self {
            core: pipelines::PipelineCore::new(folder_in, folder_out.to_path_buf()),
            subjects: subjects::unroll(subjects),
            min_nb_vol,
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

    /// Build the Octave script
    pub fn script(&self) -> OctaveScript {
        let folder_in = self.core.folder_in.display().to_string();
        let grabber_lines =
            grabber::preprocessed_lines(&folder_in, self.min_nb_vol, &self.subjects);
        self.core.assemble(NIAK_STABILITY_REST, &[], &grabber_lines)
    }

    /// Install the PSOM site configuration, write the script to a kept
    /// temporary file and run it
    pub async fn run(&self, runner: &dyn ScriptRunner, settings: &Settings) -> Result<()> {
        pipelines::install_psom_config(&settings.niak_config_path)?;

        let script = self.script();
        info!("{}", script.render());
        let script_path = octave::write_temp_script("niak_script_", &script.render())?;
        runner.run_file(&script_path).await?;
        Ok(())
    }
}
