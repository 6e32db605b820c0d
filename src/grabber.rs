//! Input-layout sniffing and `files_in` construction
//!
//! NIAK reads its inputs through a grabber function chosen from what the
//! input directory contains. A `*_demographics.txt` roster takes
//! precedence, then a BIDS `dataset_description.json`, and a directory
//! with neither marker falls back to the fixed two-subject minc layout.

use crate::core::subjects;
use crate::core::value;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

/// What the input directory contains
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputLayout {
    /// A demographics roster next to the scans
    Demographics { roster: String },

    /// A BIDS dataset
    Bids,

    /// Neither marker, the two-subject minc layout
    Legacy,
}

impl InputLayout {
    pub fn name(&self) -> &'static str {
        match self {
            InputLayout::Demographics { .. } => "demographics",
            InputLayout::Bids => "bids",
            InputLayout::Legacy => "legacy",
        }
    }
}

/// Inspect the entries of `folder_in` and decide the grabber strategy.
///
/// A BIDS marker must parse as JSON to count.
pub fn sniff(folder_in: &Path) -> Result<InputLayout> {
    let mut rosters: Vec<String> = Vec::new();
    let mut bids_marker = None;

    let entries = std::fs::read_dir(folder_in)
        .with_context(|| format!("listing input folder {}", folder_in.display()))?;
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with("_demographics.txt") {
            rosters.push(name);
        } else if name.ends_with("dataset_description.json") && bids_marker.is_none() {
            bids_marker = Some(entry.path());
        }
    }

    rosters.sort();
    if let Some(roster) = rosters.into_iter().next() {
        debug!("found demographics roster {}", roster);
        return Ok(InputLayout::Demographics { roster });
    }

    if let Some(marker) = bids_marker {
        let text = std::fs::read_to_string(&marker)
            .with_context(|| format!("reading {}", marker.display()))?;
        serde_json::from_str::<serde_json::Value>(&text)
            .with_context(|| format!("parsing {}", marker.display()))?;
        debug!("found BIDS dataset description");
        return Ok(InputLayout::Bids);
    }

    Ok(InputLayout::Legacy)
}

/// Subject and modality narrowing for a BIDS grab
#[derive(Debug, Clone, Default)]
pub struct BidsSelection {
    pub subjects: Vec<u32>,
    pub func_hint: String,
    pub anat_hint: String,
}

/// Demographics strategy: read the roster, grab from the database folder
pub fn demographics_lines(folder_in: &str, roster: &str) -> Vec<String> {
    vec![
        format!(
            "list_subject=fcon_read_demog({})",
            value::quote(&format!("{}/{}", folder_in, roster))
        ),
        format!(
            "opt_g.path_database={}",
            value::quote(&format!("{}/", folder_in))
        ),
        "files_in=fcon_get_files(list_subject,opt_g)".to_string(),
    ]
}

/// BIDS strategy with an explicit `opt_gr` struct, always passed to the grab
pub fn bids_lines(folder_in: &str, selection: &BidsSelection) -> Vec<String> {
    let mut lines = vec!["opt_gr = struct()".to_string()];
    if !selection.subjects.is_empty() {
        debug!("subjects {:?}", selection.subjects);
        lines.push(format!(
            "opt_gr.subject_list = {}",
            subjects::octave_cell(&selection.subjects)
        ));
    }
    if !selection.func_hint.is_empty() {
        lines.push(format!(
            "opt_gr.func_hint = {}",
            value::quote(&selection.func_hint)
        ));
    }
    if !selection.anat_hint.is_empty() {
        lines.push(format!(
            "opt_gr.anat_hint = {}",
            value::quote(&selection.anat_hint)
        ));
    }
    lines.push(format!(
        "files_in=niak_grab_bids({},opt_gr)",
        value::quote(folder_in)
    ));
    lines
}

/// BIDS strategy for the app layout: `opt_gr` only narrows when a subject
/// list is given, and slice timing is always skipped
pub fn bids_app_lines(folder_in: &str, subject_list: &[u32]) -> Vec<String> {
    let mut lines = Vec::new();
    if subject_list.is_empty() {
        lines.push(format!("files_in=niak_grab_bids({})", value::quote(folder_in)));
    } else {
        lines.push(format!(
            "opt_gr.subject_list = {}",
            subjects::octave_cell(subject_list)
        ));
        lines.push(format!(
            "files_in=niak_grab_bids({},opt_gr)",
            value::quote(folder_in)
        ));
    }
    lines.push("opt.slice_timing.flag_skip=true".to_string());
    lines
}

/// Fallback strategy: the fixed anatomical and motor runs of two subjects
pub fn legacy_two_subject_lines(folder_in: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for subject in 1..=2 {
        lines.push(format!(
            "files_in.subject{}.anat={}",
            subject,
            value::quote(&format!("{}/anat_subject{}.mnc.gz", folder_in, subject))
        ));
        lines.push(format!(
            "files_in.subject{}.fmri.session1.motor={}",
            subject,
            value::quote(&format!("{}/func_motor_subject{}.mnc.gz", folder_in, subject))
        ));
    }
    lines
}

/// Grab over the outputs of a preprocessing run
pub fn preprocessed_lines(folder_in: &str, min_nb_vol: u32, include: &[u32]) -> Vec<String> {
    let mut lines = vec![
        format!("opt_g.min_nb_vol = {}", min_nb_vol),
        "opt_g.type_files = 'rest'".to_string(),
    ];
    if !include.is_empty() {
        lines.push(format!(
            "opt_g.include_subject = {}",
            subjects::octave_cell(include)
        ));
    }
    lines.push(format!(
        "files_in = niak_grab_fmri_preprocess({},opt_g)",
        value::quote(folder_in)
    ));
    lines
}
