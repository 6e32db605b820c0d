//! Boutique descriptor parsing and option casting

use crate::core::value::{self, OctaveValue};
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

/// Error types for descriptor lookups
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("descriptor is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown option flag '{0}'")]
    UnknownFlag(String),

    #[error("option '{flag}' expects a number, got '{value}'")]
    NotANumber { flag: String, value: String },
}

/// A Boutique tool descriptor, reduced to the fields the launcher reads
#[derive(Debug, Clone, Deserialize)]
pub struct BoutiqueDescriptor {
    /// Tool name as published
    pub name: String,

    /// Tool version string
    #[serde(rename = "tool-version", default)]
    pub tool_version: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Declared inputs, the source of the option casting table
    pub inputs: Vec<BoutiqueInput>,
}

/// One input declaration
#[derive(Debug, Clone, Deserialize)]
pub struct BoutiqueInput {
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(rename = "type")]
    pub input_type: InputType,

    /// Flag as it appears on the tool command line, e.g. `--opt-time_filter-hp`
    #[serde(rename = "command-line-flag", default)]
    pub command_line_flag: Option<String>,

    #[serde(default)]
    pub list: bool,

    #[serde(default)]
    pub optional: bool,
}

/// Boutique input value types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum InputType {
    Number,
    String,
    File,
    Flag,
}

/// How one flag casts into an Octave assignment
#[derive(Debug, Clone)]
pub struct CastingEntry {
    /// Octave option path the flag translates to, e.g. `opt.time_filter.hp`
    pub option_path: String,

    pub input_type: InputType,

    pub list: bool,
}

/// Casting table keyed by the raw command-line flag
#[derive(Debug, Clone, Default)]
pub struct CastingTable {
    entries: HashMap<String, CastingEntry>,
}

/// Translate a Boutique flag into its Octave option path.
///
/// The `--` prefix drops and the remaining dashes become dots, so
/// `--opt-slice_timing-delay_in_tr` maps to
/// `opt.slice_timing.delay_in_tr` and `--opt_g-min_nb_vol` to
/// `opt_g.min_nb_vol`.
pub fn translate_flag(flag: &str) -> String {
    flag.trim_start_matches("--").replace('-', ".")
}

impl BoutiqueDescriptor {
    /// Parse a descriptor from JSON text
    pub fn from_json(text: &str) -> Result<Self, DescriptorError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Build the casting table from the declared inputs.
    ///
    /// Inputs without a command-line flag cannot be passed as options and
    /// are left out.
    pub fn casting_table(&self) -> CastingTable {
        let entries = self
            .inputs
            .iter()
            .filter_map(|input| {
                let flag = input.command_line_flag.clone()?;
                let entry = CastingEntry {
                    option_path: translate_flag(&flag),
                    input_type: input.input_type,
                    list: input.list,
                };
                Some((flag, entry))
            })
            .collect();
        CastingTable { entries }
    }
}

impl CastingTable {
    /// Look up a raw flag
    pub fn entry(&self, flag: &str) -> Option<&CastingEntry> {
        self.entries.get(flag)
    }

    /// Cast a raw `FLAG=VALUE` pair into `(option path, octave value)`.
    ///
    /// # Errors
    /// Returns `DescriptorError` when the flag is not declared by the
    /// descriptor or a `Number` input does not parse.
    pub fn cast(&self, flag: &str, raw: &str) -> Result<(String, OctaveValue), DescriptorError> {
        let entry = self
            .entries
            .get(flag)
            .ok_or_else(|| DescriptorError::UnknownFlag(flag.to_string()))?;

        let cast = match entry.input_type {
            InputType::Number => {
                value::cast_number(raw).ok_or_else(|| DescriptorError::NotANumber {
                    flag: flag.to_string(),
                    value: raw.to_string(),
                })?
            }
            InputType::String | InputType::File | InputType::Flag => value::cast_string(raw),
        };

        Ok((entry.option_path.clone(), cast))
    }
}

/// Whether a translated option path belongs to the input grabber
pub fn is_grabber_path(option_path: &str) -> bool {
    option_path.starts_with("opt_g")
}
