//! Per-subject tuning configuration from YAML
//!
//! A tuning file is one YAML mapping, read in document order. Keys that
//! start with `group` (any case) hold option trees applied to the whole
//! run; every other key is a subject range expression whose option tree
//! is repeated for each subject it unrolls to, under consecutive
//! `opt.tune(i)` indices.

use crate::core::subjects;
use crate::core::value::{self, OctaveValue};
use anyhow::{bail, Context, Result};
use serde_yaml::{Mapping, Value};
use std::path::Path;

/// Default zero-pad width of the `sub-NNNN` label
pub const DEFAULT_SUBJECT_PAD: usize = 4;

/// Octave assignments produced from a tuning file
#[derive(Debug, Clone, Default)]
pub struct TuningConfig {
    lines: Vec<String>,
}

impl TuningConfig {
    /// Load a tuning file
    pub fn from_file<P: AsRef<Path>>(path: P, pad_width: usize) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("reading tuning file {}", path.as_ref().display()))?;
        Self::from_yaml(&content, pad_width)
    }

    /// Parse a tuning document.
    ///
    /// `pad_width` is the zero-pad width of the emitted subject label, so
    /// subject 7 renders as `sub-0007` at the default width of 4.
    pub fn from_yaml(yaml: &str, pad_width: usize) -> Result<Self> {
        let doc: Mapping =
            serde_yaml::from_str(yaml).context("tuning file must be a YAML mapping")?;

        let mut lines = Vec::new();
        let mut next_index: usize = 1;

        for (key, val) in &doc {
            let key = key_text(key)?;
            let tree = match val.as_mapping() {
                Some(m) => m,
                None => bail!("entry '{}' must hold a mapping of options", key),
            };

            let mut leaves = Vec::new();
            flatten(tree, "", &mut leaves)?;

            if key.to_lowercase().starts_with("group") {
                for (path, cast) in &leaves {
                    lines.push(format!("opt{}={}", path, cast));
                }
            } else {
                let ids = subjects::unroll(&key);
                for (offset, id) in ids.iter().enumerate() {
                    let index = next_index + offset;
                    lines.push(format!(
                        "opt.tune({}).subject=\"sub-{:0width$}\"",
                        index,
                        id,
                        width = pad_width
                    ));
                    for (path, cast) in &leaves {
                        lines.push(format!("opt.tune({}){}={}", index, path, cast));
                    }
                }
                next_index += ids.len();
            }
        }

        Ok(Self { lines })
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Collect `(dotted path, cast value)` pairs for every leaf of an option tree
fn flatten(tree: &Mapping, at: &str, out: &mut Vec<(String, String)>) -> Result<()> {
    for (key, val) in tree {
        let key = key_text(key)?;
        let path = format!("{}.{}", at, key);
        match val {
            Value::Mapping(inner) => flatten(inner, &path, out)?,
            leaf => {
                let cast =
                    cast_scalar(leaf).with_context(|| format!("at option opt{}", path))?;
                out.push((path, cast));
            }
        }
    }
    Ok(())
}

fn key_text(key: &Value) -> Result<String> {
    match key {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => bail!("unsupported mapping key: {:?}", other),
    }
}

/// Render one YAML scalar (or flat sequence) as Octave source text
fn cast_scalar(val: &Value) -> Result<String> {
    match val {
        Value::String(s) => Ok(value::quote(s)),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok("''".to_string()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Ok(u.to_string())
            } else if let Some(f) = n.as_f64() {
                Ok(OctaveValue::Float(f).to_string())
            } else {
                bail!("unrepresentable number: {}", n)
            }
        }
        Value::Sequence(items) => {
            let parts: Vec<String> = items
                .iter()
                .map(cast_scalar)
                .collect::<Result<_>>()
                .context("inside a sequence")?;
            Ok(format!("{{{}}}", parts.join(", ")))
        }
        other => bail!("unsupported value: {:?}", other),
    }
}
