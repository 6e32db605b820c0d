//! Octave value rendering

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Leading run of word characters, spaces, `+` and `-`, behind an optional quote
static STRING_SCRUB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^['"]?([\w +-]*)"#).expect("static pattern"));

/// Bare words Octave understands without quoting
const OCTAVE_LITERALS: [&str; 3] = ["true", "false", "Inf"];

/// A value rendered into Octave source text
#[derive(Debug, Clone, PartialEq)]
pub enum OctaveValue {
    Int(i64),
    Float(f64),
    /// Rendered bare (`true`, `false`, `Inf`)
    Literal(String),
    /// Rendered single-quoted
    Str(String),
}

impl fmt::Display for OctaveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OctaveValue::Int(n) => write!(f, "{}", n),
            OctaveValue::Float(x) if x.is_infinite() => {
                write!(f, "{}", if *x < 0.0 { "-Inf" } else { "Inf" })
            }
            OctaveValue::Float(x) => write!(f, "{}", x),
            OctaveValue::Literal(word) => write!(f, "{}", word),
            OctaveValue::Str(text) => write!(f, "{}", quote(text)),
        }
    }
}

/// Quote a string as an Octave single-quoted literal, doubling embedded quotes
pub fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Cast a raw option value declared as a number.
///
/// Integers stay integers; anything else must parse as a float.
pub fn cast_number(raw: &str) -> Option<OctaveValue> {
    let trimmed = raw.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return Some(OctaveValue::Int(n));
    }
    trimmed.parse::<f64>().ok().map(OctaveValue::Float)
}

/// Cast a raw option value declared as a string, file or flag.
///
/// Backslashes are dropped, then the value is scrubbed down to the leading
/// run of word characters, spaces, `+` and `-` behind an optional quote.
/// The words `true`, `false` and `Inf` render bare, everything else renders
/// as a quoted literal.
pub fn cast_string(raw: &str) -> OctaveValue {
    let cleaned = raw.replace('\\', "");
    let scrubbed = STRING_SCRUB
        .captures(&cleaned)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or("");

    if OCTAVE_LITERALS.contains(&scrubbed) {
        OctaveValue::Literal(scrubbed.to_string())
    } else {
        OctaveValue::Str(scrubbed.to_string())
    }
}
