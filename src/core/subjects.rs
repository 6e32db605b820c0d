//! Subject range expressions

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Matches one range token: digits optionally followed by dash-separated digits
static RANGE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+(?:-[0-9]+)*").expect("static pattern"));

/// Expand a range expression into the sorted set of subject ids it denotes.
///
/// Tokens are separated by anything that is not part of a token (commas,
/// spaces, stray text). Each token is either a bare integer, an inclusive
/// range `a-b`, or a stepped range `a-b-c` (start `a`, stop at or before
/// `b`, step `c`), so `"1,3-5,10-14-2"` denotes 1, 3, 4, 5, 10, 12 and 14.
/// Duplicates collapse. Malformed tokens (zero step, more than three
/// parts, out-of-range integers) contribute nothing.
pub fn unroll(expr: &str) -> Vec<u32> {
    let mut ids = BTreeSet::new();
    collect(expr, &mut ids);
    ids.into_iter().collect()
}

/// Expand several range expressions into one sorted set.
pub fn unroll_many<'a>(exprs: impl IntoIterator<Item = &'a str>) -> Vec<u32> {
    let mut ids = BTreeSet::new();
    for expr in exprs {
        collect(expr, &mut ids);
    }
    ids.into_iter().collect()
}

fn collect(expr: &str, ids: &mut BTreeSet<u32>) {
    for token in RANGE_TOKEN.find_iter(expr) {
        let parts: Vec<Option<u32>> = token
            .as_str()
            .split('-')
            .map(|p| p.parse::<u32>().ok())
            .collect();

        match parts.as_slice() {
            [Some(n)] => {
                ids.insert(*n);
            }
            [Some(start), Some(end)] => {
                ids.extend(*start..=*end);
            }
            [Some(start), Some(end), Some(step)] if *step > 0 => {
                ids.extend((*start..=*end).step_by(*step as usize));
            }
            _ => {}
        }
    }
}

/// Render a sorted id list as an Octave cell array, e.g. `{1, 2, 3}`.
pub fn octave_cell(ids: &[u32]) -> String {
    let inner = ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{}}}", inner)
}
