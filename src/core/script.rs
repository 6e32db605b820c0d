//! Octave script assembly

/// An Octave script that configures `opt`/`files_in` and calls one
/// pipeline entry point
#[derive(Debug, Clone)]
pub struct OctaveScript {
    /// Assignment lines, written in order
    lines: Vec<String>,

    /// NIAK function invoked at the end, e.g. `niak_pipeline_fmri_preprocess`
    entry_point: String,
}

impl OctaveScript {
    /// Create an empty script for the given entry point
    pub fn new(entry_point: impl Into<String>) -> Self {
        Self {
            lines: Vec::new(),
            entry_point: entry_point.into(),
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn extend<I>(&mut self, lines: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    /// Render the script text: semicolon-joined assignments, then the
    /// pipeline call on `files_in` and `opt`
    pub fn render(&self) -> String {
        if self.lines.is_empty() {
            return format!("{}(files_in, opt);\n", self.entry_point);
        }
        format!(
            "{};\n{}(files_in, opt);\n",
            self.lines.join(";\n"),
            self.entry_point
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_joins_lines_and_appends_call() {
        let mut script = OctaveScript::new("niak_pipeline_fmri_preprocess");
        script.push("opt.folder_out='/out'");
        script.push("files_in=niak_grab_bids('/in')");
        assert_eq!(
            script.render(),
            "opt.folder_out='/out';\n\
             files_in=niak_grab_bids('/in');\n\
             niak_pipeline_fmri_preprocess(files_in, opt);\n"
        );
    }

    #[test]
    fn test_render_without_lines() {
        let script = OctaveScript::new("niak_pipeline_stability_rest");
        assert_eq!(
            script.render(),
            "niak_pipeline_stability_rest(files_in, opt);\n"
        );
    }

    #[test]
    fn test_extend_keeps_order() {
        let mut script = OctaveScript::new("f");
        script.extend(["a=1".to_string(), "b=2".to_string()]);
        script.push("c=3");
        assert_eq!(script.lines(), &["a=1", "b=2", "c=3"]);
    }
}
