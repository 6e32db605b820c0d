//! CLI output formatting

use crate::pipelines::PipelineKind;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Create a spinner for the long-running Octave phase
pub fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Format the launch banner
pub fn format_launch(kind: PipelineKind, run_id: &str) -> String {
    format!(
        "{} Launching {} ({})",
        ROCKET,
        style(kind.published_name()).bold(),
        style(run_id).dim()
    )
}

/// Format one row of the pipeline listing
pub fn format_pipeline_row(kind: PipelineKind) -> String {
    format!(
        "{} calls {}",
        style(kind.published_name()).bold(),
        style(kind.niak_function()).cyan()
    )
}
