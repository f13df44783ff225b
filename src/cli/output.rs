//! CLI output formatting

use crate::{
    core::{ConfigError, PipelineDefinition},
    validation::{ValidationError, ValidationReport},
};
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");

/// Create a progress bar
pub fn create_progress_bar(total: usize) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    let style = ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    progress.set_style(style);
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// One-line summary of a pipeline
pub fn format_pipeline_summary(pipeline: &PipelineDefinition) -> String {
    let vcs = match &pipeline.vcs {
        Some(binding) => format!("{} ({})", binding.root, binding.checkout_mode.as_str()),
        None => style("no VCS root").yellow().to_string(),
    };

    format!(
        "{} - {} step(s), {} trigger(s), {} feature(s), {} artifact rule(s) - {}",
        style(&pipeline.name).bold(),
        style(pipeline.steps.len()).cyan(),
        style(pipeline.triggers.len()).cyan(),
        style(pipeline.features.len()).cyan(),
        style(pipeline.artifact_rules.len()).cyan(),
        style(vcs).dim()
    )
}

/// Format a load failure for display
pub fn format_config_error(path: &Path, error: &ConfigError) -> String {
    let mut out = format!("{} {}: {}", CROSS, style(path.display()).bold(), style(error).red());
    if let Some(field) = error.field() {
        out.push_str(&format!("\n    field: {}", style(field).cyan()));
    }
    out
}

/// Format a single validation error
pub fn format_validation_error(error: &ValidationError) -> String {
    format!("  {} {} {}", WARN, error, style(format!("[{}]", error.field())).dim())
}

/// Format the outcome of validating one file
pub fn format_report(path: &Path, report: &ValidationReport) -> String {
    if report.is_valid() {
        return format!("{} {} is valid", CHECK, style(path.display()).bold());
    }

    let mut out = format!(
        "{} {}: {} validation error(s)",
        CROSS,
        style(path.display()).bold(),
        style(report.len()).red()
    );
    for error in report {
        out.push('\n');
        out.push_str(&format_validation_error(error));
    }
    out
}

/// JSON description of the outcome of validating one file
pub fn report_to_json(path: &Path, outcome: &Result<ValidationReport, ConfigError>) -> Value {
    match outcome {
        Ok(report) => json!({
            "file": path.display().to_string(),
            "valid": report.is_valid(),
            "errors": report
                .iter()
                .map(|e| json!({
                    "pipeline": e.pipeline(),
                    "field": e.field(),
                    "message": e.to_string(),
                }))
                .collect::<Vec<_>>(),
        }),
        Err(error) => json!({
            "file": path.display().to_string(),
            "valid": false,
            "load_error": {
                "field": error.field(),
                "message": error.to_string(),
            },
        }),
    }
}
