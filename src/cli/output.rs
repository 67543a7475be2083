//! CLI output formatting
//!
//! Everything here is meant for stderr; stdout only carries the pipeline.

use crate::core::{condition::ChangedFiles, pipeline::Pipeline};
use crate::generation::Selection;
use console::Emoji;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static SKIP: Emoji<'_, '_> = Emoji("⏭️  ", "- ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");

/// Format the changed files a decision was based on
pub fn format_changes(changed: &ChangedFiles, max_lines: usize) -> String {
    if changed.is_empty() {
        return format!("{} No changed files, running everything", INFO);
    }

    let mut lines = vec![format!(
        "{} {} changed files:",
        INFO,
        style(changed.len()).cyan()
    )];
    lines.extend(
        changed
            .paths()
            .iter()
            .take(max_lines)
            .map(|path| format!("    {}", style(path.display()).dim())),
    );
    if changed.len() > max_lines {
        lines.push(format!(
            "    {}",
            style(format!("... ({} more)", changed.len() - max_lines)).dim()
        ));
    }
    lines.join("\n")
}

/// Format which groups a change set selects
pub fn format_selection(selection: &Selection) -> String {
    selection
        .decisions()
        .into_iter()
        .map(|(label, included)| {
            if included {
                format!("{} {}", CHECK, style(label).green())
            } else {
                format!("{} {}", SKIP, style(label).dim())
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One-line summary of a generated pipeline
pub fn format_pipeline_summary(pipeline: &Pipeline) -> String {
    let groups = pipeline.groups().count();
    let steps = pipeline.all_steps().len();
    format!(
        "{} Generated {} groups with {} steps",
        INFO,
        style(groups).cyan(),
        style(steps).cyan()
    )
}
