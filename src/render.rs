//! Coloured terminal rendering for ttsync types.

use owo_colors::OwoColorize;
use ttsync_core::diff::{DiffCounts, DiffKind, SeriesDiff};
use ttsync_core::sync::{CorruptEvent, OutcomeStatus, SyncOutcome};

pub trait Render {
    fn render(&self) -> String;
}

impl Render for DiffKind {
    fn render(&self) -> String {
        colorize(*self, &self.to_string())
    }
}

fn colorize(kind: DiffKind, text: &str) -> String {
    match kind {
        DiffKind::Create => text.green().to_string(),
        DiffKind::Update => text.yellow().to_string(),
        DiffKind::Delete => text.red().to_string(),
    }
}

impl Render for SeriesDiff {
    fn render(&self) -> String {
        let series = self.series();
        let slot = series.instance.slot().to_string();
        format!(
            "{} {} {}",
            self.kind().render(),
            colorize(self.kind(), &series.title()),
            slot.dimmed()
        )
    }
}

impl Render for CorruptEvent {
    fn render(&self) -> String {
        format!(
            "{} {} {}",
            "!".red(),
            self.event.summary.red(),
            format!("({})", self.reason).dimmed()
        )
    }
}

impl Render for SyncOutcome {
    fn render(&self) -> String {
        let status = match &self.status {
            OutcomeStatus::Applied => "done".dimmed().to_string(),
            OutcomeStatus::DryRun => "dry run".dimmed().to_string(),
            OutcomeStatus::Skipped(reason) => format!("skipped: {}", reason).yellow().to_string(),
            OutcomeStatus::Failed(error) => format!("failed: {}", error).red().to_string(),
        };
        format!("{} {} {}", self.action.render(), self.series, status)
    }
}

/// Show counts instead of individual changes above this many.
const COMPACT_THRESHOLD: usize = 10;

pub fn render_diff_list(diffs: &[SeriesDiff], verbose: bool) -> String {
    if diffs.is_empty() {
        return "   No changes".dimmed().to_string();
    }

    if verbose || diffs.len() <= COMPACT_THRESHOLD {
        return diffs
            .iter()
            .map(|diff| format!("   {}", diff.render()))
            .collect::<Vec<_>>()
            .join("\n");
    }

    let counts: DiffCounts = diffs.iter().collect();
    let mut lines = Vec::new();
    for (kind, count, label) in [
        (DiffKind::Create, counts.created, "new"),
        (DiffKind::Update, counts.updated, "changed"),
        (DiffKind::Delete, counts.deleted, "removed"),
    ] {
        if count > 0 {
            let text = format!("({} {} {})", count, label, pluralize("event", count));
            lines.push(format!("   {} {}", kind.render(), colorize(kind, &text)));
        }
    }
    lines.join("\n")
}

pub fn render_counts(counts: &DiffCounts) -> String {
    format!(
        "{} created, {} updated, {} deleted",
        counts.created.green(),
        counts.updated.yellow(),
        counts.deleted.red()
    )
}

fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}
