use anyhow::Result;
use owo_colors::OwoColorize;
use std::path::PathBuf;
use ttsync_core::config::SyncConfig;
use ttsync_core::diff::{SeriesDiff, changes};

use super::load_snapshot;
use crate::render::{Render, render_diff_list};

/// Show what a sync would change, without touching the calendar.
pub async fn run(config: &SyncConfig, timetable: Option<PathBuf>, verbose: bool) -> Result<()> {
    let snapshot = load_snapshot(config, timetable).await?;

    println!("📅 {}", config.calendar);

    for corrupt in &snapshot.remote.corrupt {
        println!("   {}", corrupt.render());
    }

    let mut diffs: Vec<SeriesDiff> = changes(snapshot.remote.series, snapshot.local)?.collect();
    super::sync::sort_diffs(&mut diffs);

    println!("{}", render_diff_list(&diffs, verbose));

    if !snapshot.remote.corrupt.is_empty() {
        println!(
            "\n{}",
            format!(
                "{} unreadable remote events will be deleted on sync",
                snapshot.remote.corrupt.len()
            )
            .dimmed()
        );
    }

    Ok(())
}
