use std::path::PathBuf;

use anyhow::Result;
use owo_colors::OwoColorize;
use ttsync_core::config::SyncConfig;
use ttsync_core::diff::{DiffCounts, DiffKind, SeriesDiff, changes, replace_all};
use ttsync_core::sync::{OutcomeStatus, SyncDriver, SyncOptions, SyncReport};

use super::load_snapshot;
use crate::render::{Render, render_counts, render_diff_list};
use crate::utils::tui;

pub struct SyncArgs {
    pub timetable: Option<PathBuf>,
    pub dry_run: bool,
    /// Delete every remote event and recreate the timetable from scratch.
    pub force: bool,
    pub verbose: bool,
}

/// Creates first, then updates, then deletes, each in date order.
pub fn sort_diffs(diffs: &mut [SeriesDiff]) {
    diffs.sort_by_key(|diff| {
        let rank = match diff.kind() {
            DiffKind::Create => 0,
            DiffKind::Update => 1,
            DiffKind::Delete => 2,
        };
        let series = diff.series();
        (rank, series.first_date(), series.instance.slot().start, series.title())
    });
}

pub async fn run(config: &SyncConfig, args: SyncArgs) -> Result<SyncReport> {
    let snapshot = load_snapshot(config, args.timetable).await?;

    let mut diffs: Vec<SeriesDiff> = if args.force {
        replace_all(snapshot.remote.series, snapshot.local).collect()
    } else {
        changes(snapshot.remote.series, snapshot.local)?.collect()
    };
    sort_diffs(&mut diffs);

    println!("📅 {}", config.calendar);
    for corrupt in &snapshot.remote.corrupt {
        println!("   {}", corrupt.render());
    }
    println!("{}", render_diff_list(&diffs, args.verbose));

    let driver = SyncDriver::new(
        &snapshot.calendar,
        &snapshot.context,
        SyncOptions {
            dry_run: args.dry_run,
        },
    );

    let spinner = tui::create_spinner(format!("Syncing {}", config.calendar));
    let mut report = driver.purge_corrupt(&snapshot.remote.corrupt).await;
    report.extend(driver.apply(diffs).await);
    spinner.finish_and_clear();

    let problems: Vec<_> = report
        .outcomes
        .iter()
        .filter(|o| !matches!(o.status, OutcomeStatus::Applied | OutcomeStatus::DryRun))
        .collect();
    if !problems.is_empty() {
        println!();
        for outcome in problems {
            println!("   {}", outcome.render());
        }
    }

    let counts: DiffCounts = report.counts();
    if !counts.is_empty() {
        let verb = if args.dry_run { "Would sync" } else { "Synced" };
        println!("\n{}: {}", verb, render_counts(&counts));
    }

    if !report.is_success() {
        println!(
            "{}",
            format!("{} changes failed", report.failures().count()).red()
        );
    }

    Ok(report)
}
