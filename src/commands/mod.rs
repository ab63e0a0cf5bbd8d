pub mod auth;
pub mod status;
pub mod sync;

use std::path::PathBuf;

use anyhow::{Context, Result};
use ttsync_core::config::SyncConfig;
use ttsync_core::date_range::DateRange;
use ttsync_core::event::{EncodeContext, EventSeries};
use ttsync_core::remote::list_all_events;
use ttsync_core::sync::{RemoteSnapshot, decode_remote};
use ttsync_core::timetable::{TimetableFile, TimetableSource};
use ttsync_provider_google::GoogleCalendar;

use crate::utils::tui;

/// Both sides of a sync, read and decoded.
pub struct Snapshot {
    pub context: EncodeContext,
    pub calendar: GoogleCalendar,
    pub local: Vec<EventSeries>,
    pub remote: RemoteSnapshot,
}

pub async fn load_snapshot(config: &SyncConfig, timetable: Option<PathBuf>) -> Result<Snapshot> {
    let context = config.encode_context()?;

    let path = timetable.unwrap_or_else(|| config.timetable_path());
    let source = TimetableFile::new(path, config.cache_ttl()?);
    let local = source
        .local_events()
        .with_context(|| format!("Failed to read timetable {}", source.path().display()))?;

    // An empty timetable would turn into deleting the whole calendar.
    let range = DateRange::span_of(&local)
        .with_context(|| format!("Timetable {} has no events", source.path().display()))?
        .padded(config.window_padding_days);

    let spinner = tui::create_spinner(format!("Reading {}", config.calendar));
    let remote = async {
        let calendar =
            GoogleCalendar::connect(config.google_account.as_deref(), &config.calendar).await?;
        let events = list_all_events(&calendar, &range).await?;
        anyhow::Ok((calendar, events))
    }
    .await;
    spinner.finish_and_clear();
    let (calendar, events) = remote?;

    tracing::info!(
        calendar = %config.calendar,
        range = %range,
        events = events.len(),
        "listed remote events"
    );

    let remote = decode_remote(events, context.tz);

    Ok(Snapshot {
        context,
        calendar,
        local,
        remote,
    })
}
