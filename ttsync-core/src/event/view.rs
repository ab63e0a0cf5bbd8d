//! The event capability shared by timetable series and remote calendar events.
//!
//! Both sides expose the same read-only view, which is all the conversions in
//! either direction need. The diff engine never looks at a view directly; it
//! only compares [`EventSeries`] values built with [`EventSeries::from_view`].

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, NaiveDate};
use chrono_tz::Tz;

use crate::address::BuildingDirectory;
use crate::error::{TtSyncError, TtSyncResult};
use crate::event::EventSeries;
use crate::recurrence;

pub trait EventView {
    fn id(&self) -> Option<&str>;
    fn title(&self) -> String;
    fn description(&self) -> String;
    fn address(&self) -> Option<String>;
    /// Start of the first occurrence, zone-aware.
    fn start(&self) -> TtSyncResult<DateTime<Tz>>;
    fn duration(&self) -> TtSyncResult<Duration>;
    /// Every date the event occurs on, including the first.
    fn occurrences(&self) -> TtSyncResult<BTreeSet<NaiveDate>>;
}

/// What a bare series needs to be presented as a calendar event.
#[derive(Debug, Clone)]
pub struct EncodeContext {
    pub tz: Tz,
    pub buildings: BuildingDirectory,
}

impl EncodeContext {
    pub fn new(tz: Tz, buildings: BuildingDirectory) -> Self {
        EncodeContext { tz, buildings }
    }
}

/// A series seen through an [`EncodeContext`].
pub struct SeriesView<'a> {
    series: &'a EventSeries,
    context: &'a EncodeContext,
}

impl EventSeries {
    pub fn view<'a>(&'a self, context: &'a EncodeContext) -> SeriesView<'a> {
        SeriesView {
            series: self,
            context,
        }
    }
}

impl EventView for SeriesView<'_> {
    fn id(&self) -> Option<&str> {
        self.series.remote_id.as_deref()
    }

    fn title(&self) -> String {
        self.series.title()
    }

    fn description(&self) -> String {
        self.series.instance.to_description()
    }

    fn address(&self) -> Option<String> {
        self.context
            .buildings
            .location_for(self.series.instance.rooms())
    }

    fn start(&self) -> TtSyncResult<DateTime<Tz>> {
        let first = self.series.first_date().ok_or_else(|| {
            TtSyncError::Encode(format!("'{}' has no dates", self.series.title()))
        })?;
        recurrence::localize(self.context.tz, first, self.series.instance.slot().start)
    }

    fn duration(&self) -> TtSyncResult<Duration> {
        Ok(self.series.instance.slot().duration)
    }

    fn occurrences(&self) -> TtSyncResult<BTreeSet<NaiveDate>> {
        Ok(self.series.dates.clone())
    }
}
