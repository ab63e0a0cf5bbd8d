use chrono::{Duration, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{TtSyncError, TtSyncResult};
use crate::event::{EventInstance, TimeSlot};
use crate::grouping::Fragment;
use crate::timetable::weeks::WeekCalendar;

const ELLIPSIS: &str = "...";

/// One cell of the timetable grid, with its text exactly as displayed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimetableCell {
    /// Day name, e.g. `Monday` or `Mon`.
    pub weekday: String,
    /// Start time, `HH:MM`.
    pub start: String,
    pub duration_minutes: u32,
    #[serde(default)]
    pub module_codes: String,
    #[serde(default)]
    pub module_name: String,
    #[serde(default)]
    pub rooms: String,
    #[serde(default)]
    pub lecturers: String,
    #[serde(default)]
    pub content_type: String,
    /// Week notation, e.g. `Sem 1: 1-5, 7`.
    pub weeks: String,
}

impl TimetableCell {
    pub fn slot(&self) -> TtSyncResult<TimeSlot> {
        let weekday: Weekday = self.weekday.trim().parse().map_err(|_| {
            TtSyncError::Timetable(format!("unknown weekday '{}'", self.weekday))
        })?;

        let start = NaiveTime::parse_from_str(self.start.trim(), "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(self.start.trim(), "%H:%M:%S"))
            .map_err(|_| TtSyncError::Timetable(format!("invalid start time '{}'", self.start)))?;

        if self.duration_minutes == 0 {
            return Err(TtSyncError::Timetable(format!(
                "cell at {} {} has no duration",
                self.weekday, self.start
            )));
        }

        Ok(TimeSlot::new(
            weekday,
            start,
            Duration::minutes(i64::from(self.duration_minutes)),
        ))
    }

    pub fn instance(&self) -> TtSyncResult<EventInstance> {
        Ok(EventInstance::new(
            split_field(&self.module_codes),
            remove_ellipsis(&self.module_name),
            split_field(&self.rooms),
            split_field(&self.lecturers),
            self.content_type.as_str(),
            self.slot()?,
        ))
    }

    /// One fragment per teaching week the cell runs in.
    pub fn fragments(&self, calendar: &WeekCalendar) -> TtSyncResult<Vec<Fragment>> {
        let instance = self.instance()?;
        let dates = calendar.dates(&self.weeks, instance.slot().weekday)?;

        Ok(dates
            .into_iter()
            .map(|date| Fragment::new(instance.clone(), date))
            .collect())
    }
}

fn remove_ellipsis(value: &str) -> &str {
    let value = value.trim();
    value.strip_suffix(ELLIPSIS).unwrap_or(value)
}

/// Split a comma separated field, dropping truncation markers.
fn split_field(value: &str) -> Vec<&str> {
    remove_ellipsis(value)
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != ELLIPSIS)
        .collect()
}
