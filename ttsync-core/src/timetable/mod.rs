//! Local timetable events, read from the timetable portal's export.
//!
//! Scraping the portal happens elsewhere. Its output is a JSON document with
//! the week selector labels and the grid cells, which this module turns into
//! deduplicated series.

mod cell;
mod weeks;

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::error::{TtSyncError, TtSyncResult};
use crate::event::EventSeries;
use crate::grouping::{Fragment, group_fragments};

pub use cell::TimetableCell;
pub use weeks::{SemesterWeek, WeekCalendar, WeekLabel, parse_week_notation};

/// Anything that can produce the local side of a sync.
pub trait TimetableSource {
    /// Series with at most one entry per group.
    fn local_events(&self) -> TtSyncResult<Vec<EventSeries>>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimetableExport {
    /// Week selector labels, as displayed.
    pub weeks: Vec<String>,
    pub cells: Vec<TimetableCell>,
}

impl TimetableExport {
    pub fn from_json(json: &str) -> TtSyncResult<Self> {
        serde_json::from_str(json).map_err(|e| TtSyncError::Serialization(e.to_string()))
    }

    pub fn calendar(&self) -> WeekCalendar {
        WeekCalendar::from_labels(self.weeks.iter().map(String::as_str))
    }

    pub fn fragments(&self) -> TtSyncResult<Vec<Fragment>> {
        let calendar = self.calendar();
        if calendar.is_empty() {
            return Err(TtSyncError::Timetable(
                "export contains no teaching weeks".into(),
            ));
        }

        let mut fragments = Vec::new();
        for cell in &self.cells {
            fragments.extend(cell.fragments(&calendar)?);
        }
        Ok(fragments)
    }
}

impl TimetableSource for TimetableExport {
    fn local_events(&self) -> TtSyncResult<Vec<EventSeries>> {
        Ok(group_fragments(self.fragments()?))
    }
}

/// An export on disk.
#[derive(Debug, Clone)]
pub struct TimetableFile {
    path: PathBuf,
    max_age: Duration,
}

impl TimetableFile {
    pub fn new(path: impl Into<PathBuf>, max_age: Duration) -> Self {
        TimetableFile {
            path: path.into(),
            max_age,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Time since the export was last written.
    pub fn age(&self) -> TtSyncResult<Duration> {
        let modified = std::fs::metadata(&self.path)?.modified()?;
        Ok(SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO))
    }

    pub fn is_stale(&self) -> TtSyncResult<bool> {
        Ok(self.age()? > self.max_age)
    }

    pub fn load(&self) -> TtSyncResult<TimetableExport> {
        let json = std::fs::read_to_string(&self.path).map_err(|e| {
            TtSyncError::Timetable(format!("cannot read {}: {}", self.path.display(), e))
        })?;
        TimetableExport::from_json(&json)
    }
}

impl TimetableSource for TimetableFile {
    fn local_events(&self) -> TtSyncResult<Vec<EventSeries>> {
        let export = self.load()?;

        if let Ok(age) = self.age() {
            let age = Duration::from_secs(age.as_secs());
            if age > self.max_age {
                tracing::warn!(
                    path = %self.path.display(),
                    age = %humantime::format_duration(age),
                    "timetable export is stale, re-export it to pick up recent changes"
                );
            }
        }

        let series = export.local_events()?;
        tracing::info!(
            path = %self.path.display(),
            cells = export.cells.len(),
            series = series.len(),
            "loaded timetable"
        );
        Ok(series)
    }
}
