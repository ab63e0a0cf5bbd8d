use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use chrono_tz::Tz;

use crate::error::TtSyncResult;
use crate::event::{EventInstance, EventView, GroupId, TimeSlot};

/// A canonical recurring event: shared attributes plus every date it occurs on.
///
/// `dates` is a set, so it stays sorted and free of duplicates no matter how
/// it is built. A series with no dates is dead and must only ever be deleted
/// remotely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSeries {
    /// Identifier assigned by the remote calendar, `None` until created there.
    pub remote_id: Option<String>,
    pub instance: EventInstance,
    pub dates: BTreeSet<NaiveDate>,
}

impl EventSeries {
    pub fn new(instance: EventInstance, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        EventSeries {
            remote_id: None,
            instance,
            dates: dates.into_iter().collect(),
        }
    }

    pub fn with_remote_id(mut self, remote_id: impl Into<String>) -> Self {
        self.remote_id = Some(remote_id.into());
        self
    }

    pub fn group(&self) -> GroupId {
        self.instance.group()
    }

    pub fn title(&self) -> String {
        self.instance.title()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn is_dead(&self) -> bool {
        self.dates.is_empty()
    }

    /// True when nothing would change by replacing `self` with `other`.
    /// The remote id is not compared.
    pub fn is_unchanged(&self, other: &EventSeries) -> bool {
        self.instance == other.instance && self.dates == other.dates
    }

    /// Build the canonical form of any event view, expressed in `tz`.
    pub fn from_view(view: &impl EventView, tz: Tz) -> TtSyncResult<Self> {
        let start = view.start()?.with_timezone(&tz);
        let duration = view.duration()?;
        let dates = view.occurrences()?;

        let slot = TimeSlot::new(start.weekday(), start.time(), duration);
        let instance = EventInstance::from_description(&view.description(), slot);

        Ok(EventSeries {
            remote_id: view.id().map(str::to_string),
            instance,
            dates,
        })
    }
}

impl fmt::Display for EventSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title(), self.instance.slot())?;
        match (self.first_date(), self.last_date()) {
            (Some(first), Some(last)) if first != last => write!(
                f,
                " {} dates, {} to {}",
                self.dates.len(),
                first,
                last
            ),
            (Some(only), _) => write!(f, " on {}", only),
            _ => write!(f, " with no dates"),
        }
    }
}
