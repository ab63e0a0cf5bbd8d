//! Remote calendar events and the service that stores them.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::date_range::DateRange;
use crate::error::{TtSyncError, TtSyncResult};
use crate::event::{EncodeContext, EventSeries, EventView};
use crate::recurrence;

/// An instant plus the zone it should be displayed (and recurred) in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireDateTime {
    pub date_time: DateTime<Utc>,
    pub time_zone: Option<String>,
}

impl WireDateTime {
    pub fn from_zoned(value: &DateTime<Tz>) -> Self {
        WireDateTime {
            date_time: value.with_timezone(&Utc),
            time_zone: Some(value.timezone().name().to_string()),
        }
    }

    fn zoned(&self) -> TtSyncResult<DateTime<Tz>> {
        let tzid = self.time_zone.as_deref().ok_or_else(|| {
            TtSyncError::Decode(format!("{} has no time zone", self.date_time))
        })?;
        let tz = recurrence::parse_tz(tzid)?;
        Ok(self.date_time.with_timezone(&tz))
    }
}

/// A calendar event as the remote service stores it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteEvent {
    pub id: Option<String>,
    pub summary: String,
    pub description: String,
    pub location: Option<String>,
    pub start: Option<WireDateTime>,
    pub end: Option<WireDateTime>,
    #[serde(default)]
    pub recurrence: Vec<String>,
}

impl RemoteEvent {
    /// Encode any event view for the wire.
    pub fn from_view(view: &impl EventView) -> TtSyncResult<Self> {
        let start = view.start()?;
        let duration = view.duration()?;
        let dates = view.occurrences()?;

        let encoded = recurrence::encode(start.time(), &dates, start.timezone())?;
        let end = encoded.start + duration;

        Ok(RemoteEvent {
            id: view.id().map(str::to_string),
            summary: view.title(),
            description: view.description(),
            location: view.address(),
            start: Some(WireDateTime::from_zoned(&encoded.start)),
            end: Some(WireDateTime::from_zoned(&end)),
            recurrence: encoded.lines,
        })
    }

    pub fn from_series(series: &EventSeries, context: &EncodeContext) -> TtSyncResult<Self> {
        Self::from_view(&series.view(context))
    }

    fn required_start(&self) -> TtSyncResult<&WireDateTime> {
        self.start.as_ref().ok_or_else(|| {
            TtSyncError::Decode(format!("event '{}' has no start", self.summary))
        })
    }
}

impl EventView for RemoteEvent {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn title(&self) -> String {
        self.summary.clone()
    }

    fn description(&self) -> String {
        self.description.clone()
    }

    fn address(&self) -> Option<String> {
        self.location.clone()
    }

    fn start(&self) -> TtSyncResult<DateTime<Tz>> {
        self.required_start()?.zoned()
    }

    fn duration(&self) -> TtSyncResult<Duration> {
        let start = self.required_start()?.date_time;
        let end = self
            .end
            .as_ref()
            .ok_or_else(|| TtSyncError::Decode(format!("event '{}' has no end", self.summary)))?
            .date_time;

        let duration = end - start;
        if duration < Duration::zero() {
            return Err(TtSyncError::Decode(format!(
                "event '{}' ends before it starts",
                self.summary
            )));
        }
        Ok(duration)
    }

    fn occurrences(&self) -> TtSyncResult<BTreeSet<NaiveDate>> {
        recurrence::decode(&self.start()?, &self.recurrence)
    }
}

/// One page of a listing.
#[derive(Debug, Clone, Default)]
pub struct EventPage {
    pub events: Vec<RemoteEvent>,
    pub next_page_token: Option<String>,
}

/// The remote calendar the timetable is mirrored into.
#[async_trait]
pub trait CalendarService: Send + Sync {
    /// Events overlapping `range`, one page at a time.
    async fn list_events(
        &self,
        range: &DateRange,
        page_token: Option<&str>,
    ) -> TtSyncResult<EventPage>;

    /// Create an event, returning its new id.
    async fn insert(&self, event: &RemoteEvent) -> TtSyncResult<String>;

    async fn update(&self, id: &str, event: &RemoteEvent) -> TtSyncResult<()>;

    async fn delete(&self, id: &str) -> TtSyncResult<()>;
}

/// Follow page tokens until the listing is exhausted.
pub async fn list_all_events(
    service: &dyn CalendarService,
    range: &DateRange,
) -> TtSyncResult<Vec<RemoteEvent>> {
    let mut events = Vec::new();
    let mut token: Option<String> = None;

    loop {
        let page = service.list_events(range, token.as_deref()).await?;
        tracing::debug!(count = page.events.len(), "listed remote events");
        events.extend(page.events);

        match page.next_page_token {
            Some(next) if token.as_deref() == Some(next.as_str()) => {
                return Err(TtSyncError::Remote(format!(
                    "listing returned page token '{}' twice",
                    next
                )));
            }
            Some(next) => token = Some(next),
            None => break,
        }
    }

    Ok(events)
}
