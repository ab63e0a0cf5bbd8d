//! Conversion between Google API events and ttsync wire events.

use google_calendar::types::{Event as GoogleEvent, EventDateTime};
use ttsync_core::remote::{RemoteEvent, WireDateTime};

/// Convert from Google API types to ttsync types
pub trait FromGoogle<T> {
    fn from_google(value: T) -> Self;
}

/// Convert to Google API types from ttsync types
pub trait ToGoogle<T> {
    fn to_google(&self) -> T;
}

impl ToGoogle<GoogleEvent> for RemoteEvent {
    fn to_google(&self) -> GoogleEvent {
        GoogleEvent {
            id: self.id.clone().unwrap_or_default(),
            summary: self.summary.clone(),
            description: self.description.clone(),
            location: self.location.clone().unwrap_or_default(),
            start: self.start.as_ref().map(|s| s.to_google()),
            end: self.end.as_ref().map(|e| e.to_google()),
            recurrence: self.recurrence.clone(),
            ..Default::default()
        }
    }
}

impl ToGoogle<EventDateTime> for WireDateTime {
    fn to_google(&self) -> EventDateTime {
        EventDateTime {
            date: None,
            date_time: Some(self.date_time),
            time_zone: self.time_zone.clone().unwrap_or_default(),
        }
    }
}

impl FromGoogle<GoogleEvent> for RemoteEvent {
    /// Missing or all-day times come through as `None` and fail to decode
    /// later, which marks the event as corrupt.
    fn from_google(event: GoogleEvent) -> Self {
        RemoteEvent {
            id: non_empty(event.id),
            summary: event.summary,
            description: event.description,
            location: non_empty(event.location),
            start: event.start.and_then(wire_time),
            end: event.end.and_then(wire_time),
            recurrence: event.recurrence,
        }
    }
}

/// Only timed values carry over; all-day dates have no instant.
fn wire_time(value: EventDateTime) -> Option<WireDateTime> {
    Some(WireDateTime {
        date_time: value.date_time?,
        time_zone: non_empty(value.time_zone),
    })
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn remote() -> RemoteEvent {
        let start = Utc.with_ymd_and_hms(2024, 1, 8, 9, 0, 0).unwrap();
        RemoteEvent {
            id: Some("evt-1".into()),
            summary: "Algorithms - CS101".into(),
            description: "CS101\nAlgorithms\nA1\nDr A\nLecture".into(),
            location: Some("A1".into()),
            start: Some(WireDateTime {
                date_time: start,
                time_zone: Some("Europe/London".into()),
            }),
            end: Some(WireDateTime {
                date_time: start + chrono::Duration::hours(1),
                time_zone: Some("Europe/London".into()),
            }),
            recurrence: vec!["RDATE;TZID=Europe/London:20240115T090000".into()],
        }
    }

    #[test]
    fn test_google_conversion_keeps_every_field() {
        let event = remote();

        let back = RemoteEvent::from_google(event.to_google());

        assert_eq!(back, event);
    }

    #[test]
    fn test_all_day_events_have_no_start() {
        let google = GoogleEvent {
            id: "evt-2".into(),
            start: Some(EventDateTime {
                date: chrono::NaiveDate::from_ymd_opt(2024, 1, 8),
                date_time: None,
                time_zone: String::new(),
            }),
            ..Default::default()
        };

        let event = RemoteEvent::from_google(google);

        assert_eq!(event.id.as_deref(), Some("evt-2"));
        assert_eq!(event.start, None);
        assert_eq!(event.location, None);
    }
}
