use std::collections::HashMap;

use chrono_tz::Tz;

use crate::event::EventSeries;
use crate::remote::RemoteEvent;

/// A remote event that cannot take part in the diff.
#[derive(Debug, Clone)]
pub struct CorruptEvent {
    pub event: RemoteEvent,
    pub reason: String,
}

/// Remote calendar contents in canonical form.
#[derive(Debug, Clone, Default)]
pub struct RemoteSnapshot {
    pub series: Vec<EventSeries>,
    /// Events that failed to decode, or that repeat an identity already seen.
    pub corrupt: Vec<CorruptEvent>,
}

/// Decode listed remote events, setting aside the ones that do not decode.
///
/// The first event listed for an identity is kept; later ones are set aside
/// as duplicates so the diff sees at most one remote series per identity.
pub fn decode_remote(events: impl IntoIterator<Item = RemoteEvent>, tz: Tz) -> RemoteSnapshot {
    let mut snapshot = RemoteSnapshot::default();
    let mut seen = HashMap::new();

    for event in events {
        let series = match EventSeries::from_view(&event, tz) {
            Ok(series) => series,
            Err(e) => {
                tracing::warn!(
                    remote_id = event.id.as_deref().unwrap_or("-"),
                    summary = %event.summary,
                    error = %e,
                    "remote event could not be decoded"
                );
                snapshot.corrupt.push(CorruptEvent {
                    reason: e.to_string(),
                    event,
                });
                continue;
            }
        };

        let group = series.group();
        if let Some(first_id) = seen.get(&group) {
            let reason = format!("duplicate of {}", first_id);
            tracing::warn!(
                remote_id = event.id.as_deref().unwrap_or("-"),
                summary = %event.summary,
                "{}",
                reason
            );
            snapshot.corrupt.push(CorruptEvent { event, reason });
            continue;
        }

        seen.insert(group, event.id.clone().unwrap_or_else(|| "-".into()));
        snapshot.series.push(series);
    }

    snapshot
}
