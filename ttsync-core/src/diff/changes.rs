use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::diff::SeriesDiff;
use crate::error::{TtSyncError, TtSyncResult};
use crate::event::{EventSeries, GroupId};

#[derive(Default)]
struct Pair {
    remote: Option<EventSeries>,
    local: Option<EventSeries>,
}

#[derive(Clone, Copy)]
enum Side {
    Remote,
    Local,
}

impl Pair {
    fn slot(&mut self, side: Side) -> &mut Option<EventSeries> {
        match side {
            Side::Remote => &mut self.remote,
            Side::Local => &mut self.local,
        }
    }

    fn into_diff(self) -> Option<SeriesDiff> {
        match (self.remote, self.local) {
            (Some(remote), Some(local)) => {
                if remote.is_unchanged(&local) {
                    None
                } else {
                    Some(SeriesDiff::Update {
                        from: remote,
                        to: local,
                    })
                }
            }
            (Some(remote), None) => Some(SeriesDiff::Delete(remote)),
            (None, Some(local)) => Some(SeriesDiff::Create(local)),
            (None, None) => None,
        }
    }
}

/// Changes that make `remote` match `local`.
///
/// Each side must hold at most one series per [`GroupId`]; a duplicate is
/// reported before any change is produced. Changes are yielded lazily and in
/// no particular order.
pub fn changes(
    remote: impl IntoIterator<Item = EventSeries>,
    local: impl IntoIterator<Item = EventSeries>,
) -> TtSyncResult<impl Iterator<Item = SeriesDiff>> {
    let mut table: HashMap<GroupId, Pair> = HashMap::new();

    let tagged = remote
        .into_iter()
        .map(|s| (Side::Remote, s))
        .chain(local.into_iter().map(|s| (Side::Local, s)));

    for (side, series) in tagged {
        let slot = match table.entry(series.group()) {
            Entry::Occupied(entry) => entry.into_mut().slot(side),
            Entry::Vacant(entry) => entry.insert(Pair::default()).slot(side),
        };

        if let Some(existing) = slot.as_ref() {
            return Err(TtSyncError::ContractViolation(format!(
                "two {} series share one identity: '{}' and '{}'",
                match side {
                    Side::Remote => "remote",
                    Side::Local => "local",
                },
                existing,
                series
            )));
        }
        *slot = Some(series);
    }

    Ok(table.into_values().filter_map(Pair::into_diff))
}

/// Changes that delete every remote series and recreate every local one.
pub fn replace_all(
    remote: impl IntoIterator<Item = EventSeries>,
    local: impl IntoIterator<Item = EventSeries>,
) -> impl Iterator<Item = SeriesDiff> {
    remote
        .into_iter()
        .map(SeriesDiff::Delete)
        .chain(local.into_iter().map(SeriesDiff::Create))
}
