use std::fmt;

use crate::diff::DiffKind;
use crate::event::EventSeries;

/// One change needed to bring the remote calendar in line with the timetable.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesDiff {
    Create(EventSeries),
    Delete(EventSeries),
    /// `from` is the remote series (holding the remote id), `to` the local
    /// replacement.
    Update { from: EventSeries, to: EventSeries },
}

impl SeriesDiff {
    pub fn kind(&self) -> DiffKind {
        match self {
            SeriesDiff::Create(_) => DiffKind::Create,
            SeriesDiff::Update { .. } => DiffKind::Update,
            SeriesDiff::Delete(_) => DiffKind::Delete,
        }
    }

    /// The series the change is about (the replacement for updates).
    pub fn series(&self) -> &EventSeries {
        match self {
            SeriesDiff::Create(series) | SeriesDiff::Delete(series) => series,
            SeriesDiff::Update { to, .. } => to,
        }
    }

    /// Remote id the change targets, if any.
    pub fn remote_id(&self) -> Option<&str> {
        match self {
            SeriesDiff::Create(_) => None,
            SeriesDiff::Delete(series) => series.remote_id.as_deref(),
            SeriesDiff::Update { from, .. } => from.remote_id.as_deref(),
        }
    }
}

impl fmt::Display for SeriesDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.series())
    }
}
