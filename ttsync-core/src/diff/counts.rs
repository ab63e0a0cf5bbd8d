use std::fmt;

use crate::diff::{DiffKind, SeriesDiff};

/// Number of changes of each kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffCounts {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
}

impl DiffCounts {
    pub fn add(&mut self, kind: DiffKind) {
        match kind {
            DiffKind::Create => self.created += 1,
            DiffKind::Update => self.updated += 1,
            DiffKind::Delete => self.deleted += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.created + self.updated + self.deleted
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl FromIterator<DiffKind> for DiffCounts {
    fn from_iter<I: IntoIterator<Item = DiffKind>>(iter: I) -> Self {
        let mut counts = DiffCounts::default();
        for kind in iter {
            counts.add(kind);
        }
        counts
    }
}

impl<'a> FromIterator<&'a SeriesDiff> for DiffCounts {
    fn from_iter<I: IntoIterator<Item = &'a SeriesDiff>>(iter: I) -> Self {
        iter.into_iter().map(SeriesDiff::kind).collect()
    }
}

impl fmt::Display for DiffCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} updated, {} deleted",
            self.created, self.updated, self.deleted
        )
    }
}
