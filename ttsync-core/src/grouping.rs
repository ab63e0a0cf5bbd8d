//! Grouping per-date observations into recurring series.

use std::collections::{BTreeSet, HashMap};

use chrono::{Datelike, NaiveDate};

use crate::event::{EventInstance, EventSeries, GroupId};

/// One timetable entry observed on one date.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub instance: EventInstance,
    pub date: NaiveDate,
}

impl Fragment {
    pub fn new(instance: EventInstance, date: NaiveDate) -> Self {
        Fragment { instance, date }
    }
}

/// Collapse fragments into one series per [`GroupId`].
///
/// Output is ordered by first date, then start time, so repeated runs over
/// the same input produce the same sequence.
pub fn group_fragments(fragments: impl IntoIterator<Item = Fragment>) -> Vec<EventSeries> {
    let mut groups = Groups::default();

    for fragment in fragments {
        let slot = fragment.instance.slot();
        if fragment.date.weekday() != slot.weekday {
            tracing::warn!(
                date = %fragment.date,
                slot = %slot,
                "timetable entry falls on a different weekday than its slot"
            );
        }
        groups.add(fragment.instance, [fragment.date]);
    }

    groups.into_series()
}

/// Merge series sharing a [`GroupId`] by unioning their dates.
///
/// Remote ids are dropped: the result is a fresh local view.
pub fn regroup(series: impl IntoIterator<Item = EventSeries>) -> Vec<EventSeries> {
    let mut groups = Groups::default();

    for s in series {
        groups.add(s.instance, s.dates);
    }

    groups.into_series()
}

#[derive(Default)]
struct Groups {
    order: Vec<GroupId>,
    by_group: HashMap<GroupId, (EventInstance, BTreeSet<NaiveDate>)>,
}

impl Groups {
    fn add(&mut self, instance: EventInstance, dates: impl IntoIterator<Item = NaiveDate>) {
        let group = instance.group();

        match self.by_group.get_mut(&group) {
            Some((existing, existing_dates)) => {
                reconcile_module_name(existing, &instance);
                existing_dates.extend(dates);
            }
            None => {
                self.order.push(group.clone());
                self.by_group
                    .insert(group, (instance, dates.into_iter().collect()));
            }
        }
    }

    fn into_series(mut self) -> Vec<EventSeries> {
        let mut series: Vec<EventSeries> = self
            .order
            .iter()
            .filter_map(|group| self.by_group.remove(group))
            .map(|(instance, dates)| EventSeries::new(instance, dates))
            .collect();

        series.sort_by(|a, b| {
            a.first_date()
                .cmp(&b.first_date())
                .then_with(|| a.instance.slot().start.cmp(&b.instance.slot().start))
                .then_with(|| a.title().cmp(&b.title()))
        });
        series
    }
}

/// Keep the longest module name seen for a group.
///
/// The timetable portal truncates long names in some views, so a shorter
/// name that prefixes the longer one is expected. Any other disagreement is
/// reported.
fn reconcile_module_name(existing: &mut EventInstance, other: &EventInstance) {
    let current = existing.module_name();
    let candidate = other.module_name();
    if current == candidate {
        return;
    }

    let (longer, shorter) = if candidate.len() > current.len() {
        (candidate, current)
    } else {
        (current, candidate)
    };

    if !longer.starts_with(shorter.trim_end_matches("...")) {
        tracing::warn!(
            group = %existing.group(),
            kept = longer,
            dropped = shorter,
            "conflicting module names for one timetable entry"
        );
    }

    if longer != current {
        let longer = longer.to_string();
        existing.set_module_name(&longer);
    }
}
