//! Teaching weeks: the portal's week labels and the week notation on cells.

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use regex::Regex;

use crate::error::{TtSyncError, TtSyncResult};

static WEEK_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Sem\s*(\d+)\s*-\s*Wk\s*(\d+)\s*\(starting\s*(\d{2}-\w{3}-\d{4})\)")
        .expect("week label pattern is valid")
});

/// A (semester, week) pair as written on timetable cells.
pub type SemesterWeek = (u32, u32);

/// One entry of the portal's week selector, e.g.
/// `Sem 1 - Wk 3 (starting 14-Oct-2024)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekLabel {
    pub semester: u32,
    pub week: u32,
    pub starting: NaiveDate,
}

impl WeekLabel {
    /// `None` for selector entries that are not teaching weeks.
    pub fn parse(label: &str) -> Option<Self> {
        let captures = WEEK_LABEL.captures(label)?;
        Some(WeekLabel {
            semester: captures[1].parse().ok()?,
            week: captures[2].parse().ok()?,
            starting: NaiveDate::parse_from_str(&captures[3], "%d-%b-%Y").ok()?,
        })
    }
}

/// Start dates of every known teaching week.
#[derive(Debug, Clone, Default)]
pub struct WeekCalendar {
    weeks: HashMap<SemesterWeek, NaiveDate>,
}

impl WeekCalendar {
    pub fn from_labels<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let weeks = labels
            .into_iter()
            .filter_map(|label| {
                let parsed = WeekLabel::parse(label);
                if parsed.is_none() {
                    tracing::debug!(label, "ignoring week selector entry");
                }
                parsed
            })
            .map(|label| ((label.semester, label.week), label.starting))
            .collect();

        WeekCalendar { weeks }
    }

    pub fn len(&self) -> usize {
        self.weeks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }

    /// Date of `weekday` in the given teaching week.
    pub fn date(&self, (semester, week): SemesterWeek, weekday: Weekday) -> TtSyncResult<NaiveDate> {
        let starting = self.weeks.get(&(semester, week)).ok_or_else(|| {
            TtSyncError::Timetable(format!("unknown week {} of semester {}", week, semester))
        })?;

        let offset = (7 + weekday.num_days_from_monday() - starting.weekday().num_days_from_monday()) % 7;
        Ok(*starting + Duration::days(i64::from(offset)))
    }

    /// Every date a cell with week notation `notation` falls on.
    pub fn dates(&self, notation: &str, weekday: Weekday) -> TtSyncResult<Vec<NaiveDate>> {
        parse_week_notation(notation)?
            .into_iter()
            .map(|week| self.date(week, weekday))
            .collect()
    }
}

/// Parse notation such as `weeks: Sem 1: 1-5, 7 Sem 2: 2`.
pub fn parse_week_notation(notation: &str) -> TtSyncResult<Vec<SemesterWeek>> {
    let invalid = |reason: &str| {
        TtSyncError::Timetable(format!("invalid week notation '{}': {}", notation, reason))
    };

    let lowered = notation.trim().to_lowercase();
    let body = lowered.strip_prefix("weeks:").unwrap_or(&lowered);

    let mut weeks = Vec::new();
    for block in body.split("sem").map(str::trim).filter(|b| !b.is_empty()) {
        let (semester, list) = block
            .split_once(':')
            .ok_or_else(|| invalid("semester without a week list"))?;
        let semester: u32 = semester
            .trim()
            .parse()
            .map_err(|_| invalid("semester is not a number"))?;

        for item in list.split(',').map(str::trim).filter(|i| !i.is_empty()) {
            match item.split_once('-') {
                Some((from, to)) => {
                    let from = parse_week(from).ok_or_else(|| invalid("bad range start"))?;
                    let to = parse_week(to).ok_or_else(|| invalid("bad range end"))?;
                    if from > to {
                        return Err(invalid("descending range"));
                    }
                    weeks.extend((from..=to).map(|week| (semester, week)));
                }
                None => {
                    let week = parse_week(item).ok_or_else(|| invalid("week is not a number"))?;
                    weeks.push((semester, week));
                }
            }
        }
    }

    if weeks.is_empty() {
        return Err(invalid("no weeks"));
    }

    weeks.sort_unstable();
    weeks.dedup();
    Ok(weeks)
}

fn parse_week(value: &str) -> Option<u32> {
    value.trim().parse().ok()
}
