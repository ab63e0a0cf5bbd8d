//! Recurrence encoding for calendar series.
//!
//! A series is written as an anchor occurrence (the first date at the slot's
//! start time) plus one explicit `RDATE` line listing every other
//! occurrence. Explicit dates survive irregular terms (reading weeks, bank
//! holidays) without any rule arithmetic.
//!
//! Decoding accepts `RDATE` and `EXDATE` lines, and bounded weekly `RRULE`s
//! as written by older versions of the sync. Anything else is a decode error:
//! silently dropping a line would shrink the series and trigger a
//! destructive update.

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use rrule::{Frequency, NWeekday, RRule, RRuleSet};

use crate::error::{TtSyncError, TtSyncResult};

const DATETIME_FORMAT: &str = "%Y%m%dT%H%M%S";

const SUPPORTED_LINES: [&str; 3] = ["RDATE", "EXDATE", "RRULE"];

/// Upper bound on occurrences produced by expanding a recurrence.
const MAX_RULE_OCCURRENCES: u16 = 1000;

/// Wire form of a series' schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedRecurrence {
    /// First occurrence.
    pub start: DateTime<Tz>,
    /// Recurrence lines (empty for a single occurrence).
    pub lines: Vec<String>,
}

/// Combine a date and a wall-clock time in `tz`.
///
/// Ambiguous times (clocks going back) resolve to the earlier instant; times
/// that do not exist (clocks going forward) are an error.
pub fn localize(tz: Tz, date: NaiveDate, time: NaiveTime) -> TtSyncResult<DateTime<Tz>> {
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .ok_or_else(|| {
            TtSyncError::Encode(format!("{} {} does not exist in {}", date, time, tz.name()))
        })
}

/// Encode `dates` at `start_time` in `tz`.
pub fn encode(
    start_time: NaiveTime,
    dates: &BTreeSet<NaiveDate>,
    tz: Tz,
) -> TtSyncResult<EncodedRecurrence> {
    let mut dates = dates.iter();
    let first = dates
        .next()
        .ok_or_else(|| TtSyncError::Encode("cannot encode a series with no dates".into()))?;
    let start = localize(tz, *first, start_time)?;

    let rest: Vec<String> = dates
        .map(|date| date.and_time(start_time).format(DATETIME_FORMAT).to_string())
        .collect();

    let lines = if rest.is_empty() {
        Vec::new()
    } else {
        vec![format!("RDATE;TZID={}:{}", tz.name(), rest.join(","))]
    };

    Ok(EncodedRecurrence { start, lines })
}

/// Decode the full date set of an event starting at `anchor`.
///
/// Dates are expressed in the anchor's zone. The anchor itself counts as an
/// occurrence unless an `EXDATE` removes it.
pub fn decode(anchor: &DateTime<Tz>, lines: &[String]) -> TtSyncResult<BTreeSet<NaiveDate>> {
    let tz = anchor.timezone();
    if lines.is_empty() {
        return Ok(BTreeSet::from([anchor.date_naive()]));
    }

    for line in lines {
        check_line_type(line)?;
    }

    let rrule_set: RRuleSet = build_rrule_string(anchor, lines)
        .parse()
        .map_err(|e| TtSyncError::Decode(format!("invalid recurrence: {}", e)))?;

    for rule in rrule_set.get_rrule() {
        check_weekly_rule(rule, anchor)?;
    }

    let excluded: BTreeSet<NaiveDate> = rrule_set
        .get_exdate()
        .iter()
        .map(|d| d.with_timezone(&tz).date_naive())
        .collect();

    let result = rrule_set.all(MAX_RULE_OCCURRENCES);
    if result.limited {
        return Err(TtSyncError::Decode(format!(
            "recurrence expands past {} occurrences",
            MAX_RULE_OCCURRENCES
        )));
    }

    let mut dates: BTreeSet<NaiveDate> = result
        .dates
        .iter()
        .map(|d| d.with_timezone(&tz).date_naive())
        .collect();
    dates.insert(anchor.date_naive());
    dates.retain(|date| !excluded.contains(date));

    if dates.is_empty() {
        return Err(TtSyncError::Decode(
            "recurrence excludes every occurrence".into(),
        ));
    }

    Ok(dates)
}

/// Text for the rrule parser: a `DTSTART` built from the anchor, then the
/// event's own lines.
fn build_rrule_string(anchor: &DateTime<Tz>, lines: &[String]) -> String {
    let mut text = vec![format!(
        "DTSTART;TZID={}:{}",
        anchor.timezone().name(),
        anchor.naive_local().format(DATETIME_FORMAT)
    )];
    text.extend(lines.iter().map(|line| line.trim().to_string()));
    text.join("\n")
}

/// Only `RDATE`, `EXDATE` and `RRULE` lines are understood.
fn check_line_type(line: &str) -> TtSyncResult<()> {
    let name = line
        .trim()
        .split([';', ':'])
        .next()
        .unwrap_or_default()
        .to_uppercase();

    if SUPPORTED_LINES.contains(&name.as_str()) {
        Ok(())
    } else {
        Err(TtSyncError::Decode(format!(
            "unsupported recurrence line '{}'",
            line
        )))
    }
}

/// Older versions wrote bounded weekly rules on the slot's weekday.
fn check_weekly_rule(rule: &RRule, anchor: &DateTime<Tz>) -> TtSyncResult<()> {
    if rule.get_freq() != Frequency::Weekly {
        return Err(TtSyncError::Decode(format!(
            "unsupported RRULE frequency {:?}",
            rule.get_freq()
        )));
    }

    if rule.get_count().is_none() && rule.get_until().is_none() {
        return Err(TtSyncError::Decode("unbounded RRULE".into()));
    }

    let weekday = anchor.weekday();
    let off_slot = rule
        .get_by_weekday()
        .iter()
        .any(|day| *day != NWeekday::Every(weekday));
    if off_slot {
        return Err(TtSyncError::Decode(format!(
            "RRULE runs on days other than {}",
            weekday
        )));
    }

    Ok(())
}

pub(crate) fn parse_tz(tzid: &str) -> TtSyncResult<Tz> {
    tzid.parse::<Tz>()
        .map_err(|_| TtSyncError::Decode(format!("unknown time zone '{}'", tzid)))
}
