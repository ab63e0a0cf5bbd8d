//! Date range for listing remote events.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

use crate::event::EventSeries;

/// Inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        if from <= to {
            DateRange { from, to }
        } else {
            DateRange { from: to, to: from }
        }
    }

    /// Smallest range covering every date of `series`, or `None` when no
    /// series has a date.
    pub fn span_of<'a>(series: impl IntoIterator<Item = &'a EventSeries>) -> Option<Self> {
        series
            .into_iter()
            .filter_map(|s| Some((s.first_date()?, s.last_date()?)))
            .reduce(|(from, to), (first, last)| (from.min(first), to.max(last)))
            .map(|(from, to)| DateRange { from, to })
    }

    /// Widen the range by `days` on each side.
    pub fn padded(&self, days: u32) -> Self {
        let days = Duration::days(i64::from(days));
        DateRange {
            from: self.from - days,
            to: self.to + days,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    /// Start of the first day, in UTC.
    pub fn start(&self) -> DateTime<Utc> {
        self.from.and_time(NaiveTime::MIN).and_utc()
    }

    /// Start of the day after the last day, in UTC.
    pub fn end(&self) -> DateTime<Utc> {
        (self.to + Duration::days(1)).and_time(NaiveTime::MIN).and_utc()
    }

    pub fn from_rfc3339(&self) -> String {
        self.start().to_rfc3339()
    }

    pub fn to_rfc3339(&self) -> String {
        self.end().to_rfc3339()
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.from, self.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventInstance, TimeSlot};
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series(dates: &[NaiveDate]) -> EventSeries {
        let slot = TimeSlot::new(
            Weekday::Mon,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            Duration::hours(1),
        );
        let instance = EventInstance::new(["CS101"], "Algorithms", ["A1"], ["Dr A"], "Lecture", slot);
        EventSeries::new(instance, dates.iter().copied())
    }

    #[test]
    fn test_span_covers_all_series() {
        let all = [
            series(&[date(2024, 1, 15), date(2024, 2, 5)]),
            series(&[]),
            series(&[date(2024, 1, 8)]),
        ];

        let range = DateRange::span_of(&all).expect("Should have a span");

        assert_eq!(range, DateRange::new(date(2024, 1, 8), date(2024, 2, 5)));
    }

    #[test]
    fn test_span_of_nothing_is_none() {
        assert_eq!(DateRange::span_of(&[series(&[])]), None);
    }

    #[test]
    fn test_padding_and_bounds() {
        let range = DateRange::new(date(2024, 1, 8), date(2024, 1, 10)).padded(7);

        assert!(range.contains(date(2024, 1, 1)));
        assert!(range.contains(date(2024, 1, 17)));
        assert!(!range.contains(date(2024, 1, 18)));
        assert_eq!(range.from_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert_eq!(range.to_rfc3339(), "2024-01-18T00:00:00+00:00");
    }
}
