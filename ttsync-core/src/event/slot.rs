use std::fmt;

use chrono::{Duration, NaiveTime, Weekday};

/// A recurring position within the week.
///
/// Two events in the same slot but in different weeks belong to the same
/// series. Equality is exact on every field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeSlot {
    pub weekday: Weekday,
    pub start: NaiveTime,
    pub duration: Duration,
}

impl TimeSlot {
    pub fn new(weekday: Weekday, start: NaiveTime, duration: Duration) -> Self {
        TimeSlot {
            weekday,
            start,
            duration,
        }
    }

    /// Wall-clock end time. Wraps past midnight.
    pub fn end(&self) -> NaiveTime {
        self.start + self.duration
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}-{}",
            self.weekday,
            self.start.format("%H:%M"),
            self.end().format("%H:%M")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_display_shows_weekday_and_span() {
        let slot = TimeSlot::new(
            Weekday::Tue,
            NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            Duration::minutes(90),
        );

        assert_eq!(slot.to_string(), "Tue 14:00-15:30");
    }

    #[test]
    fn test_slots_differing_only_in_duration_are_distinct() {
        let start = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let hour = TimeSlot::new(Weekday::Mon, start, Duration::hours(1));
        let two_hours = TimeSlot::new(Weekday::Mon, start, Duration::hours(2));

        assert_ne!(hour, two_hours);
    }
}
