//! Identity-bearing attributes of a recurring timetable event.

use std::collections::BTreeSet;
use std::fmt;

use crate::event::TimeSlot;

/// Separator used for list-valued fields in descriptions.
const LIST_SEPARATOR: &str = ", ";

/// Number of lines in an encoded description.
const DESCRIPTION_FIELDS: usize = 5;

/// Descriptive attributes shared by every occurrence of a series.
///
/// The list-valued fields are always sorted and deduplicated, so two
/// instances built from the same values in any order compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventInstance {
    module_codes: Vec<String>,
    module_name: String,
    rooms: Vec<String>,
    lecturers: Vec<String>,
    content_type: String,
    slot: TimeSlot,
}

/// Key identifying a recurring series across weeks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupId {
    pub slot: TimeSlot,
    pub module_codes: Vec<String>,
    pub rooms: Vec<String>,
    pub lecturers: Vec<String>,
    pub content_type: String,
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{}] @ {}",
            self.module_codes.join("."),
            self.content_type,
            self.rooms.join(LIST_SEPARATOR),
            self.slot
        )
    }
}

impl EventInstance {
    pub fn new<C, R, L>(
        module_codes: C,
        module_name: impl Into<String>,
        rooms: R,
        lecturers: L,
        content_type: impl Into<String>,
        slot: TimeSlot,
    ) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
        L: IntoIterator,
        L::Item: Into<String>,
    {
        EventInstance {
            module_codes: normalize_set(module_codes),
            module_name: module_name.into().trim().to_string(),
            rooms: normalize_set(rooms),
            lecturers: normalize_set(lecturers),
            content_type: content_type.into().trim().to_string(),
            slot,
        }
    }

    pub fn module_codes(&self) -> &[String] {
        &self.module_codes
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn rooms(&self) -> &[String] {
        &self.rooms
    }

    pub fn lecturers(&self) -> &[String] {
        &self.lecturers
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn slot(&self) -> &TimeSlot {
        &self.slot
    }

    pub(crate) fn set_module_name(&mut self, name: &str) {
        self.module_name = name.to_string();
    }

    pub fn group(&self) -> GroupId {
        GroupId {
            slot: self.slot,
            module_codes: self.module_codes.clone(),
            rooms: self.rooms.clone(),
            lecturers: self.lecturers.clone(),
            content_type: self.content_type.clone(),
        }
    }

    /// Calendar title, e.g. `Algorithms - CS101.CS102`.
    pub fn title(&self) -> String {
        format!("{} - {}", self.module_name, self.module_codes.join("."))
    }

    /// Five-line description: codes, name, rooms, lecturers, content type.
    pub fn to_description(&self) -> String {
        [
            self.module_codes.join(LIST_SEPARATOR),
            self.module_name.clone(),
            self.rooms.join(LIST_SEPARATOR),
            self.lecturers.join(LIST_SEPARATOR),
            self.content_type.clone(),
        ]
        .join("\n")
    }

    /// Inverse of [`EventInstance::to_description`].
    ///
    /// Missing trailing lines decode as empty fields so that hand-edited or
    /// older remote events still produce an instance. Leading empty lines
    /// are fields too and are kept.
    pub fn from_description(description: &str, slot: TimeSlot) -> Self {
        let mut lines: Vec<&str> = description.trim_end().split('\n').map(str::trim).collect();
        lines.resize(lines.len().max(DESCRIPTION_FIELDS), "");

        EventInstance::new(
            split_list(lines[0]),
            lines[1],
            split_list(lines[2]),
            split_list(lines[3]),
            lines[4],
            slot,
        )
    }
}

fn split_list(line: &str) -> impl Iterator<Item = &str> {
    line.split(LIST_SEPARATOR)
}

fn normalize_set<I>(values: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    values
        .into_iter()
        .map(Into::into)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveTime, Weekday};
    use pretty_assertions::assert_eq;

    fn monday_nine() -> TimeSlot {
        TimeSlot::new(
            Weekday::Mon,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            Duration::hours(1),
        )
    }

    fn sample() -> EventInstance {
        EventInstance::new(
            ["CS102", "CS101"],
            "Algorithms",
            ["SCH.0.01"],
            ["Dr B", "Dr A"],
            "Lecture",
            monday_nine(),
        )
    }

    fn sample_single() -> EventInstance {
        EventInstance::new(["CS101"], "Algorithms", ["A1"], ["Dr A"], "Lecture", monday_nine())
    }

    #[test]
    fn test_sets_are_sorted_and_deduplicated() {
        let instance = EventInstance::new(
            ["CS102", "CS101", "CS102", " "],
            "Algorithms",
            ["B", "A", "A"],
            Vec::<String>::new(),
            "Lecture",
            monday_nine(),
        );

        assert_eq!(instance.module_codes(), ["CS101", "CS102"]);
        assert_eq!(instance.rooms(), ["A", "B"]);
        assert!(instance.lecturers().is_empty());
    }

    #[test]
    fn test_field_order_does_not_change_group() {
        let a = sample();
        let b = EventInstance::new(
            ["CS101", "CS102"],
            "Algorithms",
            ["SCH.0.01"],
            ["Dr A", "Dr B"],
            "Lecture",
            monday_nine(),
        );

        assert_eq!(a.group(), b.group());
        assert_eq!(a, b);
    }

    #[test]
    fn test_module_name_is_not_part_of_group() {
        let mut other = sample();
        other.set_module_name("Algorithms and Data Structures");

        assert_eq!(sample().group(), other.group());
        assert_ne!(sample(), other);
    }

    #[test]
    fn test_description_layout() {
        assert_eq!(
            sample().to_description(),
            "CS101, CS102\nAlgorithms\nSCH.0.01\nDr A, Dr B\nLecture"
        );
    }

    #[test]
    fn test_description_roundtrip() {
        let instance = sample();
        let decoded = EventInstance::from_description(&instance.to_description(), monday_nine());

        assert_eq!(decoded, instance);
    }

    #[test]
    fn test_short_description_pads_missing_fields() {
        let decoded = EventInstance::from_description("CS101\nAlgorithms", monday_nine());

        assert_eq!(decoded.module_codes(), ["CS101"]);
        assert_eq!(decoded.module_name(), "Algorithms");
        assert!(decoded.rooms().is_empty());
        assert!(decoded.lecturers().is_empty());
        assert_eq!(decoded.content_type(), "");
    }

    #[test]
    fn test_description_roundtrip_with_empty_fields() {
        let no_code = EventInstance::new(
            Vec::<String>::new(),
            "Careers Fair",
            ["A1"],
            ["Dr A"],
            "Drop In",
            monday_nine(),
        );
        let only_code = EventInstance::new(
            ["CS101"],
            "",
            Vec::<String>::new(),
            Vec::<String>::new(),
            "",
            monday_nine(),
        );

        for instance in [no_code, only_code] {
            let decoded =
                EventInstance::from_description(&instance.to_description(), monday_nine());

            assert_eq!(decoded.group(), instance.group());
            assert_eq!(decoded, instance);
        }
    }

    #[test]
    fn test_crlf_description_decodes() {
        let decoded = EventInstance::from_description(
            "CS101\r\nAlgorithms\r\nA1\r\nDr A\r\nLecture\r\n",
            monday_nine(),
        );

        assert_eq!(decoded, sample_single());
    }

    #[test]
    fn test_empty_description_decodes_to_empty_instance() {
        let decoded = EventInstance::from_description("", monday_nine());

        assert!(decoded.module_codes().is_empty());
        assert_eq!(decoded.module_name(), "");
    }

    #[test]
    fn test_title_joins_codes_with_dots() {
        assert_eq!(sample().title(), "Algorithms - CS101.CS102");
    }
}
