//! Calendar keys for grouping
//!
//! Days are plain `NaiveDate`s; weeks are keyed by the Sunday that starts them.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Serialize, Serializer};

/// Number of events on one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayCount {
    pub count: usize,
    pub date: NaiveDate,
}

/// Events per day, in date order
pub fn count_by_day<I>(days: I) -> BTreeMap<NaiveDate, usize>
where
    I: IntoIterator<Item = NaiveDate>,
{
    let mut counts = BTreeMap::new();
    for day in days {
        *counts.entry(day).or_insert(0) += 1;
    }
    counts
}

/// The day with the most events; the earliest such day wins ties
pub fn busiest_day<I>(days: I) -> Option<DayCount>
where
    I: IntoIterator<Item = NaiveDate>,
{
    count_by_day(days)
        .into_iter()
        .fold(None, |best: Option<DayCount>, (date, count)| match best {
            Some(b) if b.count >= count => Some(b),
            _ => Some(DayCount { count, date }),
        })
}

/// A week, identified by its starting Sunday
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekKey(NaiveDate);

impl WeekKey {
    pub fn of(date: NaiveDate) -> Self {
        let offset = date.weekday().num_days_from_sunday() as i64;
        WeekKey(date - Duration::days(offset))
    }

    pub fn start(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl Serialize for WeekKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

/// Every day from `start` to `end`, both inclusive
pub fn days_between(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Sun => "Sunday",
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
    }
}

/// Sunday-first ordering used for weekday distributions
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_week_key_starts_on_sunday() {
        // 2025-03-12 is a Wednesday
        assert_eq!(WeekKey::of(day("2025-03-12")).start(), day("2025-03-09"));
        assert_eq!(WeekKey::of(day("2025-03-09")).start(), day("2025-03-09"));
        assert_eq!(WeekKey::of(day("2025-03-15")).start(), day("2025-03-09"));
        assert_eq!(WeekKey::of(day("2025-03-16")).start(), day("2025-03-16"));
    }

    #[test]
    fn test_week_key_display_and_order() {
        let a = WeekKey::of(day("2025-01-01"));
        let b = WeekKey::of(day("2025-01-08"));
        assert!(a < b);
        assert_eq!(a.to_string(), "2024-12-29");
        assert_eq!(serde_json::to_string(&a).unwrap(), "\"2024-12-29\"");
    }

    #[test]
    fn test_days_between_inclusive() {
        let days: Vec<_> = days_between(day("2025-02-27"), day("2025-03-02")).collect();
        assert_eq!(days.len(), 4);
        assert_eq!(days[0], day("2025-02-27"));
        assert_eq!(days[3], day("2025-03-02"));
        assert_eq!(days_between(day("2025-03-02"), day("2025-03-01")).count(), 0);
    }

    #[test]
    fn test_busiest_day_prefers_earliest_on_tie() {
        let days = vec![
            day("2025-03-05"),
            day("2025-03-02"),
            day("2025-03-05"),
            day("2025-03-02"),
            day("2025-03-03"),
        ];
        assert_eq!(
            busiest_day(days),
            Some(DayCount { count: 2, date: day("2025-03-02") })
        );
        assert_eq!(busiest_day(Vec::new()), None);
    }
}
