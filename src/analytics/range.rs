//! Date-range resolution
//!
//! Turns a range token (`7`, `30`, `90`, `365`, `all`) or an explicit
//! start/end pair into a closed calendar interval.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::error::{AppError, AppResult, Validator};

pub const DEFAULT_RANGE_TOKEN: &str = "30";

/// A closed interval of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The `days` days before `today`, plus today
    pub fn trailing(days: i64, today: NaiveDate) -> Self {
        Self {
            start: today - Duration::days(days),
            end: today,
        }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Number of calendar days covered, both ends included
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Symbolic range selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeToken {
    Days(i64),
    All,
}

impl RangeToken {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "7" => Some(RangeToken::Days(7)),
            "30" => Some(RangeToken::Days(30)),
            "90" => Some(RangeToken::Days(90)),
            "365" => Some(RangeToken::Days(365)),
            "all" => Some(RangeToken::All),
            _ => None,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, RangeToken::All)
    }

    pub fn to_range(self, today: NaiveDate) -> DateRange {
        match self {
            RangeToken::Days(n) => DateRange::trailing(n, today),
            RangeToken::All => DateRange::new(epoch(), today),
        }
    }
}

/// Query parameters that select a range
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeQuery<'a> {
    pub range: Option<&'a str>,
    pub start_date: Option<&'a str>,
    pub end_date: Option<&'a str>,
}

impl<'a> RangeQuery<'a> {
    pub fn token(range: &'a str) -> Self {
        Self {
            range: Some(range),
            ..Self::default()
        }
    }

    pub fn between(start_date: &'a str, end_date: &'a str) -> Self {
        Self {
            range: None,
            start_date: Some(start_date),
            end_date: Some(end_date),
        }
    }

    /// True when the resolved range will be the unbounded `all` token
    pub fn is_all(&self) -> bool {
        self.explicit().is_none()
            && self
                .range
                .and_then(RangeToken::from_str)
                .is_some_and(|t| t.is_all())
    }

    fn explicit(&self) -> Option<(&'a str, &'a str)> {
        match (self.start_date, self.end_date) {
            (Some(s), Some(e)) if !s.trim().is_empty() && !e.trim().is_empty() => Some((s, e)),
            _ => None,
        }
    }
}

pub fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Parse `YYYY-MM-DD`, or the date part of an RFC 3339 timestamp
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    let parsed = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()?;
    // Anything after the date must be a time component
    match trimmed.as_bytes().get(10) {
        None | Some(b'T') | Some(b' ') => Some(parsed),
        Some(_) => None,
    }
}

/// Resolve a range query relative to `today`
pub fn resolve(query: &RangeQuery<'_>, today: NaiveDate) -> AppResult<DateRange> {
    if let Some((start_raw, end_raw)) = query.explicit() {
        let start = parse_date(start_raw);
        let end = parse_date(end_raw);

        let mut v = Validator::new();
        v.check(start.is_some(), "start_date", "must be a date in YYYY-MM-DD format");
        v.check(end.is_some(), "end_date", "must be a date in YYYY-MM-DD format");
        v.finish()?;

        return match (start, end) {
            (Some(start), Some(end)) if start <= end => Ok(DateRange::new(start, end)),
            (Some(_), Some(_)) => Err(AppError::invalid("end_date", "must not be before start_date")),
            _ => Err(AppError::invalid("start_date", "must be a date in YYYY-MM-DD format")),
        };
    }

    let raw = query.range.unwrap_or(DEFAULT_RANGE_TOKEN);
    let token = RangeToken::from_str(raw)
        .ok_or_else(|| AppError::invalid("range", "must be one of 7, 30, 90, 365, all"))?;
    Ok(token.to_range(today))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_token_resolution() {
        let today = day("2025-03-31");
        let range = resolve(&RangeQuery::token("7"), today).unwrap();
        assert_eq!(range, DateRange::new(day("2025-03-24"), today));
        assert_eq!(range.days(), 8);

        let all = resolve(&RangeQuery::token("ALL"), today).unwrap();
        assert_eq!(all.start, day("1970-01-01"));
        assert!(RangeQuery::token("all").is_all());
    }

    #[test]
    fn test_default_token_is_thirty_days() {
        let today = day("2025-03-31");
        let range = resolve(&RangeQuery::default(), today).unwrap();
        assert_eq!(range.start, day("2025-03-01"));
    }

    #[test]
    fn test_explicit_dates_take_precedence() {
        let today = day("2025-03-31");
        let query = RangeQuery {
            range: Some("7"),
            start_date: Some("2025-01-01"),
            end_date: Some("2025-01-31T10:00:00Z"),
        };
        let range = resolve(&query, today).unwrap();
        assert_eq!(range, DateRange::new(day("2025-01-01"), day("2025-01-31")));
        assert!(range.contains(day("2025-01-31")));
        assert!(!range.contains(day("2025-02-01")));
        assert!(!query.is_all());
    }

    #[test]
    fn test_single_explicit_date_falls_back_to_token() {
        let today = day("2025-03-31");
        let query = RangeQuery {
            range: Some("7"),
            start_date: Some("2025-01-01"),
            end_date: None,
        };
        assert_eq!(resolve(&query, today).unwrap().start, day("2025-03-24"));
    }

    #[test]
    fn test_invalid_inputs_name_the_field() {
        let today = day("2025-03-31");
        match resolve(&RangeQuery::token("14"), today) {
            Err(AppError::Validation(issues)) => assert_eq!(issues[0].field, "range"),
            other => panic!("unexpected: {other:?}"),
        }
        match resolve(&RangeQuery::between("2025-13-01", "2025-01-01"), today) {
            Err(AppError::Validation(issues)) => {
                assert_eq!(issues.len(), 1);
                assert_eq!(issues[0].field, "start_date");
            }
            other => panic!("unexpected: {other:?}"),
        }
        match resolve(&RangeQuery::between("2025-02-01", "2025-01-01"), today) {
            Err(AppError::Validation(issues)) => assert_eq!(issues[0].field, "end_date"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_parse_date_rejects_trailing_garbage() {
        assert_eq!(parse_date("2025-01-05"), Some(day("2025-01-05")));
        assert_eq!(parse_date("2025-01-05 08:00:00"), Some(day("2025-01-05")));
        assert_eq!(parse_date("2025-01-05x"), None);
        assert_eq!(parse_date("yesterday"), None);
    }
}
