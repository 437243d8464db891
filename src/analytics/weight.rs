//! Weight analytics

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;

use super::range::{self, DateRange, RangeQuery};
use super::stats::{self, round2, Trend};
use crate::error::AppResult;
use crate::models::WeightEntry;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightSummary {
    pub count: usize,
    pub average: f64,
    pub net_change: f64,
    pub trend: Trend,
    pub std_dev: f64,
    /// Date of the first entry in range
    pub start_date: Option<NaiveDate>,
    /// Date of the last entry in range
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightPoint {
    pub date: NaiveDate,
    pub weight: f64,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DatedValue {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
    /// Fitted value one entry past the end of the series
    pub projected_next: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightRecords {
    pub heaviest: Option<DatedValue>,
    pub lightest: Option<DatedValue>,
    pub biggest_gain: f64,
    pub biggest_loss: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightAnalytics {
    pub range: DateRange,
    pub summary: WeightSummary,
    pub series: Vec<WeightPoint>,
    pub moving_average_7: Vec<DatedValue>,
    pub moving_average_30: Vec<DatedValue>,
    pub trend_line: TrendLine,
    pub records: WeightRecords,
}

/// Fetch the user's weights for the requested range and summarize them
pub fn weight_analytics(
    conn: &Connection,
    user_id: i64,
    query: &RangeQuery<'_>,
    today: NaiveDate,
) -> AppResult<WeightAnalytics> {
    let range = range::resolve(query, today)?;
    let entries = WeightEntry::list_in_range(conn, user_id, &range)?;
    tracing::debug!(user_id, count = entries.len(), "weight analytics");
    Ok(summarize(range, entries))
}

/// Moving averages labelled with the date of each window's last entry
fn labelled_moving_average(dates: &[NaiveDate], weights: &[f64], window: usize) -> Vec<DatedValue> {
    stats::moving_average(weights, window)
        .into_iter()
        .enumerate()
        .map(|(i, value)| DatedValue {
            date: dates[i + window - 1],
            value: round2(value),
        })
        .collect()
}

/// Earliest entry whose weight equals `target`
fn extreme(entries: &[WeightEntry], target: f64) -> Option<DatedValue> {
    entries
        .iter()
        .find(|e| e.weight == target)
        .map(|e| DatedValue {
            date: e.date,
            value: round2(e.weight),
        })
}

pub fn summarize(range: DateRange, mut entries: Vec<WeightEntry>) -> WeightAnalytics {
    entries.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));

    let weights: Vec<f64> = entries.iter().map(|e| e.weight).collect();
    let dates: Vec<NaiveDate> = entries.iter().map(|e| e.date).collect();

    let net_change = match (weights.first(), weights.last()) {
        (Some(first), Some(last)) => last - first,
        _ => 0.0,
    };

    let regression = stats::linear_regression(&weights);
    let records = stats::series_records(&weights);
    let has_entries = !entries.is_empty();

    WeightAnalytics {
        range,
        summary: WeightSummary {
            count: entries.len(),
            average: round2(stats::mean(&weights)),
            net_change: round2(net_change),
            trend: stats::series_trend(&weights),
            std_dev: round2(stats::std_dev(&weights)),
            start_date: dates.first().copied(),
            end_date: dates.last().copied(),
        },
        moving_average_7: labelled_moving_average(&dates, &weights, 7),
        moving_average_30: labelled_moving_average(&dates, &weights, 30),
        trend_line: TrendLine {
            slope: round2(regression.slope),
            intercept: round2(regression.intercept),
            projected_next: if has_entries {
                round2(regression.predict(weights.len() as f64))
            } else {
                0.0
            },
        },
        records: WeightRecords {
            heaviest: extreme(&entries, records.max),
            lightest: extreme(&entries, records.min),
            biggest_gain: round2(records.biggest_gain),
            biggest_loss: round2(records.biggest_loss),
        },
        series: entries
            .into_iter()
            .map(|e| WeightPoint {
                date: e.date,
                weight: e.weight,
                note: e.note,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn entry(id: i64, date: NaiveDate, weight: f64) -> WeightEntry {
        WeightEntry {
            id,
            user_id: 1,
            date,
            weight,
            note: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn range() -> DateRange {
        DateRange::new(day("2025-03-01"), day("2025-03-31"))
    }

    #[test]
    fn test_empty_range_has_zero_shape() {
        let result = summarize(range(), Vec::new());
        assert_eq!(result.summary.count, 0);
        assert_eq!(result.summary.average, 0.0);
        assert_eq!(result.summary.trend, Trend::Stable);
        assert_eq!(result.summary.start_date, None);
        assert!(result.series.is_empty());
        assert!(result.moving_average_7.is_empty());
        assert_eq!(result.trend_line.projected_next, 0.0);
        assert_eq!(result.records.heaviest, None);
    }

    #[test]
    fn test_records_follow_chronological_order() {
        // Fetched out of order on purpose
        let entries = vec![
            entry(4, day("2025-03-04"), 155.0),
            entry(1, day("2025-03-01"), 150.0),
            entry(3, day("2025-03-03"), 149.0),
            entry(2, day("2025-03-02"), 152.0),
        ];
        let result = summarize(range(), entries);

        assert_eq!(result.summary.count, 4);
        assert_eq!(result.summary.net_change, 5.0);
        assert_eq!(result.summary.trend, Trend::Increasing);
        assert_eq!(result.summary.start_date, Some(day("2025-03-01")));
        assert_eq!(result.summary.end_date, Some(day("2025-03-04")));
        assert_eq!(
            result.records.heaviest,
            Some(DatedValue { date: day("2025-03-04"), value: 155.0 })
        );
        assert_eq!(
            result.records.lightest,
            Some(DatedValue { date: day("2025-03-03"), value: 149.0 })
        );
        assert_eq!(result.records.biggest_gain, 6.0);
        assert_eq!(result.records.biggest_loss, -3.0);
    }

    #[test]
    fn test_trend_line_projects_next_entry() {
        let start = day("2025-03-01");
        let entries = [100.0, 102.0, 104.0, 106.0]
            .iter()
            .enumerate()
            .map(|(i, w)| entry(i as i64, start + Duration::days(i as i64), *w))
            .collect();
        let result = summarize(range(), entries);
        assert_eq!(result.trend_line.slope, 2.0);
        assert_eq!(result.trend_line.intercept, 100.0);
        assert_eq!(result.trend_line.projected_next, 108.0);
    }

    #[test]
    fn test_moving_average_labels_use_window_end() {
        let start = day("2025-03-01");
        let entries = (0..8)
            .map(|i| entry(i, start + Duration::days(i), 100.0 + i as f64))
            .collect();
        let result = summarize(range(), entries);

        assert_eq!(result.moving_average_7.len(), 2);
        assert_eq!(result.moving_average_7[0].date, day("2025-03-07"));
        assert_eq!(result.moving_average_7[0].value, 103.0);
        assert_eq!(result.moving_average_7[1].date, day("2025-03-08"));
        assert!(result.moving_average_30.is_empty());
    }
}
