//! Statistics primitives
//!
//! Pure functions over chronologically ordered series. Nothing here rounds;
//! rounding happens when a response is built (see [`round2`]).

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

/// Changes smaller than this are treated as noise by [`classify_trend`]
pub const TREND_EPSILON: f64 = 0.01;

/// Direction of a metric between two points of a window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Stable => "stable",
        }
    }
}

/// Ordinary least squares fit of value against index
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Regression {
    pub slope: f64,
    pub intercept: f64,
}

impl Regression {
    /// Value of the fitted line at index `x`
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Current and longest runs of consecutive active days
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Streaks {
    pub current: u32,
    pub longest: u32,
}

/// Extremes and largest adjacent deltas of a series
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SeriesRecords {
    pub max: f64,
    pub min: f64,
    /// Largest positive step, 0 if none
    pub biggest_gain: f64,
    /// Most negative step (a negative number), 0 if none
    pub biggest_loss: f64,
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn mean(series: &[f64]) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    series.iter().sum::<f64>() / series.len() as f64
}

/// Trailing-window averages; output index `k` covers `series[k..k + window]`
pub fn moving_average(series: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || series.len() < window {
        return Vec::new();
    }
    series.windows(window).map(mean).collect()
}

/// OLS over `x = 0..n-1`. With fewer than two points the line is flat.
pub fn linear_regression(series: &[f64]) -> Regression {
    let n = series.len();
    if n < 2 {
        return Regression {
            slope: 0.0,
            intercept: series.first().copied().unwrap_or(0.0),
        };
    }

    let n_f = n as f64;
    let mean_x = (n_f - 1.0) / 2.0;
    let mean_y = mean(series);

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, y) in series.iter().enumerate() {
        let dx = i as f64 - mean_x;
        numerator += dx * (y - mean_y);
        denominator += dx * dx;
    }

    let slope = if denominator.abs() < f64::EPSILON {
        0.0
    } else {
        numerator / denominator
    };

    Regression {
        slope,
        intercept: mean_y - slope * mean_x,
    }
}

/// Population variance (divides by `n`); 0 below two points
pub fn variance(series: &[f64]) -> f64 {
    if series.len() < 2 {
        return 0.0;
    }
    let avg = mean(series);
    series.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / series.len() as f64
}

pub fn std_dev(series: &[f64]) -> f64 {
    variance(series).sqrt()
}

pub fn classify_trend(first: f64, last: f64) -> Trend {
    let change = last - first;
    if change > TREND_EPSILON {
        Trend::Increasing
    } else if change < -TREND_EPSILON {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

/// Trend between the first and last values of a series; stable below two points
pub fn series_trend(series: &[f64]) -> Trend {
    match (series.first(), series.last()) {
        (Some(first), Some(last)) if series.len() >= 2 => classify_trend(*first, *last),
        _ => Trend::Stable,
    }
}

/// Streaks over the days that had at least one event.
///
/// The current streak ends at `today`, or at yesterday when nothing has
/// happened today yet; a day only breaks the streak once it has passed.
pub fn streaks<I>(active_days: I, today: NaiveDate) -> Streaks
where
    I: IntoIterator<Item = NaiveDate>,
{
    let days: BTreeSet<NaiveDate> = active_days.into_iter().collect();
    if days.is_empty() {
        return Streaks::default();
    }

    let mut longest = 0u32;
    let mut run = 0u32;
    let mut previous: Option<NaiveDate> = None;
    for day in &days {
        run = match previous {
            Some(prev) if prev.succ_opt() == Some(*day) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(*day);
    }

    let mut cursor = if days.contains(&today) {
        Some(today)
    } else {
        today.pred_opt()
    };
    let mut current = 0u32;
    while let Some(day) = cursor {
        if !days.contains(&day) {
            break;
        }
        current += 1;
        cursor = day.pred_opt();
    }

    Streaks { current, longest }
}

/// Max, min and biggest single-step gain/loss between adjacent values
pub fn series_records(series: &[f64]) -> SeriesRecords {
    if series.is_empty() {
        return SeriesRecords::default();
    }

    let max = series.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = series.iter().copied().fold(f64::INFINITY, f64::min);

    let mut biggest_gain = 0.0_f64;
    let mut biggest_loss = 0.0_f64;
    for pair in series.windows(2) {
        let delta = pair[1] - pair[0];
        if delta > biggest_gain {
            biggest_gain = delta;
        }
        if delta < biggest_loss {
            biggest_loss = delta;
        }
    }

    SeriesRecords {
        max,
        min,
        biggest_gain,
        biggest_loss,
    }
}

/// `part / whole * 100`, 0 when `whole` is not positive
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 {
        0.0
    } else {
        part / whole * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_moving_average_length_and_values() {
        let series = [1.0, 2.0, 3.0, 4.0, 5.0];
        let ma = moving_average(&series, 3);
        assert_eq!(ma.len(), series.len() - 3 + 1);
        assert_eq!(ma, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_moving_average_window_larger_than_series() {
        assert!(moving_average(&[1.0, 2.0], 3).is_empty());
        assert!(moving_average(&[1.0, 2.0], 0).is_empty());
        assert_eq!(moving_average(&[4.0, 6.0], 2), vec![5.0]);
    }

    #[test]
    fn test_linear_regression_exact_for_linear_series() {
        let reg = linear_regression(&[100.0, 102.0, 104.0, 106.0]);
        assert!((reg.slope - 2.0).abs() < 1e-9);
        assert!((reg.intercept - 100.0).abs() < 1e-9);
        assert!((reg.predict(4.0) - 108.0).abs() < 1e-9);
    }

    #[test]
    fn test_linear_regression_short_series_is_flat() {
        assert_eq!(linear_regression(&[]), Regression { slope: 0.0, intercept: 0.0 });
        let single = linear_regression(&[150.0]);
        assert_eq!(single.slope, 0.0);
        assert_eq!(single.predict(1.0), 150.0);
    }

    #[test]
    fn test_variance_and_std_dev() {
        assert_eq!(variance(&[3.0, 3.0, 3.0]), 0.0);
        assert_eq!(std_dev(&[3.0, 3.0, 3.0]), 0.0);
        assert!((variance(&[1.0, 2.0, 3.0, 4.0, 5.0]) - 2.0).abs() < 1e-12);
        assert!((std_dev(&[1.0, 2.0, 3.0, 4.0, 5.0]) - 1.414).abs() < 1e-3);
        assert_eq!(variance(&[7.0]), 0.0);
    }

    #[test]
    fn test_classify_trend_ignores_noise() {
        assert_eq!(classify_trend(100.0, 100.005), Trend::Stable);
        assert_eq!(classify_trend(100.0, 100.5), Trend::Increasing);
        assert_eq!(classify_trend(100.0, 99.0), Trend::Decreasing);
        assert_eq!(series_trend(&[5.0]), Trend::Stable);
        assert_eq!(Trend::Increasing.as_str(), "increasing");
    }

    #[test]
    fn test_streaks_consecutive_days_ending_today() {
        let today = day("2025-03-10");
        let days = vec![day("2025-03-10"), day("2025-03-09"), day("2025-03-08")];
        let s = streaks(days, today);
        assert_eq!(s.current, 3);
        assert_eq!(s.longest, 3);
    }

    #[test]
    fn test_streaks_gap_caps_run() {
        let today = day("2025-03-10");
        let days = vec![
            day("2025-03-10"),
            day("2025-03-09"),
            day("2025-03-08"),
            // gap at 03-07
            day("2025-03-06"),
            day("2025-03-05"),
        ];
        let s = streaks(days, today);
        assert_eq!(s.current, 3);
        assert_eq!(s.longest, 3);
    }

    #[test]
    fn test_streaks_today_not_yet_active() {
        let today = day("2025-03-10");
        let s = streaks(vec![day("2025-03-09"), day("2025-03-08")], today);
        assert_eq!(s.current, 2);

        let s = streaks(vec![day("2025-03-08"), day("2025-03-07")], today);
        assert_eq!(s.current, 0);
        assert_eq!(s.longest, 2);
    }

    #[test]
    fn test_streaks_duplicates_and_empty() {
        let today = day("2025-03-10");
        let s = streaks(vec![day("2025-03-10"), day("2025-03-10")], today);
        assert_eq!(s, Streaks { current: 1, longest: 1 });
        assert_eq!(streaks(Vec::new(), today), Streaks::default());
    }

    #[test]
    fn test_series_records() {
        let rec = series_records(&[150.0, 152.0, 149.0, 155.0]);
        assert_eq!(rec.max, 155.0);
        assert_eq!(rec.min, 149.0);
        assert_eq!(rec.biggest_gain, 6.0);
        assert_eq!(rec.biggest_loss, -3.0);
    }

    #[test]
    fn test_series_records_defaults() {
        assert_eq!(series_records(&[]), SeriesRecords::default());
        let single = series_records(&[150.0]);
        assert_eq!(single.biggest_gain, 0.0);
        assert_eq!(single.biggest_loss, 0.0);
        assert_eq!(single.max, 150.0);
    }

    #[test]
    fn test_percentage_and_round2() {
        assert_eq!(percentage(1.0, 0.0), 0.0);
        assert_eq!(round2(percentage(2.0, 7.0)), 28.57);
    }
}
