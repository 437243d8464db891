//! Exercise analytics
//!
//! Volume, category and muscle-group distributions over every exercise row
//! performed in a workout dated within the range.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;

use super::range::{self, DateRange, RangeQuery};
use super::stats::round2;
use crate::error::AppResult;
use crate::models::{ExerciseCategory, ExercisePerformance, MuscleGroup, PersonalRecord, RecordType};

pub const TOP_EXERCISE_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: ExerciseCategory,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MuscleGroupCount {
    pub muscle_group: MuscleGroup,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopExercise {
    pub exercise_id: i64,
    pub name: String,
    pub times_performed: usize,
    pub total_sets: i64,
    pub total_volume: f64,
    pub max_weight: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecordTypeCount {
    pub record_type: RecordType,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseAnalytics {
    pub range: DateRange,
    pub total_exercises: usize,
    pub total_sets: i64,
    pub total_volume: f64,
    pub category_distribution: Vec<CategoryCount>,
    pub muscle_group_distribution: Vec<MuscleGroupCount>,
    pub top_exercises: Vec<TopExercise>,
    pub personal_records: Vec<RecordTypeCount>,
}

pub fn exercise_analytics(
    conn: &Connection,
    user_id: i64,
    query: &RangeQuery<'_>,
    today: NaiveDate,
) -> AppResult<ExerciseAnalytics> {
    let range = range::resolve(query, today)?;
    let rows = ExercisePerformance::list_in_range(conn, user_id, &range)?;
    let records = PersonalRecord::count_by_type(conn, user_id, &range)?;
    tracing::debug!(user_id, rows = rows.len(), "exercise analytics");
    Ok(summarize(range, &rows, records))
}

/// Counts sorted by count descending, key ascending on ties
fn ranked<K: Ord + Copy>(counts: BTreeMap<K, usize>) -> Vec<(K, usize)> {
    let mut ranked: Vec<(K, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

pub fn summarize(
    range: DateRange,
    rows: &[ExercisePerformance],
    records: Vec<(RecordType, i64)>,
) -> ExerciseAnalytics {
    let mut categories: BTreeMap<ExerciseCategory, usize> = BTreeMap::new();
    let mut muscles: BTreeMap<MuscleGroup, usize> = BTreeMap::new();
    let mut per_exercise: BTreeMap<i64, TopExercise> = BTreeMap::new();

    for row in rows {
        *categories.entry(row.category).or_insert(0) += 1;
        for group in &row.muscle_groups {
            *muscles.entry(*group).or_insert(0) += 1;
        }

        let top = per_exercise.entry(row.exercise_id).or_insert_with(|| TopExercise {
            exercise_id: row.exercise_id,
            name: row.name.clone(),
            times_performed: 0,
            total_sets: 0,
            total_volume: 0.0,
            max_weight: None,
        });
        top.times_performed += 1;
        top.total_sets += row.sets.unwrap_or(0);
        top.total_volume += row.volume();
        if let Some(w) = row.weight {
            top.max_weight = Some(top.max_weight.map_or(w, |m| m.max(w)));
        }
    }

    let mut top_exercises: Vec<TopExercise> = per_exercise.into_values().collect();
    top_exercises.sort_by(|a, b| {
        b.times_performed
            .cmp(&a.times_performed)
            .then_with(|| a.name.cmp(&b.name))
    });
    top_exercises.truncate(TOP_EXERCISE_LIMIT);
    for top in &mut top_exercises {
        top.total_volume = round2(top.total_volume);
    }

    ExerciseAnalytics {
        range,
        total_exercises: rows.len(),
        total_sets: rows.iter().filter_map(|r| r.sets).sum(),
        total_volume: round2(rows.iter().map(ExercisePerformance::volume).sum()),
        category_distribution: ranked(categories)
            .into_iter()
            .map(|(category, count)| CategoryCount { category, count })
            .collect(),
        muscle_group_distribution: ranked(muscles)
            .into_iter()
            .map(|(muscle_group, count)| MuscleGroupCount { muscle_group, count })
            .collect(),
        top_exercises,
        personal_records: records
            .into_iter()
            .map(|(record_type, count)| RecordTypeCount { record_type, count })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn row(
        exercise_id: i64,
        name: &str,
        category: ExerciseCategory,
        muscle_groups: Vec<MuscleGroup>,
        sets: Option<i64>,
        reps: Option<i64>,
        weight: Option<f64>,
    ) -> ExercisePerformance {
        ExercisePerformance {
            workout_id: 1,
            date: day("2025-03-05"),
            exercise_id,
            name: name.to_string(),
            category,
            muscle_groups,
            sets,
            reps,
            weight,
        }
    }

    #[test]
    fn test_empty_rows_zero_shape() {
        let range = DateRange::new(day("2025-03-01"), day("2025-03-31"));
        let result = summarize(range, &[], Vec::new());
        assert_eq!(result.total_sets, 0);
        assert_eq!(result.total_volume, 0.0);
        assert!(result.category_distribution.is_empty());
        assert!(result.top_exercises.is_empty());
    }

    #[test]
    fn test_distributions_and_top_exercises() {
        let range = DateRange::new(day("2025-03-01"), day("2025-03-31"));
        let bench = vec![MuscleGroup::Chest, MuscleGroup::Triceps];
        let rows = vec![
            row(1, "Bench Press", ExerciseCategory::Strength, bench.clone(), Some(3), Some(10), Some(100.0)),
            row(1, "Bench Press", ExerciseCategory::Strength, bench, Some(3), Some(8), Some(110.0)),
            row(2, "Rowing", ExerciseCategory::Cardio, vec![MuscleGroup::Back], None, None, None),
        ];
        let records = vec![(RecordType::MaxWeight, 2)];
        let result = summarize(range, &rows, records);

        assert_eq!(result.total_exercises, 3);
        assert_eq!(result.total_sets, 6);
        assert_eq!(result.total_volume, 3000.0 + 2640.0);

        assert_eq!(
            result.category_distribution[0],
            CategoryCount { category: ExerciseCategory::Strength, count: 2 }
        );
        assert_eq!(result.muscle_group_distribution.len(), 3);
        assert_eq!(result.muscle_group_distribution[0].count, 2);

        let top = &result.top_exercises[0];
        assert_eq!(top.name, "Bench Press");
        assert_eq!(top.times_performed, 2);
        assert_eq!(top.max_weight, Some(110.0));
        assert_eq!(result.top_exercises[1].max_weight, None);

        assert_eq!(
            result.personal_records,
            vec![RecordTypeCount { record_type: RecordType::MaxWeight, count: 2 }]
        );
    }
}
