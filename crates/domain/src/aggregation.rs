use std::collections::BTreeMap;

use chrono::{Datelike, Days, Duration, Months, NaiveDate};

use crate::{BodyPart, WorkoutRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

impl Interval {
    #[must_use]
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.first <= day && day <= self.last
    }
}

/// The Monday–Sunday week containing `day`.
#[must_use]
pub fn week_of(day: NaiveDate) -> Interval {
    let first = day
        .checked_sub_days(Days::new(u64::from(day.weekday().num_days_from_monday())))
        .unwrap_or(day);
    let last = first.checked_add_days(Days::new(6)).unwrap_or(first);
    Interval { first, last }
}

/// The calendar month containing `day`, from the 1st through the last day.
#[must_use]
pub fn month_of(day: NaiveDate) -> Interval {
    let first = day.with_day(1).unwrap_or(day);
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .unwrap_or(day);
    Interval { first, last }
}

#[must_use]
pub fn workouts_on_day(workouts: &[WorkoutRecord], day: NaiveDate) -> Vec<&WorkoutRecord> {
    workouts.iter().filter(|w| w.date == Some(day)).collect()
}

#[must_use]
pub fn workouts_in_week(workouts: &[WorkoutRecord], day: NaiveDate) -> Vec<&WorkoutRecord> {
    let week = week_of(day);
    workouts
        .iter()
        .filter(|w| w.date.is_some_and(|d| week.contains(d)))
        .collect()
}

#[must_use]
pub fn workouts_in_month(workouts: &[WorkoutRecord], day: NaiveDate) -> Vec<&WorkoutRecord> {
    let month = month_of(day);
    workouts
        .iter()
        .filter(|w| w.date.is_some_and(|d| month.contains(d)))
        .collect()
}

/// Group records by calendar day, ordered by timestamp within a day.
///
/// Records without a parseable date are grouped under `today` instead of
/// being dropped, so every record stays visible somewhere. This deliberately
/// diverges from the day/week/month filters, which exclude such records to
/// avoid miscounting them in a specific bucket.
#[must_use]
pub fn group_by_day<'a>(
    workouts: &'a [WorkoutRecord],
    today: NaiveDate,
) -> BTreeMap<NaiveDate, Vec<&'a WorkoutRecord>> {
    let mut result: BTreeMap<NaiveDate, Vec<&WorkoutRecord>> = BTreeMap::new();
    for workout in workouts {
        result
            .entry(workout.date.unwrap_or(today))
            .or_default()
            .push(workout);
    }
    for day in result.values_mut() {
        day.sort_by_key(|w| w.timestamp);
    }
    result
}

/// Sum of sets per muscle group. Every catalog entry is present in the
/// result, with 0 for groups without matching records.
#[must_use]
pub fn total_sets_by_body_part(workouts: &[&WorkoutRecord]) -> BTreeMap<BodyPart, u32> {
    let mut result: BTreeMap<BodyPart, u32> = BodyPart::iter().map(|p| (*p, 0)).collect();
    for workout in workouts {
        *result.entry(workout.body_part).or_insert(0) += u32::from(workout.sets);
    }
    result
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyPartStats {
    pub total_sets: u32,
    pub percentage_of_max: f32,
    pub level: Level,
}

#[must_use]
pub fn stats_by_body_part(workouts: &[&WorkoutRecord]) -> BTreeMap<BodyPart, BodyPartStats> {
    let total_sets = total_sets_by_body_part(workouts);
    let max = total_sets.values().copied().max().unwrap_or(0);
    total_sets
        .into_iter()
        .map(|(body_part, total_sets)| {
            #[allow(clippy::cast_precision_loss)]
            let percentage_of_max = if max == 0 {
                0.0
            } else {
                total_sets as f32 / max as f32 * 100.0
            };
            (
                body_part,
                BodyPartStats {
                    total_sets,
                    percentage_of_max,
                    level: Level::from_total_sets(total_sets),
                },
            )
        })
        .collect()
}

/// Time between the first and the last record of a day's bucket.
///
/// Only defined for two or more records; a single record has no span.
#[must_use]
pub fn duration_span(workouts: &[&WorkoutRecord]) -> Option<Duration> {
    if workouts.len() < 2 {
        return None;
    }
    let first = workouts.iter().map(|w| w.timestamp).min()?;
    let last = workouts.iter().map(|w| w.timestamp).max()?;
    Some(last - first)
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum Level {
    Beginner = 1,
    Intermediate = 2,
    Advanced = 3,
    Expert = 4,
    Master = 5,
}

impl Level {
    #[must_use]
    pub fn from_total_sets(total_sets: u32) -> Self {
        match total_sets {
            0..=9 => Level::Beginner,
            10..=19 => Level::Intermediate,
            20..=29 => Level::Advanced,
            30..=49 => Level::Expert,
            _ => Level::Master,
        }
    }

    #[must_use]
    pub fn rank(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Level::Beginner => "Beginner",
            Level::Intermediate => "Intermediate",
            Level::Advanced => "Advanced",
            Level::Expert => "Expert",
            Level::Master => "Master",
        }
    }

    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Level::Beginner => "#9e9e9e",
            Level::Intermediate => "#4caf50",
            Level::Advanced => "#2196f3",
            Level::Expert => "#9c27b0",
            Level::Master => "#ffc107",
        }
    }
}
