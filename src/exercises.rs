//! Exercise library and progress views
//!
//! Exercises are either system entries shared by everyone or custom entries
//! owned by one user. Progress groups a user's logs by calendar day and
//! tracks per-exercise volume and drill success over time.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::activity::{ActivityEntry, ActivityLog, StrengthPayload};
use crate::error::{FitLabError, Result};
use crate::nutrition::round_half_up;

/// Owner id of the built-in exercises
pub const SYSTEM_OWNER: &str = "system";

/// Kind of activity an exercise is logged as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseCategory {
    Strength,
    Skill,
    Food,
}

/// Coarse body region used to group the library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MuscleGroup {
    Chest,
    Back,
    Legs,
    Core,
    Cardio,
    Skill,
}

impl ExerciseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseCategory::Strength => "strength",
            ExerciseCategory::Skill => "skill",
            ExerciseCategory::Food => "food",
        }
    }
}

impl MuscleGroup {
    pub const ALL: [MuscleGroup; 6] = [
        MuscleGroup::Chest,
        MuscleGroup::Back,
        MuscleGroup::Legs,
        MuscleGroup::Core,
        MuscleGroup::Cardio,
        MuscleGroup::Skill,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MuscleGroup::Chest => "chest",
            MuscleGroup::Back => "back",
            MuscleGroup::Legs => "legs",
            MuscleGroup::Core => "core",
            MuscleGroup::Cardio => "cardio",
            MuscleGroup::Skill => "skill",
        }
    }
}

impl fmt::Display for ExerciseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for MuscleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExerciseCategory {
    type Err = FitLabError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "strength" => Ok(ExerciseCategory::Strength),
            "skill" => Ok(ExerciseCategory::Skill),
            "food" => Ok(ExerciseCategory::Food),
            other => Err(FitLabError::validation(
                "category",
                format!("unknown category '{}'", other),
            )),
        }
    }
}

impl FromStr for MuscleGroup {
    type Err = FitLabError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        MuscleGroup::ALL
            .iter()
            .copied()
            .find(|group| group.as_str() == wanted)
            .ok_or_else(|| FitLabError::validation("muscleGroup", format!("unknown muscle group '{}'", s)))
    }
}

/// Library entry, `ownerId` is [`SYSTEM_OWNER`] or a user id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub category: ExerciseCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muscle_group: Option<MuscleGroup>,
}

impl Exercise {
    pub fn is_system(&self) -> bool {
        self.owner_id == SYSTEM_OWNER
    }
}

/// Custom exercise as submitted; the owner comes from the caller's identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExercise {
    pub name: String,
    pub category: ExerciseCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muscle_group: Option<MuscleGroup>,
}

impl NewExercise {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(FitLabError::validation("name", "Name is required"));
        }
        Ok(())
    }

    pub fn into_exercise(self, id: String, owner_id: &str) -> Exercise {
        Exercise {
            id,
            owner_id: owner_id.to_string(),
            name: self.name.trim().to_string(),
            category: self.category,
            muscle_group: self.muscle_group,
        }
    }
}

use ExerciseCategory::{Skill, Strength};

/// Built-in library as `(id, name, category, muscle group)`
static SYSTEM_EXERCISES: [(&str, &str, ExerciseCategory, MuscleGroup); 10] = [
    ("bench_press", "Bench Press", Strength, MuscleGroup::Chest),
    ("squat", "Squat", Strength, MuscleGroup::Legs),
    ("deadlift", "Deadlift", Strength, MuscleGroup::Back),
    ("pull-ups", "Pull-ups", Strength, MuscleGroup::Back),
    ("push-ups", "Push-ups", Strength, MuscleGroup::Chest),
    ("running", "Running", Strength, MuscleGroup::Cardio),
    ("plank", "Plank", Strength, MuscleGroup::Core),
    ("free_throws", "Free Throws", Skill, MuscleGroup::Skill),
    ("jump_shot", "Jump Shot", Skill, MuscleGroup::Skill),
    ("swimming", "Swimming", Strength, MuscleGroup::Cardio),
];

/// The system exercises, in library order
pub fn system_exercises() -> Vec<Exercise> {
    SYSTEM_EXERCISES
        .iter()
        .map(|&(id, name, category, group)| Exercise {
            id: id.to_string(),
            owner_id: SYSTEM_OWNER.to_string(),
            name: name.to_string(),
            category,
            muscle_group: Some(group),
        })
        .collect()
}

/// What kind of training happened on a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityDayKind {
    WorkoutOnly,
    SkillOnly,
    Both,
}

impl ActivityDayKind {
    fn with(self, other: ActivityDayKind) -> ActivityDayKind {
        if self == other {
            self
        } else {
            ActivityDayKind::Both
        }
    }
}

/// Day grouping of training logs; food logs do not make a day active
pub fn activity_map(logs: &[ActivityLog]) -> BTreeMap<NaiveDate, ActivityDayKind> {
    let mut days = BTreeMap::new();
    for log in logs {
        let kind = match &log.entry {
            ActivityEntry::Strength(_) => ActivityDayKind::WorkoutOnly,
            ActivityEntry::Skill(_) => ActivityDayKind::SkillOnly,
            ActivityEntry::Food(_) => continue,
        };
        days.entry(log.date)
            .and_modify(|day: &mut ActivityDayKind| *day = day.with(kind))
            .or_insert(kind);
    }
    days
}

/// Shot percentage rounded half up, `None` without attempts
pub fn drill_success_rate(made: u32, attempts: u32) -> Option<i32> {
    if attempts == 0 {
        return None;
    }
    Some(round_half_up(Decimal::from(made) * Decimal::from(100) / Decimal::from(attempts)))
}

/// Sum of `weight × reps`; bodyweight sets (weight 0) count their reps
pub fn strength_volume(payload: &StrengthPayload) -> Decimal {
    payload
        .sets
        .iter()
        .map(|set| {
            let load = if set.weight.is_zero() { Decimal::ONE } else { set.weight };
            load * Decimal::from(set.reps)
        })
        .sum()
}

/// Activity totals over a set of logs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub days: BTreeMap<NaiveDate, ActivityDayKind>,
    pub total_workouts: usize,
    pub total_skills: usize,
}

impl ProgressSummary {
    pub fn from_logs(logs: &[ActivityLog]) -> Self {
        let count = |kind: &str| logs.iter().filter(|log| log.entry.kind() == kind).count();
        Self {
            days: activity_map(logs),
            total_workouts: count("strength"),
            total_skills: count("skill"),
        }
    }

    pub fn active_days(&self) -> usize {
        self.days.len()
    }
}

/// One logged session of an exercise or drill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformancePoint {
    pub date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub volume: Decimal,
    /// Present for skill drills only
    pub success_rate: Option<i32>,
}

/// Sessions of `exercise` in date order, matched by display name
pub fn performance_series(logs: &[ActivityLog], exercise: &str) -> Vec<PerformancePoint> {
    let mut points: Vec<PerformancePoint> = logs
        .iter()
        .filter_map(|log| match &log.entry {
            ActivityEntry::Strength(payload) if payload.exercise_name == exercise => Some(PerformancePoint {
                date: log.date,
                volume: strength_volume(payload),
                success_rate: None,
            }),
            ActivityEntry::Skill(payload) if payload.drill_name == exercise => Some(PerformancePoint {
                date: log.date,
                volume: Decimal::ZERO,
                success_rate: drill_success_rate(payload.made, payload.attempts),
            }),
            _ => None,
        })
        .collect();
    points.sort_by_key(|point| point.date);
    points
}

/// Distinct exercise and drill names that have logs, sorted
pub fn performed_exercises(logs: &[ActivityLog]) -> Vec<String> {
    let mut names: Vec<String> = logs
        .iter()
        .filter_map(|log| log.entry.trained_exercise().map(str::to_string))
        .collect();
    names.sort();
    names.dedup();
    names
}
