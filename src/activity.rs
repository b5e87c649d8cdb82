//! Activity log model
//!
//! A log is one of three payload kinds behind a `type` tag, stored as
//! `{"date", "type", "payload", ...}` documents.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{FitLabError, Result};

/// A single working set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrengthSet {
    /// Load in kilograms
    #[serde(with = "rust_decimal::serde::float")]
    pub weight: Decimal,
    pub reps: u32,
}

/// Weight training
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrengthPayload {
    pub exercise_id: String,
    /// Cached display name, also used for the muscle lookup
    pub exercise_name: String,
    pub sets: Vec<StrengthSet>,
}

/// Skill work such as basketball shooting drills
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillPayload {
    pub drill_name: String,
    pub attempts: u32,
    pub made: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
}

/// Nutrition entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodPayload {
    pub meal_type: MealType,
    pub food_name: String,
    /// Portion weight in grams
    #[serde(with = "rust_decimal::serde::float")]
    pub weight: Decimal,
}

/// Log payload, discriminated by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum ActivityEntry {
    Strength(StrengthPayload),
    Skill(SkillPayload),
    Food(FoodPayload),
}

impl ActivityEntry {
    pub fn kind(&self) -> &'static str {
        match self {
            ActivityEntry::Strength(_) => "strength",
            ActivityEntry::Skill(_) => "skill",
            ActivityEntry::Food(_) => "food",
        }
    }

    /// Name to resolve against the muscle catalog, if this entry trains anything
    pub fn trained_exercise(&self) -> Option<&str> {
        match self {
            ActivityEntry::Strength(payload) => Some(&payload.exercise_name),
            ActivityEntry::Skill(payload) => Some(&payload.drill_name),
            ActivityEntry::Food(_) => None,
        }
    }

    pub fn food_weight(&self) -> Option<Decimal> {
        match self {
            ActivityEntry::Food(payload) => Some(payload.weight),
            _ => None,
        }
    }
}

/// Log as submitted, before an id and creation time are assigned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewActivityLog {
    /// Calendar day the activity belongs to, YYYY-MM-DD
    pub date: NaiveDate,
    #[serde(flatten)]
    pub entry: ActivityEntry,
}

impl NewActivityLog {
    pub fn new(date: NaiveDate, entry: ActivityEntry) -> Self {
        Self { date, entry }
    }

    /// Check payload invariants
    pub fn validate(&self) -> Result<()> {
        match &self.entry {
            ActivityEntry::Strength(payload) => {
                if payload.exercise_name.trim().is_empty() {
                    return Err(FitLabError::validation("exerciseName", "Name is required"));
                }
                if let Some(set) = payload.sets.iter().find(|set| set.weight.is_sign_negative()) {
                    return Err(FitLabError::validation(
                        "sets.weight",
                        format!("weight must be >= 0, got {}", set.weight),
                    ));
                }
            }
            ActivityEntry::Skill(payload) => {
                if payload.attempts < 1 {
                    return Err(FitLabError::validation("attempts", "must be >= 1"));
                }
                if payload.made > payload.attempts {
                    return Err(FitLabError::validation("made", "Made cannot exceed Attempts"));
                }
            }
            ActivityEntry::Food(payload) => {
                if payload.weight.is_sign_negative() {
                    return Err(FitLabError::validation(
                        "weight",
                        format!("weight must be >= 0, got {}", payload.weight),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Stored log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: String,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub entry: ActivityEntry,
    pub created_at: DateTime<Utc>,
}

impl ActivityLog {
    pub fn from_new(id: String, log: NewActivityLog, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            date: log.date,
            entry: log.entry,
            created_at,
        }
    }
}
