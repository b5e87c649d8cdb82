use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FitLabError;

/// Biological sex used by the BMR formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

/// Self-reported activity level, drives TDEE and program selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    LightlyActive,
    ModeratelyActive,
    VeryActive,
    ExtremelyActive,
}

/// Dietary objective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    /// Fat loss
    Cut,
    Maintain,
    /// Mass gain
    Bulk,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::LightlyActive,
        ActivityLevel::ModeratelyActive,
        ActivityLevel::VeryActive,
        ActivityLevel::ExtremelyActive,
    ];

    /// TDEE multiplier applied to BMR
    pub fn multiplier(&self) -> Decimal {
        match self {
            ActivityLevel::Sedentary => dec!(1.2),
            ActivityLevel::LightlyActive => dec!(1.375),
            ActivityLevel::ModeratelyActive => dec!(1.55),
            ActivityLevel::VeryActive => dec!(1.725),
            ActivityLevel::ExtremelyActive => dec!(1.9),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::LightlyActive => "lightly_active",
            ActivityLevel::ModeratelyActive => "moderately_active",
            ActivityLevel::VeryActive => "very_active",
            ActivityLevel::ExtremelyActive => "extremely_active",
        }
    }
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

impl Goal {
    pub const ALL: [Goal; 3] = [Goal::Cut, Goal::Maintain, Goal::Bulk];

    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::Cut => "cut",
            Goal::Maintain => "maintain",
            Goal::Bulk => "bulk",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sex {
    type Err = FitLabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "male" | "m" => Ok(Sex::Male),
            "female" | "f" => Ok(Sex::Female),
            _ => Err(FitLabError::validation("sex", format!("unknown value '{}'", s))),
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = FitLabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "lightly_active" => Ok(ActivityLevel::LightlyActive),
            "moderately_active" => Ok(ActivityLevel::ModeratelyActive),
            "very_active" => Ok(ActivityLevel::VeryActive),
            "extremely_active" => Ok(ActivityLevel::ExtremelyActive),
            _ => Err(FitLabError::validation(
                "activity_level",
                format!("unknown value '{}'", s),
            )),
        }
    }
}

impl FromStr for Goal {
    type Err = FitLabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cut" => Ok(Goal::Cut),
            "maintain" => Ok(Goal::Maintain),
            "bulk" => Ok(Goal::Bulk),
            _ => Err(FitLabError::validation("goal", format!("unknown value '{}'", s))),
        }
    }
}

/// Daily macronutrient targets derived at onboarding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacrosTarget {
    /// Daily calorie budget in kcal
    pub daily_calories: i32,

    /// Protein in grams
    pub protein_g: i32,

    /// Carbohydrates in grams
    pub carbs_g: i32,

    /// Fat in grams
    pub fat_g: i32,
}

/// Profile snapshot persisted at onboarding completion
///
/// `sex` and `dob` are identity fields; `bmr`, `tdee`, `macros_target` and
/// `program_id` are derived and recomputed whenever the body inputs change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub sex: Sex,

    /// Date of birth, serialized as YYYY-MM-DD
    pub dob: NaiveDate,

    /// Height in centimeters
    #[serde(with = "rust_decimal::serde::float")]
    pub height_cm: Decimal,

    /// Weight in kilograms
    #[serde(with = "rust_decimal::serde::float")]
    pub weight_kg: Decimal,

    pub activity_level: ActivityLevel,

    pub goal: Goal,

    /// Basal metabolic rate in kcal/day
    pub bmr: i32,

    /// Total daily energy expenditure in kcal/day
    pub tdee: i32,

    pub macros_target: MacrosTarget,

    /// Id of the assigned program template
    pub program_id: String,
}
