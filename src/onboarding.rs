//! Onboarding form validation and profile snapshot computation

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FitLabError, Result};
use crate::models::{ActivityLevel, Goal, Sex, UserProfile};
use crate::nutrition::{age, bmr, target_macros, tdee};
use crate::programs::program_for_level;

pub const MIN_HEIGHT_CM: Decimal = dec!(50);
pub const MAX_HEIGHT_CM: Decimal = dec!(300);
pub const MIN_WEIGHT_KG: Decimal = dec!(20);
pub const MAX_WEIGHT_KG: Decimal = dec!(500);

/// Raw onboarding submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardingForm {
    pub sex: Sex,
    /// Date of birth as entered, expected YYYY-MM-DD
    pub dob: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub height_cm: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub weight_kg: Decimal,
    pub activity_level: ActivityLevel,
    pub goal: Goal,
}

/// Fields derived while validating the form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedForm {
    pub dob: NaiveDate,
    pub age_years: i32,
}

impl OnboardingForm {
    /// Enforce the form contract
    ///
    /// dob must be a real `YYYY-MM-DD` date giving a positive age at `today`;
    /// height_cm in [50, 300]; weight_kg in [20, 500].
    pub fn validate(&self, today: NaiveDate) -> Result<ValidatedForm> {
        let dob = parse_dob(&self.dob)?;

        if self.height_cm < MIN_HEIGHT_CM || self.height_cm > MAX_HEIGHT_CM {
            return Err(FitLabError::validation(
                "height_cm",
                format!("must be between {} and {}, got {}", MIN_HEIGHT_CM, MAX_HEIGHT_CM, self.height_cm),
            ));
        }
        if self.weight_kg < MIN_WEIGHT_KG || self.weight_kg > MAX_WEIGHT_KG {
            return Err(FitLabError::validation(
                "weight_kg",
                format!("must be between {} and {}, got {}", MIN_WEIGHT_KG, MAX_WEIGHT_KG, self.weight_kg),
            ));
        }

        let age_years = age(dob, today);
        if age_years <= 0 {
            return Err(FitLabError::validation(
                "dob",
                format!("age must be at least one year, got {}", age_years),
            ));
        }

        Ok(ValidatedForm { dob, age_years })
    }
}

fn parse_dob(raw: &str) -> Result<NaiveDate> {
    let bytes = raw.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return Err(FitLabError::validation("dob", "Date must be YYYY-MM-DD"));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| FitLabError::validation("dob", format!("'{}' is not a calendar date", raw)))
}

/// Validate the form and compute the persisted profile snapshot
///
/// Identical inputs on the same `today` always yield the same profile.
pub fn build_profile(form: &OnboardingForm, today: NaiveDate) -> Result<UserProfile> {
    let validated = form.validate(today)?;

    let bmr = bmr(form.sex, form.weight_kg, form.height_cm, validated.age_years);
    let tdee = tdee(bmr, form.activity_level);
    let macros_target = target_macros(tdee, form.goal, form.weight_kg);
    let program = program_for_level(form.activity_level);

    debug!(
        age = validated.age_years,
        bmr,
        tdee,
        daily_calories = macros_target.daily_calories,
        program = program.id,
        "Computed onboarding targets"
    );

    Ok(UserProfile {
        sex: form.sex,
        dob: validated.dob,
        height_cm: form.height_cm,
        weight_kg: form.weight_kg,
        activity_level: form.activity_level,
        goal: form.goal,
        bmr,
        tdee,
        macros_target,
        program_id: program.id.to_string(),
    })
}
