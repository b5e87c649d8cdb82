//! Biometric and nutrition calculations
//!
//! BMR → TDEE → macro-target pipeline used at onboarding, plus the weight
//! based food macro estimate used by the daily summary.
//!
//! All arithmetic is done in [`Decimal`] so that midpoint cases are exact.
//! Every formula rounds with [`round_half_up`] (`floor(x + 0.5)`).
//!
//! # References
//!
//! - Mifflin, M.D., et al. (1990). A new predictive equation for resting
//!   energy expenditure in healthy individuals. *American Journal of Clinical
//!   Nutrition*, 51(2), 241-247.

use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::models::{ActivityLevel, Goal, MacrosTarget, Sex};

/// Calorie deficit applied when cutting
pub const CUT_DEFICIT_KCAL: i32 = 500;

/// Calorie surplus applied when bulking
pub const BULK_SURPLUS_KCAL: i32 = 300;

/// Protein grams per kilogram of body weight
pub const PROTEIN_G_PER_KG: Decimal = dec!(2);

/// Share of daily calories allocated to fat
pub const FAT_CALORIE_SHARE: Decimal = dec!(0.25);

const KCAL_PER_G_PROTEIN: i32 = 4;
const KCAL_PER_G_CARBS: Decimal = dec!(4);
const KCAL_PER_G_FAT: Decimal = dec!(9);

/// Round to the nearest integer, midpoints towards positive infinity
///
/// Saturates at the `i32` bounds.
pub fn round_half_up(value: Decimal) -> i32 {
    (value + dec!(0.5)).floor().to_i32().unwrap_or(if value.is_sign_negative() {
        i32::MIN
    } else {
        i32::MAX
    })
}

/// Basal Metabolic Rate in kcal/day (Mifflin-St Jeor)
///
/// `base = 10 × weight_kg + 6.25 × height_cm − 5 × age`, then `+5` for men and
/// `−161` for women.
pub fn bmr(sex: Sex, weight_kg: Decimal, height_cm: Decimal, age_years: i32) -> i32 {
    let base = dec!(10) * weight_kg + dec!(6.25) * height_cm - dec!(5) * Decimal::from(age_years);
    let offset = match sex {
        Sex::Male => dec!(5),
        Sex::Female => dec!(-161),
    };
    round_half_up(base + offset)
}

/// Total Daily Energy Expenditure in kcal/day
pub fn tdee(bmr: i32, activity_level: ActivityLevel) -> i32 {
    round_half_up(Decimal::from(bmr) * activity_level.multiplier())
}

/// Daily macro targets for a goal
///
/// Protein (2 g/kg) and fat (25% of calories) are fixed first; carbohydrates
/// take the remaining calories. Macro calories may drift from
/// `daily_calories` by a few kcal through rounding.
pub fn target_macros(tdee: i32, goal: Goal, weight_kg: Decimal) -> MacrosTarget {
    let daily_calories = match goal {
        Goal::Cut => tdee - CUT_DEFICIT_KCAL,
        Goal::Bulk => tdee + BULK_SURPLUS_KCAL,
        Goal::Maintain => tdee,
    };

    let protein_g = round_half_up(weight_kg * PROTEIN_G_PER_KG);
    let protein_calories = protein_g * KCAL_PER_G_PROTEIN;

    let fat_calories = round_half_up(Decimal::from(daily_calories) * FAT_CALORIE_SHARE);
    let fat_g = round_half_up(Decimal::from(fat_calories) / KCAL_PER_G_FAT);

    let remaining = Decimal::from(daily_calories - protein_calories - fat_calories);
    let carbs_g = round_half_up(remaining / KCAL_PER_G_CARBS);

    MacrosTarget {
        daily_calories,
        protein_g,
        carbs_g,
        fat_g,
    }
}

/// Full years elapsed between `dob` and `today`
pub fn age(dob: NaiveDate, today: NaiveDate) -> i32 {
    let mut years = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        years -= 1;
    }
    years
}

/// Macro totals estimated from logged food
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Macros {
    #[serde(with = "rust_decimal::serde::float")]
    pub calories: Decimal,
    pub protein_g: i32,
    pub carbs_g: i32,
    pub fat_g: i32,
}

/// Estimate macros from food weights in grams
///
/// Per entry: calories equal the weight; protein 15%, carbs 50% and fat 5%
/// of the weight, each rounded per entry before summing.
pub fn sum_estimated_macros(weights_g: &[Decimal]) -> Macros {
    weights_g.iter().fold(Macros::default(), |mut totals, &weight| {
        totals.calories += weight;
        totals.protein_g += round_half_up(weight * dec!(0.15));
        totals.carbs_g += round_half_up(weight * dec!(0.5));
        totals.fat_g += round_half_up(weight * dec!(0.05));
        totals
    })
}
