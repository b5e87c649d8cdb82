//! Muscle catalog and exercise-to-muscle lookup
//!
//! Static reference data: the 17 tracked muscle regions and the table of
//! exercises that train them. Skill drills are listed with no muscles so a
//! logged drill never touches the recovery heatmap.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FitLabError;

/// Anatomical region tracked by the recovery heatmap
///
/// Declaration order is catalog order; `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MuscleId {
    Chest,
    FrontDelts,
    SideDelts,
    RearDelts,
    Biceps,
    Triceps,
    Forearms,
    UpperBack,
    Lats,
    LowerBack,
    Abs,
    Obliques,
    Quads,
    Hamstrings,
    Glutes,
    Calves,
    HipFlexors,
}

use MuscleId::*;

impl MuscleId {
    /// Full catalog in display order
    pub const ALL: [MuscleId; 17] = [
        Chest, FrontDelts, SideDelts, RearDelts, Biceps, Triceps, Forearms, UpperBack, Lats,
        LowerBack, Abs, Obliques, Quads, Hamstrings, Glutes, Calves, HipFlexors,
    ];

    /// Persisted identifier
    pub fn id(&self) -> &'static str {
        match self {
            Chest => "chest",
            FrontDelts => "front_delts",
            SideDelts => "side_delts",
            RearDelts => "rear_delts",
            Biceps => "biceps",
            Triceps => "triceps",
            Forearms => "forearms",
            UpperBack => "upper_back",
            Lats => "lats",
            LowerBack => "lower_back",
            Abs => "abs",
            Obliques => "obliques",
            Quads => "quads",
            Hamstrings => "hamstrings",
            Glutes => "glutes",
            Calves => "calves",
            HipFlexors => "hip_flexors",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Chest => "Chest",
            FrontDelts => "Front Delts",
            SideDelts => "Side Delts",
            RearDelts => "Rear Delts",
            Biceps => "Biceps",
            Triceps => "Triceps",
            Forearms => "Forearms",
            UpperBack => "Upper Back",
            Lats => "Lats",
            LowerBack => "Lower Back",
            Abs => "Abs",
            Obliques => "Obliques",
            Quads => "Quads",
            Hamstrings => "Hamstrings",
            Glutes => "Glutes",
            Calves => "Calves",
            HipFlexors => "Hip Flexors",
        }
    }
}

impl fmt::Display for MuscleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for MuscleId {
    type Err = FitLabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MuscleId::ALL
            .iter()
            .copied()
            .find(|m| m.id() == s)
            .ok_or_else(|| FitLabError::validation("muscle", format!("unknown muscle id '{}'", s)))
    }
}

/// Exercise display name paired with the muscles it trains
pub const EXERCISE_MUSCLE_MAP: &[(&str, &[MuscleId])] = &[
    // Seed exercises
    ("Bench Press", &[Chest, Triceps, FrontDelts]),
    ("Squat", &[Quads, Glutes, Hamstrings, LowerBack]),
    ("Deadlift", &[Hamstrings, Glutes, LowerBack, UpperBack, Forearms]),
    ("Pull-ups", &[Lats, Biceps, UpperBack, Forearms]),
    ("Push-ups", &[Chest, Triceps, FrontDelts]),
    ("Running", &[Quads, Hamstrings, Calves, HipFlexors]),
    ("Plank", &[Abs, Obliques, LowerBack]),
    ("Free Throws", &[]),
    ("Jump Shot", &[]),
    ("Swimming", &[Lats, UpperBack, FrontDelts, Quads]),
    // Common extras
    ("Overhead Press", &[FrontDelts, SideDelts, Triceps]),
    ("Barbell Row", &[UpperBack, Lats, Biceps, RearDelts]),
    ("Lateral Raise", &[SideDelts]),
    ("Bicep Curl", &[Biceps, Forearms]),
    ("Tricep Pushdown", &[Triceps]),
    ("Leg Press", &[Quads, Glutes]),
    ("Romanian Deadlift", &[Hamstrings, Glutes, LowerBack]),
    ("Calf Raise", &[Calves]),
    ("Sit-ups", &[Abs, HipFlexors]),
    ("Hip Thrust", &[Glutes, Hamstrings]),
    ("Dumbbell Fly", &[Chest, FrontDelts]),
    ("Face Pull", &[RearDelts, UpperBack]),
    ("Lunges", &[Quads, Glutes, Hamstrings]),
    ("Dips", &[Chest, Triceps, FrontDelts]),
    ("Chin-ups", &[Lats, Biceps, UpperBack]),
];

/// Muscles trained by an exercise
///
/// Case-insensitive exact match against [`EXERCISE_MUSCLE_MAP`]. Unknown
/// exercises train nothing and return an empty slice.
pub fn muscles_for_exercise(name: &str) -> &'static [MuscleId] {
    let lower = name.to_lowercase();
    EXERCISE_MUSCLE_MAP
        .iter()
        .find(|(exercise, _)| exercise.to_lowercase() == lower)
        .map(|(_, muscles)| *muscles)
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_is_complete_and_ordered() {
        assert_eq!(MuscleId::ALL.len(), 17);
        let unique: HashSet<_> = MuscleId::ALL.iter().collect();
        assert_eq!(unique.len(), 17);

        let mut sorted = MuscleId::ALL;
        sorted.sort();
        assert_eq!(sorted, MuscleId::ALL);
    }

    #[test]
    fn test_id_round_trip_matches_serde() {
        for muscle in MuscleId::ALL {
            assert_eq!(muscle.id().parse::<MuscleId>().unwrap(), muscle);
            assert_eq!(
                serde_json::to_string(&muscle).unwrap(),
                format!("\"{}\"", muscle.id())
            );
        }
        assert!("neck".parse::<MuscleId>().is_err());
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(muscles_for_exercise("bench press"), muscles_for_exercise("Bench Press"));
        assert_eq!(muscles_for_exercise("BENCH PRESS"), &[Chest, Triceps, FrontDelts]);
        assert_eq!(muscles_for_exercise("pull-UPS"), &[Lats, Biceps, UpperBack, Forearms]);
    }

    #[test]
    fn test_unknown_exercise_is_empty() {
        assert!(muscles_for_exercise("nonexistent exercise").is_empty());
        assert!(muscles_for_exercise("").is_empty());
    }

    #[test]
    fn test_no_partial_or_padded_match() {
        assert!(muscles_for_exercise("Bench").is_empty());
        assert!(muscles_for_exercise(" Bench Press").is_empty());
        assert!(muscles_for_exercise("Deadlifts").is_empty());
    }

    #[test]
    fn test_skill_drills_train_nothing() {
        assert!(muscles_for_exercise("Free Throws").is_empty());
        assert!(muscles_for_exercise("jump shot").is_empty());
    }

    #[test]
    fn test_exercise_names_are_unique_ignoring_case() {
        let names: HashSet<String> = EXERCISE_MUSCLE_MAP
            .iter()
            .map(|(name, _)| name.to_lowercase())
            .collect();
        assert_eq!(names.len(), EXERCISE_MUSCLE_MAP.len());
    }
}
