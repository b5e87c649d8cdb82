//! Workout program templates and level-based selection

use serde::Serialize;
use std::fmt;

use crate::models::ActivityLevel;

/// Experience level a template is written for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgramLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl fmt::Display for ProgramLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramLevel::Beginner => write!(f, "beginner"),
            ProgramLevel::Intermediate => write!(f, "intermediate"),
            ProgramLevel::Advanced => write!(f, "advanced"),
        }
    }
}

/// One prescribed exercise within a training day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramExercise {
    pub exercise_name: &'static str,
    pub sets: u8,
    /// Rep range or hold time, e.g. "8-10" or "30s"
    pub reps: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramDay {
    pub day_name: &'static str,
    pub exercises: &'static [ProgramExercise],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub level: ProgramLevel,
    pub description: &'static str,
    pub days: &'static [ProgramDay],
}

impl ProgramTemplate {
    /// Total sets prescribed across all days
    pub fn total_sets(&self) -> u32 {
        self.days
            .iter()
            .flat_map(|day| day.exercises.iter())
            .map(|exercise| u32::from(exercise.sets))
            .sum()
    }
}

const fn ex(exercise_name: &'static str, sets: u8, reps: &'static str) -> ProgramExercise {
    ProgramExercise {
        exercise_name,
        sets,
        reps,
    }
}

/// Fixed template catalog: beginner, intermediate, advanced
pub static PROGRAM_TEMPLATES: [ProgramTemplate; 3] = [
    ProgramTemplate {
        id: "beginner_fullbody",
        name: "Beginner Full Body",
        level: ProgramLevel::Beginner,
        description: "3 days/week full body routine for new lifters.",
        days: &[
            ProgramDay {
                day_name: "Day A",
                exercises: &[
                    ex("Squat", 3, "8-10"),
                    ex("Bench Press", 3, "8-10"),
                    ex("Pull-ups", 3, "5-8"),
                    ex("Plank", 3, "30s"),
                ],
            },
            ProgramDay {
                day_name: "Day B",
                exercises: &[
                    ex("Deadlift", 3, "5-8"),
                    ex("Overhead Press", 3, "8-10"),
                    ex("Barbell Row", 3, "8-10"),
                    ex("Plank", 3, "30s"),
                ],
            },
            ProgramDay {
                day_name: "Day C",
                exercises: &[
                    ex("Lunges", 3, "10-12"),
                    ex("Push-ups", 3, "10-15"),
                    ex("Chin-ups", 3, "5-8"),
                    ex("Sit-ups", 3, "15-20"),
                ],
            },
        ],
    },
    ProgramTemplate {
        id: "intermediate_upper_lower",
        name: "Intermediate Upper/Lower",
        level: ProgramLevel::Intermediate,
        description: "4 days/week upper/lower split for consistent lifters.",
        days: &[
            ProgramDay {
                day_name: "Upper A",
                exercises: &[
                    ex("Bench Press", 4, "6-8"),
                    ex("Barbell Row", 4, "6-8"),
                    ex("Overhead Press", 3, "8-10"),
                    ex("Bicep Curl", 3, "10-12"),
                    ex("Tricep Pushdown", 3, "10-12"),
                ],
            },
            ProgramDay {
                day_name: "Lower A",
                exercises: &[
                    ex("Squat", 4, "6-8"),
                    ex("Romanian Deadlift", 3, "8-10"),
                    ex("Leg Press", 3, "10-12"),
                    ex("Calf Raise", 4, "12-15"),
                    ex("Plank", 3, "45s"),
                ],
            },
            ProgramDay {
                day_name: "Upper B",
                exercises: &[
                    ex("Pull-ups", 4, "6-8"),
                    ex("Dumbbell Fly", 3, "10-12"),
                    ex("Lateral Raise", 3, "12-15"),
                    ex("Face Pull", 3, "12-15"),
                    ex("Dips", 3, "8-10"),
                ],
            },
            ProgramDay {
                day_name: "Lower B",
                exercises: &[
                    ex("Deadlift", 4, "5-6"),
                    ex("Lunges", 3, "10-12"),
                    ex("Hip Thrust", 3, "10-12"),
                    ex("Calf Raise", 4, "12-15"),
                    ex("Sit-ups", 3, "15-20"),
                ],
            },
        ],
    },
    ProgramTemplate {
        id: "advanced_ppl",
        name: "Advanced Push/Pull/Legs",
        level: ProgramLevel::Advanced,
        description: "6 days/week PPL split for experienced lifters.",
        days: &[
            ProgramDay {
                day_name: "Push",
                exercises: &[
                    ex("Bench Press", 4, "5-6"),
                    ex("Overhead Press", 4, "6-8"),
                    ex("Dumbbell Fly", 3, "10-12"),
                    ex("Lateral Raise", 4, "12-15"),
                    ex("Tricep Pushdown", 3, "10-12"),
                    ex("Dips", 3, "8-10"),
                ],
            },
            ProgramDay {
                day_name: "Pull",
                exercises: &[
                    ex("Deadlift", 4, "5-6"),
                    ex("Pull-ups", 4, "6-8"),
                    ex("Barbell Row", 4, "6-8"),
                    ex("Face Pull", 3, "12-15"),
                    ex("Bicep Curl", 3, "10-12"),
                ],
            },
            ProgramDay {
                day_name: "Legs",
                exercises: &[
                    ex("Squat", 4, "5-6"),
                    ex("Romanian Deadlift", 4, "8-10"),
                    ex("Leg Press", 3, "10-12"),
                    ex("Hip Thrust", 3, "10-12"),
                    ex("Calf Raise", 4, "12-15"),
                    ex("Plank", 3, "60s"),
                ],
            },
        ],
    },
];

/// Template assigned to an activity level
pub fn program_for_level(activity_level: ActivityLevel) -> &'static ProgramTemplate {
    match activity_level {
        ActivityLevel::Sedentary | ActivityLevel::LightlyActive => &PROGRAM_TEMPLATES[0],
        ActivityLevel::ModeratelyActive => &PROGRAM_TEMPLATES[1],
        ActivityLevel::VeryActive | ActivityLevel::ExtremelyActive => &PROGRAM_TEMPLATES[2],
    }
}

/// Resolve a persisted `program_id`
pub fn program_by_id(id: &str) -> Option<&'static ProgramTemplate> {
    PROGRAM_TEMPLATES.iter().find(|template| template.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::muscles::muscles_for_exercise;

    #[test]
    fn test_level_partition() {
        let expected = [
            (ActivityLevel::Sedentary, "beginner_fullbody"),
            (ActivityLevel::LightlyActive, "beginner_fullbody"),
            (ActivityLevel::ModeratelyActive, "intermediate_upper_lower"),
            (ActivityLevel::VeryActive, "advanced_ppl"),
            (ActivityLevel::ExtremelyActive, "advanced_ppl"),
        ];
        for (level, id) in expected {
            assert_eq!(program_for_level(level).id, id);
        }
    }

    #[test]
    fn test_every_template_is_reachable() {
        for template in &PROGRAM_TEMPLATES {
            assert!(ActivityLevel::ALL
                .iter()
                .any(|level| program_for_level(*level).id == template.id));
        }
    }

    #[test]
    fn test_template_shapes() {
        assert_eq!(PROGRAM_TEMPLATES[0].days.len(), 3);
        assert_eq!(PROGRAM_TEMPLATES[1].days.len(), 4);
        assert_eq!(PROGRAM_TEMPLATES[2].days.len(), 3);
        assert_eq!(PROGRAM_TEMPLATES[0].level, ProgramLevel::Beginner);
        assert_eq!(PROGRAM_TEMPLATES[0].total_sets(), 36);
    }

    #[test]
    fn test_program_exercises_train_muscles() {
        for template in &PROGRAM_TEMPLATES {
            for day in template.days {
                for exercise in day.exercises {
                    assert!(
                        !muscles_for_exercise(exercise.exercise_name).is_empty(),
                        "{} has no muscle mapping",
                        exercise.exercise_name
                    );
                }
            }
        }
    }

    #[test]
    fn test_program_by_id() {
        assert_eq!(program_by_id("advanced_ppl").map(|t| t.level), Some(ProgramLevel::Advanced));
        assert!(program_by_id("couch_to_5k").is_none());
    }
}
