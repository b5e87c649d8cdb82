use chrono::{DateTime, Duration, NaiveDate, Utc};
use fitlab::{activity, export, onboarding, store};
use rust_decimal_macros::dec;

/// Integration tests that drive the tracker end to end

#[cfg(test)]
mod integration_tests {
    use super::*;
    use activity::{ActivityEntry, FoodPayload, MealType, NewActivityLog, StrengthPayload, StrengthSet};
    use fitlab::{ActivityLevel, DocumentStore, Goal, HeatmapColor, MuscleId, RecoveryMergePolicy, Sex, Tracker};
    use onboarding::OnboardingForm;
    use store::{paths, MemoryStore, SqliteStore};

    fn at(raw: &str) -> DateTime<Utc> {
        raw.parse().unwrap()
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()
    }

    fn strength(date: NaiveDate, name: &str) -> NewActivityLog {
        NewActivityLog::new(
            date,
            ActivityEntry::Strength(StrengthPayload {
                exercise_id: name.to_lowercase().replace(' ', "_"),
                exercise_name: name.to_string(),
                sets: vec![
                    StrengthSet { weight: dec!(100), reps: 5 },
                    StrengthSet { weight: dec!(100), reps: 5 },
                ],
            }),
        )
    }

    fn meal(date: NaiveDate, meal_type: MealType, weight: rust_decimal::Decimal) -> NewActivityLog {
        NewActivityLog::new(
            date,
            ActivityEntry::Food(FoodPayload {
                meal_type,
                food_name: "Chicken and rice".to_string(),
                weight,
            }),
        )
    }

    fn onboarding_form() -> OnboardingForm {
        OnboardingForm {
            sex: Sex::Male,
            dob: "1994-01-15".to_string(),
            height_cm: dec!(180),
            weight_kg: dec!(80),
            activity_level: ActivityLevel::ModeratelyActive,
            goal: Goal::Bulk,
        }
    }

    fn training_week<S: DocumentStore>(tracker: &Tracker<S>) {
        let profile = tracker
            .complete_onboarding("athlete", &onboarding_form(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
            .unwrap();
        // 800 + 1125 - 150 + 5 = 1780; 1780 * 1.55 = 2759; bulk +300
        assert_eq!(profile.bmr, 1780);
        assert_eq!(profile.tdee, 2759);
        assert_eq!(profile.macros_target.daily_calories, 3059);
        assert_eq!(profile.program_id, "intermediate_upper_lower");

        tracker.create_log("athlete", strength(monday(), "Squat"), at("2024-03-11T07:00:00Z")).unwrap();
        tracker.create_log("athlete", meal(monday(), MealType::Breakfast, dec!(300)), at("2024-03-11T08:00:00Z")).unwrap();
        tracker.create_log("athlete", meal(monday(), MealType::Dinner, dec!(500)), at("2024-03-11T19:00:00Z")).unwrap();

        let tuesday = monday().succ_opt().unwrap();
        tracker.create_log("athlete", strength(tuesday, "Bench Press"), at("2024-03-12T07:00:00Z")).unwrap();

        // Wednesday morning: bench 24h ago, squat 48h ago
        let heatmap = tracker.heatmap("athlete", at("2024-03-13T07:00:00Z")).unwrap();
        assert_eq!(heatmap.color(MuscleId::Chest), Some(HeatmapColor::Yellow));
        assert_eq!(heatmap.color(MuscleId::Quads), Some(HeatmapColor::Green));
        assert_eq!(heatmap.color(MuscleId::Calves), Some(HeatmapColor::Green));

        let heatmap = tracker.heatmap("athlete", at("2024-03-12T08:00:00Z")).unwrap();
        assert_eq!(heatmap.color(MuscleId::Chest), Some(HeatmapColor::Red));
        assert_eq!(heatmap.color(MuscleId::Quads), Some(HeatmapColor::Yellow));
        assert_eq!(heatmap.sore_muscles(), vec![MuscleId::Chest, MuscleId::FrontDelts, MuscleId::Triceps]);

        let summary = tracker.daily_summary("athlete", monday()).unwrap();
        assert_eq!(summary.food_logs, 2);
        assert_eq!(summary.consumed.calories, dec!(800));
        assert_eq!(summary.consumed.protein_g, 45 + 75);
        assert_eq!(summary.consumed.carbs_g, 150 + 250);
        assert_eq!(summary.consumed.fat_g, 15 + 25);
        assert_eq!(summary.remaining_calories, Some(3059 - 800));

        assert_eq!(tracker.program("athlete").unwrap().id, "intermediate_upper_lower");
        let recipes: Vec<_> = tracker.recommended_recipes("athlete").unwrap().iter().map(|r| r.id).collect();
        assert_eq!(recipes, vec!["b2", "b4", "l2"]);

        assert_eq!(tracker.logs_for_date("athlete", monday()).unwrap().len(), 3);
        assert_eq!(tracker.logs_for_date("athlete", tuesday).unwrap().len(), 1);
    }

    #[test]
    fn test_training_week_in_memory() {
        training_week(&Tracker::new(MemoryStore::new()));
    }

    #[test]
    fn test_training_week_on_sqlite() {
        let temp_dir = tempfile::tempdir().unwrap();
        let tracker = Tracker::new(SqliteStore::open(temp_dir.path().join("fitlab.db")).unwrap());
        training_week(&tracker);
    }

    #[test]
    fn test_state_survives_reopen() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("fitlab.db");
        let trained_at = at("2024-03-11T07:00:00Z");

        let log_id = {
            let tracker = Tracker::new(SqliteStore::open(&db_path).unwrap());
            tracker.create_log("u1", strength(monday(), "Deadlift"), trained_at).unwrap().id
        };

        let tracker = Tracker::new(SqliteStore::open(&db_path).unwrap());
        let logs = tracker.logs_for_date("u1", monday()).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].id, log_id);
        assert_eq!(
            tracker.muscle_recovery("u1").unwrap().last_trained(MuscleId::Hamstrings),
            Some(trained_at)
        );
    }

    #[test]
    fn test_recovery_document_shape() {
        let tracker = Tracker::new(MemoryStore::new());
        tracker.create_log("u1", strength(monday(), "Calf Raise"), at("2024-03-11T07:00:00.250Z")).unwrap();

        let document = tracker.store().get(&paths::muscle_recovery("u1")).unwrap().unwrap();
        assert_eq!(document, serde_json::json!({"calves": "2024-03-11T07:00:00.250Z"}));
    }

    #[test]
    fn test_legacy_recovery_document_is_tolerated() {
        let tracker = Tracker::new(MemoryStore::new());
        tracker
            .store()
            .set(
                &paths::muscle_recovery("u1"),
                &serde_json::json!({
                    "chest": "2024-03-11",
                    "wings": "2024-03-11T07:00:00Z",
                    "quads": "yesterday",
                    "lats": 12,
                    "hamstrings": "2024-03-11T11:00:00",
                    "calves": "2024-03-10T11:00Z"
                }),
            )
            .unwrap();

        let heatmap = tracker.heatmap("u1", at("2024-03-11T12:00:00Z")).unwrap();
        assert_eq!(heatmap.len(), MuscleId::ALL.len());
        assert_eq!(heatmap.color(MuscleId::Chest), Some(HeatmapColor::Red));
        assert_eq!(heatmap.color(MuscleId::Quads), Some(HeatmapColor::Green));
        assert_eq!(heatmap.color(MuscleId::Lats), Some(HeatmapColor::Green));
        assert_eq!(heatmap.color(MuscleId::Hamstrings), Some(HeatmapColor::Red));
        assert_eq!(heatmap.color(MuscleId::Calves), Some(HeatmapColor::Yellow));

        // New training merges into the existing document
        tracker.create_log("u1", strength(monday(), "Squat"), at("2024-03-11T12:00:00Z")).unwrap();
        let document = tracker.store().get(&paths::muscle_recovery("u1")).unwrap().unwrap();
        assert_eq!(document["chest"], "2024-03-11");
        assert_eq!(document["quads"], "2024-03-11T12:00:00.000Z");
    }

    #[test]
    fn test_custom_exercises_survive_reopen() {
        use fitlab::exercises::{ActivityDayKind, ExerciseCategory, NewExercise};

        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("fitlab.db");
        {
            let tracker = Tracker::new(SqliteStore::open(&db_path).unwrap());
            tracker
                .create_exercise(
                    "u1",
                    NewExercise {
                        name: "Farmer Carry".to_string(),
                        category: ExerciseCategory::Strength,
                        muscle_group: None,
                    },
                )
                .unwrap();
            tracker.create_log("u1", strength(monday(), "Farmer Carry"), at("2024-03-11T07:00:00Z")).unwrap();
        }

        let tracker = Tracker::new(SqliteStore::open(&db_path).unwrap());
        let library = tracker.list_exercises("u1").unwrap();
        assert_eq!(library.last().map(|e| e.name.as_str()), Some("Farmer Carry"));
        assert!(tracker.list_exercises("u2").unwrap().iter().all(|e| e.is_system()));

        let progress = tracker.progress("u1", Some(monday()), None).unwrap();
        assert_eq!(progress.days.get(&monday()), Some(&ActivityDayKind::WorkoutOnly));
        assert_eq!(tracker.performance("u1", "Farmer Carry").unwrap()[0].volume, dec!(1000));

        // delete_user removes the custom library too
        assert_eq!(tracker.delete_user("u1").unwrap(), 2);
        assert_eq!(tracker.list_exercises("u1").unwrap().len(), library.len() - 1);
    }

    #[test]
    fn test_keep_latest_on_sqlite() {
        let tracker = Tracker::new(SqliteStore::in_memory().unwrap())
            .with_merge_policy(RecoveryMergePolicy::KeepLatest);
        let later = at("2024-03-11T07:00:00Z");

        tracker.create_log("u1", strength(monday(), "Plank"), later).unwrap();
        tracker.create_log("u1", strength(monday(), "Plank"), later - Duration::days(3)).unwrap();

        assert_eq!(tracker.muscle_recovery("u1").unwrap().last_trained(MuscleId::Abs), Some(later));
    }

    #[test]
    fn test_delete_user_then_export() {
        let tracker = Tracker::new(SqliteStore::in_memory().unwrap());
        let now = at("2024-03-11T07:00:00Z");
        tracker.create_log("u1", strength(monday(), "Pull-ups"), now).unwrap();
        tracker
            .complete_onboarding("u1", &onboarding_form(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
            .unwrap();

        let mut csv = Vec::new();
        export::heatmap_to_csv(&tracker.heatmap("u1", now).unwrap(), &mut csv).unwrap();
        let csv = String::from_utf8(csv).unwrap();
        assert!(csv.contains("lats,Lats,red,#ef4444"));

        assert_eq!(tracker.delete_user("u1").unwrap(), 3);
        assert!(tracker.profile("u1").unwrap().is_none());

        let heatmap = tracker.heatmap("u1", now).unwrap();
        assert_eq!(heatmap.counts().green, MuscleId::ALL.len());
    }
}
