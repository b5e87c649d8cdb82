//! User-scoped tracking service
//!
//! Ties activity logs, muscle recovery, onboarding and the nutrition
//! dashboard to a [`DocumentStore`]. Every operation is keyed by user id.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::activity::{ActivityLog, NewActivityLog};
use crate::error::{FitLabError, Result};
use crate::exercises::{performance_series, system_exercises, Exercise, NewExercise, PerformancePoint, ProgressSummary};
use crate::heatmap::{all_recovery_colors, Heatmap};
use crate::models::{MacrosTarget, UserProfile};
use crate::muscles::{muscles_for_exercise, MuscleId};
use crate::nutrition::{round_half_up, sum_estimated_macros, Macros};
use crate::onboarding::{build_profile, OnboardingForm};
use crate::programs::{program_by_id, program_for_level, ProgramTemplate};
use crate::recipes::{recipes_for_goal, Recipe};
use crate::recovery::{MuscleRecovery, RecoveryMergePolicy};
use crate::store::{paths, DocumentStore};

/// Nutrition dashboard for one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub consumed: Macros,
    /// Absent until onboarding is complete
    pub target: Option<MacrosTarget>,
    /// `daily_calories - consumed.calories`, negative when over budget
    pub remaining_calories: Option<i32>,
    pub food_logs: usize,
}

/// Tracking service over a document store
pub struct Tracker<S: DocumentStore> {
    store: S,
    merge_policy: RecoveryMergePolicy,
}

fn check_uid(uid: &str) -> Result<()> {
    if uid.is_empty() || uid.contains('/') {
        return Err(FitLabError::validation("uid", format!("'{}' is not a valid user id", uid)));
    }
    Ok(())
}

fn recovery_from_value(value: &Value) -> MuscleRecovery {
    let document: BTreeMap<String, String> = match value.as_object() {
        Some(map) => map
            .iter()
            .filter_map(|(key, raw)| match raw.as_str() {
                Some(raw) => Some((key.clone(), raw.to_string())),
                None => {
                    warn!(muscle = %key, "Ignoring non-string recovery timestamp");
                    None
                }
            })
            .collect(),
        None => {
            warn!("Recovery document is not an object");
            BTreeMap::new()
        }
    };
    MuscleRecovery::from_document(&document)
}

impl<S: DocumentStore> Tracker<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            merge_policy: RecoveryMergePolicy::default(),
        }
    }

    pub fn with_merge_policy(mut self, merge_policy: RecoveryMergePolicy) -> Self {
        self.merge_policy = merge_policy;
        self
    }

    pub fn merge_policy(&self) -> RecoveryMergePolicy {
        self.merge_policy
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mark the muscles a new log trained, then persist the log
    ///
    /// A failed recovery merge leaves no stored log.
    #[instrument(skip_all, fields(user_id = %uid, kind = log.entry.kind()))]
    pub fn create_log(&self, uid: &str, log: NewActivityLog, now: DateTime<Utc>) -> Result<ActivityLog> {
        check_uid(uid)?;
        log.validate()?;

        let stored = ActivityLog::from_new(Uuid::new_v4().to_string(), log, now);

        let muscles = stored
            .entry
            .trained_exercise()
            .map(muscles_for_exercise)
            .unwrap_or(&[]);
        if muscles.is_empty() {
            debug!(log_id = %stored.id, "No muscles trained, recovery unchanged");
        } else {
            self.mark_trained(uid, muscles, now)?;
        }

        self.store
            .set(&paths::log(uid, &stored.id), &serde_json::to_value(&stored)?)?;
        info!(log_id = %stored.id, date = %stored.date, "Activity log created");

        Ok(stored)
    }

    fn mark_trained(&self, uid: &str, muscles: &[MuscleId], at: DateTime<Utc>) -> Result<()> {
        let mut recovery = self.muscle_recovery(uid)?;
        let changed = recovery.record(muscles, at, self.merge_policy);
        if changed == 0 {
            debug!(?muscles, "Recovery entries already current");
            return Ok(());
        }

        let document = recovery.to_document();
        let patch: Map<String, Value> = muscles
            .iter()
            .filter_map(|muscle| {
                document
                    .get(muscle.id())
                    .map(|at| (muscle.id().to_string(), Value::String(at.clone())))
            })
            .collect();
        self.store
            .merge(&paths::muscle_recovery(uid), &Value::Object(patch))?;

        info!(?muscles, changed, "Muscle recovery updated");
        Ok(())
    }

    /// Remove a log; recovery timestamps stay as they are
    #[instrument(skip_all, fields(user_id = %uid, log_id = %log_id))]
    pub fn delete_log(&self, uid: &str, log_id: &str) -> Result<()> {
        check_uid(uid)?;
        if log_id.is_empty() || log_id.contains('/') {
            return Err(FitLabError::NotFound(format!("log '{}'", log_id)));
        }
        if !self.store.delete(&paths::log(uid, log_id))? {
            return Err(FitLabError::NotFound(format!("log '{}'", log_id)));
        }
        info!("Activity log deleted");
        Ok(())
    }

    /// Every readable log of a user, oldest first
    pub fn all_logs(&self, uid: &str) -> Result<Vec<ActivityLog>> {
        check_uid(uid)?;
        let mut logs: Vec<ActivityLog> = self
            .store
            .list(&paths::logs(uid))?
            .into_iter()
            .filter_map(|(id, value)| match serde_json::from_value::<ActivityLog>(value) {
                Ok(log) => Some(log),
                Err(e) => {
                    warn!(log_id = %id, error = %e, "Skipping unreadable log");
                    None
                }
            })
            .collect();
        logs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(logs)
    }

    /// Logs of one calendar day, oldest first
    #[instrument(skip_all, fields(user_id = %uid, date = %date))]
    pub fn logs_for_date(&self, uid: &str, date: NaiveDate) -> Result<Vec<ActivityLog>> {
        let mut logs = self.all_logs(uid)?;
        logs.retain(|log| log.date == date);
        debug!(count = logs.len(), "Loaded logs");
        Ok(logs)
    }

    /// Store a custom exercise owned by `uid`
    #[instrument(skip_all, fields(user_id = %uid))]
    pub fn create_exercise(&self, uid: &str, exercise: NewExercise) -> Result<Exercise> {
        check_uid(uid)?;
        exercise.validate()?;

        let exercise = exercise.into_exercise(Uuid::new_v4().to_string(), uid);
        self.store
            .set(&paths::exercise(uid, &exercise.id), &serde_json::to_value(&exercise)?)?;
        info!(exercise_id = %exercise.id, name = %exercise.name, "Custom exercise created");
        Ok(exercise)
    }

    /// System exercises followed by the user's own, each group in its stored order
    #[instrument(skip_all, fields(user_id = %uid))]
    pub fn list_exercises(&self, uid: &str) -> Result<Vec<Exercise>> {
        check_uid(uid)?;
        let mut exercises = system_exercises();
        exercises.extend(
            self.store
                .list(&paths::exercises(uid))?
                .into_iter()
                .filter_map(|(id, value)| match serde_json::from_value::<Exercise>(value) {
                    Ok(exercise) if exercise.owner_id == uid => Some(exercise),
                    Ok(exercise) => {
                        warn!(exercise_id = %id, owner = %exercise.owner_id, "Skipping exercise owned by another user");
                        None
                    }
                    Err(e) => {
                        warn!(exercise_id = %id, error = %e, "Skipping unreadable exercise");
                        None
                    }
                }),
        );
        debug!(count = exercises.len(), "Listed exercises");
        Ok(exercises)
    }

    /// Activity calendar and totals, optionally limited to `from..=to`
    pub fn progress(&self, uid: &str, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<ProgressSummary> {
        let mut logs = self.all_logs(uid)?;
        logs.retain(|log| from.map_or(true, |from| log.date >= from) && to.map_or(true, |to| log.date <= to));
        Ok(ProgressSummary::from_logs(&logs))
    }

    /// Volume and drill success of one exercise across all logged days
    pub fn performance(&self, uid: &str, exercise: &str) -> Result<Vec<PerformancePoint>> {
        Ok(performance_series(&self.all_logs(uid)?, exercise))
    }

    pub fn muscle_recovery(&self, uid: &str) -> Result<MuscleRecovery> {
        check_uid(uid)?;
        Ok(self
            .store
            .get(&paths::muscle_recovery(uid))?
            .map(|value| recovery_from_value(&value))
            .unwrap_or_default())
    }

    /// Recovery colour of every catalog muscle at `now`
    #[instrument(skip_all, fields(user_id = %uid))]
    pub fn heatmap(&self, uid: &str, now: DateTime<Utc>) -> Result<Heatmap> {
        let recovery = self.muscle_recovery(uid)?;
        let heatmap = all_recovery_colors(&recovery, &MuscleId::ALL, now);
        let counts = heatmap.counts();
        debug!(red = counts.red, yellow = counts.yellow, green = counts.green, "Heatmap projected");
        Ok(heatmap)
    }

    /// Validate the form and store the resulting profile, replacing any previous one
    #[instrument(skip_all, fields(user_id = %uid))]
    pub fn complete_onboarding(&self, uid: &str, form: &OnboardingForm, today: NaiveDate) -> Result<UserProfile> {
        check_uid(uid)?;
        let profile = build_profile(form, today)?;
        self.store
            .set(&paths::profile(uid), &serde_json::to_value(&profile)?)?;
        info!(program = %profile.program_id, daily_calories = profile.macros_target.daily_calories, "Onboarding complete");
        Ok(profile)
    }

    pub fn profile(&self, uid: &str) -> Result<Option<UserProfile>> {
        check_uid(uid)?;
        self.store
            .get(&paths::profile(uid))?
            .map(|value| serde_json::from_value(value).map_err(FitLabError::from))
            .transpose()
    }

    fn require_profile(&self, uid: &str) -> Result<UserProfile> {
        self.profile(uid)?
            .ok_or_else(|| FitLabError::NotFound(format!("profile for user '{}'", uid)))
    }

    /// Program template assigned at onboarding
    pub fn program(&self, uid: &str) -> Result<&'static ProgramTemplate> {
        let profile = self.require_profile(uid)?;
        Ok(program_by_id(&profile.program_id).unwrap_or_else(|| {
            warn!(program = %profile.program_id, "Unknown program id, selecting by activity level");
            program_for_level(profile.activity_level)
        }))
    }

    /// Recipes for the profile's goal
    pub fn recommended_recipes(&self, uid: &str) -> Result<Vec<&'static Recipe>> {
        let profile = self.require_profile(uid)?;
        Ok(recipes_for_goal(profile.goal))
    }

    /// Estimated intake against the daily target
    #[instrument(skip_all, fields(user_id = %uid, date = %date))]
    pub fn daily_summary(&self, uid: &str, date: NaiveDate) -> Result<DailySummary> {
        let weights: Vec<_> = self
            .logs_for_date(uid, date)?
            .iter()
            .filter_map(|log| log.entry.food_weight())
            .collect();
        let consumed = sum_estimated_macros(&weights);
        let target = self.profile(uid)?.map(|profile| profile.macros_target);
        let remaining_calories =
            target.map(|target| target.daily_calories - round_half_up(consumed.calories));

        Ok(DailySummary {
            date,
            consumed,
            target,
            remaining_calories,
            food_logs: weights.len(),
        })
    }

    /// Erase all of a user's documents
    #[instrument(skip_all, fields(user_id = %uid))]
    pub fn delete_user(&self, uid: &str) -> Result<usize> {
        check_uid(uid)?;
        let removed = self.store.delete_prefix(&paths::user_prefix(uid))?;
        info!(removed, "User data deleted");
        Ok(removed)
    }
}
