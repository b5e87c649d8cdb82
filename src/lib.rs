// Library interface for fitlab modules
// The CLI and the integration tests both go through this crate

pub mod activity;
pub mod auth;
pub mod config;
pub mod error;
pub mod exercises;
pub mod export;
pub mod heatmap;
pub mod logging;
pub mod models;
pub mod muscles;
pub mod nutrition;
pub mod onboarding;
pub mod programs;
pub mod recipes;
pub mod recovery;
pub mod store;
pub mod tracker;

// Re-export commonly used types for convenience
pub use models::*;
pub use activity::{ActivityEntry, ActivityLog, NewActivityLog};
pub use error::{ErrorSeverity, FitLabError, Result, StoreError};
pub use exercises::{Exercise, ExerciseCategory, NewExercise, ProgressSummary};
pub use heatmap::{all_recovery_colors, Heatmap, HeatmapColor};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use muscles::{muscles_for_exercise, MuscleId};
pub use nutrition::{bmr, target_macros, tdee, Macros};
pub use recovery::{recovery_color, MuscleRecovery, RecoveryMergePolicy};
pub use store::{DocumentStore, MemoryStore, SqliteStore};
pub use tracker::{DailySummary, Tracker};
