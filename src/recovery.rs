//! Muscle recovery clock
//!
//! Tracks when each muscle was last trained and derives a discrete recovery
//! state from the time elapsed since then.
//!
//! # Recovery windows
//!
//! - **< 24h**: sore, freshly worked (red)
//! - **24h to < 48h**: recovering (yellow)
//! - **>= 48h** or never trained: ready (green)
//!
//! Boundaries belong to the cooler bucket: exactly 24h is yellow and exactly
//! 48h is green. A last-trained instant in the future (clock skew) yields a
//! negative elapsed time and is therefore red.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

use crate::heatmap::HeatmapColor;
use crate::muscles::MuscleId;

/// Hours a muscle stays sore after training
pub const SORE_WINDOW_HOURS: i64 = 24;

/// Hours until a trained muscle counts as fully recovered
pub const RECOVERY_WINDOW_HOURS: i64 = 48;

/// How a new workout timestamp combines with an existing entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryMergePolicy {
    /// Last write wins, even when it moves the entry back in time
    #[default]
    Overwrite,
    /// Keep whichever timestamp is later
    KeepLatest,
}

/// Sparse record of when each muscle was last trained
///
/// A muscle absent from the record has never been trained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MuscleRecovery {
    entries: BTreeMap<MuscleId, DateTime<Utc>>,
}

impl MuscleRecovery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last time `muscle` was trained, if ever
    pub fn last_trained(&self, muscle: MuscleId) -> Option<DateTime<Utc>> {
        self.entries.get(&muscle).copied()
    }

    /// Set the last-trained instant for one muscle, replacing any previous entry
    pub fn insert(&mut self, muscle: MuscleId, at: DateTime<Utc>) {
        self.entries.insert(muscle, at);
    }

    /// Mark `muscles` as trained at `at`
    ///
    /// Returns the number of entries that changed.
    pub fn record(&mut self, muscles: &[MuscleId], at: DateTime<Utc>, policy: RecoveryMergePolicy) -> usize {
        let mut changed = 0;
        for &muscle in muscles {
            let keep_existing = match (policy, self.entries.get(&muscle)) {
                (RecoveryMergePolicy::KeepLatest, Some(existing)) => *existing >= at,
                _ => false,
            };
            if keep_existing {
                continue;
            }
            if self.entries.insert(muscle, at) != Some(at) {
                changed += 1;
            }
        }
        changed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in catalog order
    pub fn iter(&self) -> impl Iterator<Item = (MuscleId, DateTime<Utc>)> + '_ {
        self.entries.iter().map(|(m, at)| (*m, *at))
    }

    /// Build from the persisted flat `{muscleId: timestamp}` document
    ///
    /// Unknown muscle ids are skipped. Timestamps that fail to parse are
    /// treated as never trained.
    pub fn from_document(document: &BTreeMap<String, String>) -> Self {
        let mut recovery = Self::new();
        for (key, raw) in document {
            let Ok(muscle) = key.parse::<MuscleId>() else {
                warn!(muscle = %key, "Skipping unknown muscle in recovery document");
                continue;
            };
            match parse_timestamp(raw) {
                Some(at) => recovery.insert(muscle, at),
                None => warn!(muscle = %key, timestamp = %raw, "Unparseable recovery timestamp"),
            }
        }
        recovery
    }

    /// Flat `{muscleId: ISO-8601 timestamp}` document for persistence
    pub fn to_document(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|(muscle, at)| {
                (
                    muscle.id().to_string(),
                    at.to_rfc3339_opts(SecondsFormat::Millis, true),
                )
            })
            .collect()
    }
}

/// Offset-free layouts accepted after RFC 3339, read as UTC
const NAIVE_TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Parse a stored recovery timestamp
///
/// Accepts RFC 3339, then ISO-8601 date-times without an offset (seconds and
/// fractions optional, an optional trailing `Z`) read as UTC, then a bare
/// `YYYY-MM-DD` date at midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }

    let naive = raw.strip_suffix('Z').unwrap_or(raw);
    if let Some(at) = NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(naive, format).ok())
    {
        return Some(at.and_utc());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Hours elapsed since `muscle` was last trained, negative for future entries
pub fn hours_since(muscle: MuscleId, recovery: &MuscleRecovery, now: DateTime<Utc>) -> Option<f64> {
    recovery
        .last_trained(muscle)
        .map(|last| now.signed_duration_since(last).num_milliseconds() as f64 / 3_600_000.0)
}

/// Recovery state of one muscle at `now`
pub fn recovery_color(muscle: MuscleId, recovery: &MuscleRecovery, now: DateTime<Utc>) -> HeatmapColor {
    let Some(last) = recovery.last_trained(muscle) else {
        return HeatmapColor::Green;
    };

    let elapsed = now.signed_duration_since(last);
    if elapsed < Duration::hours(SORE_WINDOW_HOURS) {
        HeatmapColor::Red
    } else if elapsed < Duration::hours(RECOVERY_WINDOW_HOURS) {
        HeatmapColor::Yellow
    } else {
        HeatmapColor::Green
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    fn trained(muscle: MuscleId, at: DateTime<Utc>) -> MuscleRecovery {
        let mut recovery = MuscleRecovery::new();
        recovery.insert(muscle, at);
        recovery
    }

    #[test]
    fn test_never_trained_is_green() {
        let recovery = MuscleRecovery::new();
        for muscle in MuscleId::ALL {
            assert_eq!(recovery_color(muscle, &recovery, now()), HeatmapColor::Green);
        }
    }

    #[test]
    fn test_recovery_buckets() {
        let cases = [
            (Duration::hours(1), HeatmapColor::Red),
            (Duration::hours(30), HeatmapColor::Yellow),
            (Duration::hours(72), HeatmapColor::Green),
        ];
        for (ago, expected) in cases {
            let recovery = trained(MuscleId::Chest, now() - ago);
            assert_eq!(recovery_color(MuscleId::Chest, &recovery, now()), expected);
        }
    }

    #[test]
    fn test_boundaries_fall_into_cooler_bucket() {
        let recovery = trained(MuscleId::Quads, now() - Duration::hours(24));
        assert_eq!(recovery_color(MuscleId::Quads, &recovery, now()), HeatmapColor::Yellow);

        let recovery = trained(MuscleId::Quads, now() - Duration::hours(48));
        assert_eq!(recovery_color(MuscleId::Quads, &recovery, now()), HeatmapColor::Green);

        let just_before = now() - Duration::hours(24) + Duration::milliseconds(1);
        let recovery = trained(MuscleId::Quads, just_before);
        assert_eq!(recovery_color(MuscleId::Quads, &recovery, now()), HeatmapColor::Red);
    }

    #[test]
    fn test_future_timestamp_is_red() {
        let recovery = trained(MuscleId::Lats, now() + Duration::hours(5));
        assert_eq!(recovery_color(MuscleId::Lats, &recovery, now()), HeatmapColor::Red);
        assert!(hours_since(MuscleId::Lats, &recovery, now()).unwrap() < 0.0);
    }

    #[test]
    fn test_other_muscles_unaffected() {
        let recovery = trained(MuscleId::Biceps, now());
        assert_eq!(recovery_color(MuscleId::Biceps, &recovery, now()), HeatmapColor::Red);
        assert_eq!(recovery_color(MuscleId::Triceps, &recovery, now()), HeatmapColor::Green);
    }

    #[test]
    fn test_record_overwrite_policy() {
        let mut recovery = trained(MuscleId::Chest, now());
        let earlier = now() - Duration::hours(10);

        let changed = recovery.record(&[MuscleId::Chest, MuscleId::Triceps], earlier, RecoveryMergePolicy::Overwrite);
        assert_eq!(changed, 2);
        assert_eq!(recovery.last_trained(MuscleId::Chest), Some(earlier));
        assert_eq!(recovery.last_trained(MuscleId::Triceps), Some(earlier));
    }

    #[test]
    fn test_record_keep_latest_policy() {
        let mut recovery = trained(MuscleId::Chest, now());
        let earlier = now() - Duration::hours(10);

        let changed = recovery.record(&[MuscleId::Chest, MuscleId::Triceps], earlier, RecoveryMergePolicy::KeepLatest);
        assert_eq!(changed, 1);
        assert_eq!(recovery.last_trained(MuscleId::Chest), Some(now()));

        let later = now() + Duration::hours(1);
        recovery.record(&[MuscleId::Chest], later, RecoveryMergePolicy::KeepLatest);
        assert_eq!(recovery.last_trained(MuscleId::Chest), Some(later));
    }

    #[test]
    fn test_record_empty_set_is_noop() {
        let mut recovery = MuscleRecovery::new();
        assert_eq!(recovery.record(&[], now(), RecoveryMergePolicy::Overwrite), 0);
        assert!(recovery.is_empty());
    }

    #[test]
    fn test_document_round_trip() {
        let mut recovery = MuscleRecovery::new();
        recovery.insert(MuscleId::Chest, now());
        recovery.insert(MuscleId::HipFlexors, now() - Duration::hours(30));

        let document = recovery.to_document();
        assert_eq!(document["chest"], "2024-03-10T12:00:00.000Z");
        assert_eq!(document.len(), 2);

        assert_eq!(MuscleRecovery::from_document(&document), recovery);
    }

    #[test]
    fn test_lenient_document_parsing() {
        let mut document = BTreeMap::new();
        document.insert("chest".to_string(), "2024-03-10T08:00:00+02:00".to_string());
        document.insert("quads".to_string(), "2024-03-09".to_string());
        document.insert("neck".to_string(), "2024-03-10T08:00:00Z".to_string());
        document.insert("lats".to_string(), "yesterday".to_string());

        let recovery = MuscleRecovery::from_document(&document);
        assert_eq!(recovery.len(), 2);
        assert_eq!(
            recovery.last_trained(MuscleId::Chest),
            Some(Utc.with_ymd_and_hms(2024, 3, 10, 6, 0, 0).unwrap())
        );
        assert_eq!(
            recovery.last_trained(MuscleId::Quads),
            Some(Utc.with_ymd_and_hms(2024, 3, 9, 0, 0, 0).unwrap())
        );
        assert_eq!(recovery_color(MuscleId::Lats, &recovery, now()), HeatmapColor::Green);
    }

    #[test]
    fn test_offset_free_timestamps_read_as_utc() {
        let one_hour_ago = Utc.with_ymd_and_hms(2024, 3, 10, 11, 0, 0).unwrap();
        for raw in [
            "2024-03-10T11:00:00",
            "2024-03-10T11:00",
            "2024-03-10T11:00Z",
            "2024-03-10T11:00:00.000Z",
            "2024-03-10T11:00:00.000",
        ] {
            assert_eq!(parse_timestamp(raw), Some(one_hour_ago), "{raw}");

            let mut document = BTreeMap::new();
            document.insert("chest".to_string(), raw.to_string());
            let recovery = MuscleRecovery::from_document(&document);
            assert_eq!(recovery_color(MuscleId::Chest, &recovery, now()), HeatmapColor::Red, "{raw}");
        }

        assert_eq!(
            parse_timestamp("2024-03-10T11:00:00.250"),
            Some(one_hour_ago + Duration::milliseconds(250))
        );
        assert_eq!(parse_timestamp("2024-03-10T11"), None);
        assert_eq!(parse_timestamp("2024-03-10 11:00:00"), None);
    }

    // Property-based tests using proptest
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_color_matches_elapsed_minutes(minutes_ago in -10_000i64..10_000i64) {
            let recovery = trained(MuscleId::Glutes, now() - Duration::minutes(minutes_ago));
            let color = recovery_color(MuscleId::Glutes, &recovery, now());

            let expected = if minutes_ago < 24 * 60 {
                HeatmapColor::Red
            } else if minutes_ago < 48 * 60 {
                HeatmapColor::Yellow
            } else {
                HeatmapColor::Green
            };
            prop_assert_eq!(color, expected);
        }

        #[test]
        fn test_color_is_deterministic(minutes_ago in 0i64..5_000i64) {
            let recovery = trained(MuscleId::Abs, now() - Duration::minutes(minutes_ago));
            prop_assert_eq!(
                recovery_color(MuscleId::Abs, &recovery, now()),
                recovery_color(MuscleId::Abs, &recovery, now())
            );
        }

        #[test]
        fn test_keep_latest_never_moves_backwards(first in 0i64..1_000i64, second in 0i64..1_000i64) {
            let mut recovery = MuscleRecovery::new();
            let a = now() - Duration::minutes(first);
            let b = now() - Duration::minutes(second);
            recovery.record(&[MuscleId::Calves], a, RecoveryMergePolicy::KeepLatest);
            recovery.record(&[MuscleId::Calves], b, RecoveryMergePolicy::KeepLatest);
            prop_assert_eq!(recovery.last_trained(MuscleId::Calves), Some(a.max(b)));
        }
    }
}
