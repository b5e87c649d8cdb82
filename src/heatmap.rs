//! Body heatmap projection
//!
//! Projects the recovery clock across the whole muscle catalog into a
//! renderable colour table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::muscles::MuscleId;
use crate::recovery::{recovery_color, MuscleRecovery};

/// Recovery colour of a muscle region, derived and never stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeatmapColor {
    /// Trained within the last 24 hours
    Red,
    /// Trained 24 to 48 hours ago
    Yellow,
    /// Trained 48+ hours ago, or never
    Green,
}

impl HeatmapColor {
    /// Render colour
    pub fn hex(&self) -> &'static str {
        match self {
            HeatmapColor::Red => "#ef4444",
            HeatmapColor::Yellow => "#eab308",
            HeatmapColor::Green => "#22c55e",
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            HeatmapColor::Red => "sore",
            HeatmapColor::Yellow => "recovering",
            HeatmapColor::Green => "ready",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HeatmapColor::Red => "red",
            HeatmapColor::Yellow => "yellow",
            HeatmapColor::Green => "green",
        }
    }
}

impl fmt::Display for HeatmapColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of muscles in each recovery state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ColorCounts {
    pub red: usize,
    pub yellow: usize,
    pub green: usize,
}

/// Colour table over a muscle catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Heatmap {
    colors: BTreeMap<MuscleId, HeatmapColor>,
}

impl Heatmap {
    /// Colour of `muscle`, `None` if it is not part of the projected catalog
    pub fn color(&self, muscle: MuscleId) -> Option<HeatmapColor> {
        self.colors.get(&muscle).copied()
    }

    /// Entries in catalog order
    pub fn iter(&self) -> impl Iterator<Item = (MuscleId, HeatmapColor)> + '_ {
        self.colors.iter().map(|(m, c)| (*m, *c))
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn counts(&self) -> ColorCounts {
        self.colors
            .values()
            .fold(ColorCounts::default(), |mut counts, color| {
                match color {
                    HeatmapColor::Red => counts.red += 1,
                    HeatmapColor::Yellow => counts.yellow += 1,
                    HeatmapColor::Green => counts.green += 1,
                }
                counts
            })
    }

    /// Muscles still sore from recent training
    pub fn sore_muscles(&self) -> Vec<MuscleId> {
        self.iter()
            .filter(|(_, color)| *color == HeatmapColor::Red)
            .map(|(muscle, _)| muscle)
            .collect()
    }
}

/// Project recovery states over `catalog`
///
/// Every catalog id gets exactly one entry; untrained muscles are green.
pub fn all_recovery_colors(recovery: &MuscleRecovery, catalog: &[MuscleId], now: DateTime<Utc>) -> Heatmap {
    let colors = catalog
        .iter()
        .map(|&muscle| (muscle, recovery_color(muscle, recovery, now)))
        .collect();
    Heatmap { colors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_recovery_is_all_green() {
        let heatmap = all_recovery_colors(&MuscleRecovery::new(), &MuscleId::ALL, now());
        assert_eq!(heatmap.len(), MuscleId::ALL.len());
        assert!(heatmap.iter().all(|(_, color)| color == HeatmapColor::Green));
        assert_eq!(heatmap.counts(), ColorCounts { red: 0, yellow: 0, green: 17 });
    }

    #[test]
    fn test_mixed_recovery() {
        let mut recovery = MuscleRecovery::new();
        recovery.insert(MuscleId::Chest, now() - Duration::hours(2));
        recovery.insert(MuscleId::Triceps, now() - Duration::hours(2));
        recovery.insert(MuscleId::Quads, now() - Duration::hours(36));
        recovery.insert(MuscleId::Calves, now() - Duration::days(5));

        let heatmap = all_recovery_colors(&recovery, &MuscleId::ALL, now());
        assert_eq!(heatmap.color(MuscleId::Chest), Some(HeatmapColor::Red));
        assert_eq!(heatmap.color(MuscleId::Quads), Some(HeatmapColor::Yellow));
        assert_eq!(heatmap.color(MuscleId::Calves), Some(HeatmapColor::Green));
        assert_eq!(heatmap.counts(), ColorCounts { red: 2, yellow: 1, green: 14 });
        assert_eq!(heatmap.sore_muscles(), vec![MuscleId::Chest, MuscleId::Triceps]);
    }

    #[test]
    fn test_projection_is_limited_to_catalog() {
        let mut recovery = MuscleRecovery::new();
        recovery.insert(MuscleId::Lats, now());

        let catalog = [MuscleId::Chest, MuscleId::Abs];
        let heatmap = all_recovery_colors(&recovery, &catalog, now());
        assert_eq!(heatmap.len(), 2);
        assert_eq!(heatmap.color(MuscleId::Lats), None);
    }

    #[test]
    fn test_serializes_as_flat_color_map() {
        let mut recovery = MuscleRecovery::new();
        recovery.insert(MuscleId::FrontDelts, now());
        let heatmap = all_recovery_colors(&recovery, &[MuscleId::FrontDelts, MuscleId::Glutes], now());

        let value = serde_json::to_value(&heatmap).unwrap();
        assert_eq!(value, serde_json::json!({"front_delts": "red", "glutes": "green"}));
    }

    #[test]
    fn test_color_presentation() {
        assert_eq!(HeatmapColor::Red.hex(), "#ef4444");
        assert_eq!(HeatmapColor::Yellow.status(), "recovering");
        assert_eq!(HeatmapColor::Green.to_string(), "green");
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_one_entry_per_catalog_id(hours in proptest::collection::vec(-100i64..200i64, 0..17)) {
            let mut recovery = MuscleRecovery::new();
            for (muscle, h) in MuscleId::ALL.iter().zip(hours.iter()) {
                recovery.insert(*muscle, now() - Duration::hours(*h));
            }
            let heatmap = all_recovery_colors(&recovery, &MuscleId::ALL, now());
            prop_assert_eq!(heatmap.len(), MuscleId::ALL.len());

            let counts = heatmap.counts();
            prop_assert_eq!(counts.red + counts.yellow + counts.green, MuscleId::ALL.len());
        }
    }
}
