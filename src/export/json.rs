use serde_json::{Map, Value};

use crate::heatmap::Heatmap;

/// Pretty `{muscleId: color}` object
pub fn heatmap_to_json(heatmap: &Heatmap) -> String {
    let colors: Map<String, Value> = heatmap
        .iter()
        .map(|(muscle, color)| (muscle.id().to_string(), Value::String(color.as_str().to_string())))
        .collect();
    format!("{:#}", Value::Object(colors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heatmap::all_recovery_colors;
    use crate::muscles::MuscleId;
    use crate::recovery::MuscleRecovery;
    use chrono::{DateTime, Duration, Utc};

    #[test]
    fn test_heatmap_json() {
        let now: DateTime<Utc> = "2024-03-10T12:00:00Z".parse().unwrap();
        let mut recovery = MuscleRecovery::new();
        recovery.insert(MuscleId::Calves, now - Duration::hours(36));

        let heatmap = all_recovery_colors(&recovery, &MuscleId::ALL, now);
        let value: Value = serde_json::from_str(&heatmap_to_json(&heatmap)).unwrap();

        assert_eq!(value.as_object().unwrap().len(), 17);
        assert_eq!(value["calves"], "yellow");
        assert_eq!(value["hip_flexors"], "green");
        assert_eq!(value, serde_json::to_value(&heatmap).unwrap());
    }
}
