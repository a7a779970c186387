use crate::stats::MatchStats;

/// Column names and order the model was trained with.
pub const MODEL_COLUMNS: [&str; 14] = [
    "killPlace",
    "numGroups",
    "maxPlace",
    "walkDistance",
    "totalDistance",
    "killsPerDistance",
    "damageDealt",
    "kills",
    "weaponsAcquired",
    "longestKill",
    "killRatio",
    "boosts",
    "rideDistance",
    "DBNOs",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineeredFeatures {
    pub total_distance: f64,
    pub kill_ratio: f64,
    // Same value as kill_ratio; both columns exist in the trained schema.
    pub kills_per_distance: f64,
    // Shown in the derived panel only, never fed to the model.
    pub headshot_rate: f64,
}

/// One-row model input, values aligned with [`MODEL_COLUMNS`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelRecord {
    pub values: [f64; 14],
}

pub fn derive_features(stats: &MatchStats) -> EngineeredFeatures {
    let total_distance = stats.walk_distance + stats.ride_distance + stats.swim_distance;
    let kill_ratio = guarded_ratio(stats.kills, total_distance);
    EngineeredFeatures {
        total_distance,
        kill_ratio,
        kills_per_distance: guarded_ratio(stats.kills, total_distance),
        headshot_rate: guarded_ratio(stats.headshot_kills, stats.kills),
    }
}

pub fn build_record(stats: &MatchStats, features: &EngineeredFeatures) -> ModelRecord {
    ModelRecord {
        values: [
            stats.kill_place,
            stats.num_groups,
            stats.max_place,
            stats.walk_distance,
            features.total_distance,
            features.kills_per_distance,
            stats.damage_dealt,
            stats.kills,
            stats.weapons_acquired,
            stats.longest_kill,
            features.kill_ratio,
            stats.boosts,
            stats.ride_distance,
            stats.dbnos,
        ],
    }
}

impl ModelRecord {
    pub fn columns(&self) -> &'static [&'static str; 14] {
        &MODEL_COLUMNS
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        MODEL_COLUMNS
            .iter()
            .position(|c| *c == column)
            .map(|idx| self.values[idx])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

fn guarded_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
