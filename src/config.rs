use std::path::PathBuf;
use std::time::Duration;

use crate::model::ImportanceType;
use crate::stats::Preset;

const DEFAULT_MODEL_PATH: &str = "xgboost_pubg_baseline.json";
const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_TICK_MS: u64 = 250;
const MIN_TICK_MS: u64 = 50;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub model_path: PathBuf,
    pub importance: ImportanceType,
    pub default_preset: Preset,
    pub tick_rate: Duration,
    pub log_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            importance: ImportanceType::Gain,
            default_preset: Preset::Aggressive,
            tick_rate: Duration::from_millis(DEFAULT_TICK_MS),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
        }
    }
}

impl AppConfig {
    /// Loads `.env.local` then `.env`, then reads the `WINPLACE_*` variables.
    pub fn load() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Unparseable values fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let tick_ms = lookup("WINPLACE_TICK_MS")
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TICK_MS)
            .max(MIN_TICK_MS);
        Self {
            model_path: lookup("WINPLACE_MODEL_PATH")
                .filter(|val| !val.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            importance: lookup("WINPLACE_IMPORTANCE_TYPE")
                .and_then(|val| val.parse().ok())
                .unwrap_or(defaults.importance),
            default_preset: lookup("WINPLACE_DEFAULT_PRESET")
                .and_then(|val| val.parse().ok())
                .unwrap_or(defaults.default_preset),
            tick_rate: Duration::from_millis(tick_ms),
            log_dir: lookup("WINPLACE_LOG_DIR")
                .filter(|val| !val.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
        }
    }
}
