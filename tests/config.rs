use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use winplace_terminal::config::AppConfig;
use winplace_terminal::model::ImportanceType;
use winplace_terminal::stats::Preset;

fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
    let env: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    AppConfig::from_lookup(|key| env.get(key).cloned())
}

#[test]
fn defaults_when_unset() {
    let cfg = config_from(&[]);
    assert_eq!(cfg.model_path, PathBuf::from("xgboost_pubg_baseline.json"));
    assert_eq!(cfg.importance, ImportanceType::Gain);
    assert_eq!(cfg.default_preset, Preset::Aggressive);
    assert_eq!(cfg.tick_rate, Duration::from_millis(250));
    assert_eq!(cfg.log_dir, PathBuf::from("logs"));
}

#[test]
fn reads_overrides() {
    let cfg = config_from(&[
        ("WINPLACE_MODEL_PATH", "models/pubg.json"),
        ("WINPLACE_IMPORTANCE_TYPE", "weight"),
        ("WINPLACE_DEFAULT_PRESET", "passive"),
        ("WINPLACE_TICK_MS", "100"),
        ("WINPLACE_LOG_DIR", "/tmp/winplace"),
    ]);
    assert_eq!(cfg.model_path, PathBuf::from("models/pubg.json"));
    assert_eq!(cfg.importance, ImportanceType::Weight);
    assert_eq!(cfg.default_preset, Preset::Passive);
    assert_eq!(cfg.tick_rate, Duration::from_millis(100));
    assert_eq!(cfg.log_dir, PathBuf::from("/tmp/winplace"));
}

#[test]
fn bad_values_fall_back() {
    let cfg = config_from(&[
        ("WINPLACE_MODEL_PATH", "  "),
        ("WINPLACE_IMPORTANCE_TYPE", "cover"),
        ("WINPLACE_DEFAULT_PRESET", "sniper"),
        ("WINPLACE_TICK_MS", "fast"),
    ]);
    assert_eq!(cfg.model_path, PathBuf::from("xgboost_pubg_baseline.json"));
    assert_eq!(cfg.importance, ImportanceType::Gain);
    assert_eq!(cfg.default_preset, Preset::Aggressive);
    assert_eq!(cfg.tick_rate, Duration::from_millis(250));
}

#[test]
fn tick_rate_has_floor() {
    let cfg = config_from(&[("WINPLACE_TICK_MS", "5")]);
    assert_eq!(cfg.tick_rate, Duration::from_millis(50));
}
