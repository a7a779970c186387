use std::path::PathBuf;

use winplace_terminal::features::{MODEL_COLUMNS, ModelRecord, build_record, derive_features};
use winplace_terminal::form::FormState;
use winplace_terminal::model::{ImportanceType, ModelError, WinModel, XgbModel};
use winplace_terminal::stats::Preset;

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn tiny_model(kind: ImportanceType) -> XgbModel {
    XgbModel::load(&fixture_path("tiny_model.json"), kind).expect("fixture model should load")
}

fn record_for(preset: Preset) -> ModelRecord {
    let stats = preset.defaults();
    build_record(&stats, &derive_features(&stats))
}

fn single_tree_model(objective: &str, base_score: &str, tree: &str) -> String {
    format!(
        r#"{{"learner":{{
            "learner_model_param":{{"base_score":"{base_score}","num_feature":"14"}},
            "objective":{{"name":"{objective}"}},
            "gradient_booster":{{"name":"gbtree","model":{{"trees":[{tree}]}}}}
        }}}}"#
    )
}

#[test]
fn fixture_loads_with_training_schema() {
    let model = tiny_model(ImportanceType::Gain);
    assert_eq!(model.num_trees(), 2);
    assert_eq!(model.num_feature(), 14);
    assert_eq!(model.feature_names().len(), 14);
    assert!(model.schema_mismatch(&MODEL_COLUMNS).is_none());
}

#[test]
fn predicts_base_score_plus_leaves() {
    let model = tiny_model(ImportanceType::Gain);

    // killPlace 10 < 20 -> 0.2, walkDistance 2000 >= 1500 -> 0.15
    let aggressive = model.predict(&record_for(Preset::Aggressive));
    assert!((aggressive - 0.85).abs() < 1e-5, "got {aggressive}");

    // killPlace 25 -> -0.1, walkDistance 1500 is not < 1500 -> 0.15
    let balanced = model.predict(&record_for(Preset::Balanced));
    assert!((balanced - 0.55).abs() < 1e-5, "got {balanced}");

    // killPlace 50 -> -0.1, walkDistance 1000 -> kills 1 < 3 -> -0.05
    let passive = model.predict(&record_for(Preset::Passive));
    assert!((passive - 0.35).abs() < 1e-5, "got {passive}");
}

#[test]
fn missing_values_follow_default_direction() {
    let model = tiny_model(ImportanceType::Gain);
    let mut record = record_for(Preset::Passive);
    record.values[0] = f64::NAN;
    // Tree 0 defaults left (0.2); tree 1 unchanged (-0.05).
    let pred = model.predict(&record);
    assert!((pred - 0.65).abs() < 1e-5, "got {pred}");
}

#[test]
fn gain_importances_are_normalised() {
    let model = tiny_model(ImportanceType::Gain);
    let imp = model.feature_importances();
    assert_eq!(imp.len(), 14);
    assert!((imp.iter().sum::<f32>() - 1.0).abs() < 1e-6);
    assert!((imp[0] - 0.5).abs() < 1e-6);
    assert!((imp[3] - 0.375).abs() < 1e-6);
    assert!((imp[7] - 0.125).abs() < 1e-6);
    assert_eq!(imp[1], 0.0);
}

#[test]
fn weight_importances_count_splits() {
    let model = tiny_model(ImportanceType::Weight);
    let imp = model.feature_importances();
    for idx in [0, 3, 7] {
        assert!((imp[idx] - 1.0 / 3.0).abs() < 1e-6);
    }
}

#[test]
fn form_chart_uses_model_importances() {
    let model = tiny_model(ImportanceType::Gain);
    let mut state = FormState::new(Preset::Aggressive);
    let view = state.predict(&model);

    let top: Vec<&str> = view.importances.iter().take(4).map(|r| r.feature.as_str()).collect();
    assert_eq!(top, vec!["killPlace", "walkDistance", "kills", "numGroups"]);
    assert_eq!(
        view.banner().as_deref(),
        Some("Predicted Win Probability (winPlacePerc): 0.850")
    );
}

#[test]
fn logistic_objective_applies_sigmoid() {
    let leaf = r#"{"left_children":[-1],"right_children":[-1],"split_indices":[0],
        "split_conditions":[0.0],"default_left":[false],"loss_changes":[0.0]}"#;
    let raw = single_tree_model("binary:logistic", "[5E-1]", leaf);
    let model = XgbModel::from_json_str(&raw, ImportanceType::Gain).expect("model should parse");
    let pred = model.predict(&record_for(Preset::Balanced));
    assert!((pred - 0.5).abs() < 1e-6, "got {pred}");
    // No splits at all.
    assert!(model.feature_importances().iter().all(|v| *v == 0.0));
}

#[test]
fn split_index_beyond_record_is_missing() {
    let tree = r#"{"left_children":[1,-1,-1],"right_children":[2,-1,-1],
        "split_indices":[20,0,0],"split_conditions":[1.0,1.0,-1.0],
        "default_left":[true,false,false],"loss_changes":[3.0,0.0,0.0]}"#;
    let raw = single_tree_model("reg:squarederror", "0", tree);
    let model = XgbModel::from_json_str(&raw, ImportanceType::Gain).expect("model should parse");
    assert_eq!(model.num_feature(), 21);
    assert!((model.predict(&record_for(Preset::Aggressive)) - 1.0).abs() < 1e-6);
}

#[test]
fn schema_mismatch_is_reported_not_fatal() {
    let raw = r#"{"learner":{
        "feature_names":["kills","damageDealt"],
        "learner_model_param":{"base_score":"0.5","num_feature":"2"},
        "gradient_booster":{"name":"gbtree","model":{"trees":[]}}
    }}"#;
    let model = XgbModel::from_json_str(raw, ImportanceType::Gain).expect("model should parse");
    let msg = model.schema_mismatch(&MODEL_COLUMNS).expect("mismatch expected");
    assert!(msg.contains("2 columns"));
    assert!((model.predict(&record_for(Preset::Passive)) - 0.5).abs() < 1e-6);
}

#[test]
fn missing_file_is_io_error() {
    let err = XgbModel::load(&fixture_path("does_not_exist.json"), ImportanceType::Gain)
        .expect_err("load should fail");
    assert!(matches!(err, ModelError::Io { .. }));
    assert!(err.to_string().contains("does_not_exist.json"));
}

#[test]
fn rejects_non_tree_boosters() {
    let raw = r#"{"learner":{
        "learner_model_param":{"base_score":"0.5"},
        "gradient_booster":{"name":"gblinear"}
    }}"#;
    let err = XgbModel::from_json_str(raw, ImportanceType::Gain).expect_err("gblinear");
    assert!(matches!(err, ModelError::UnsupportedBooster(ref name) if name == "gblinear"));
}

#[test]
fn rejects_malformed_trees() {
    let cyclic = r#"{"left_children":[0,-1],"right_children":[1,-1],"split_indices":[0,0],
        "split_conditions":[1.0,0.0]}"#;
    let raw = single_tree_model("reg:squarederror", "0.5", cyclic);
    let err = XgbModel::from_json_str(&raw, ImportanceType::Gain).expect_err("cycle");
    assert!(matches!(err, ModelError::MalformedTree { tree: 0, .. }));

    let ragged = r#"{"left_children":[-1],"right_children":[-1,-1],"split_indices":[0],
        "split_conditions":[1.0]}"#;
    let raw = single_tree_model("reg:squarederror", "0.5", ragged);
    let err = XgbModel::from_json_str(&raw, ImportanceType::Gain).expect_err("ragged");
    assert!(err.to_string().contains("right_children"));
}

#[test]
fn rejects_bad_base_score_and_json() {
    let leaf = r#"{"left_children":[-1],"right_children":[-1],"split_indices":[0],
        "split_conditions":[0.0]}"#;
    let raw = single_tree_model("reg:squarederror", "half", leaf);
    let err = XgbModel::from_json_str(&raw, ImportanceType::Gain).expect_err("bad param");
    assert!(matches!(err, ModelError::BadParam { name: "base_score", .. }));

    let err = XgbModel::from_json_str("not json", ImportanceType::Gain).expect_err("json");
    assert!(matches!(err, ModelError::Json(_)));
}

#[test]
fn importance_type_parses() {
    assert_eq!("gain".parse::<ImportanceType>(), Ok(ImportanceType::Gain));
    assert_eq!("Weight".parse::<ImportanceType>(), Ok(ImportanceType::Weight));
    assert_eq!("total_gain".parse::<ImportanceType>(), Ok(ImportanceType::TotalGain));
    assert!("cover".parse::<ImportanceType>().is_err());
}
