//! Gradient-boosted tree ensemble loaded from an XGBoost JSON model file.
//!
//! Only the two capabilities the form needs are exposed through [`WinModel`]:
//! a single-row prediction and the static feature-importance vector.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::features::ModelRecord;

pub trait WinModel {
    /// Raw model output for one record. Not clamped.
    fn predict(&self, record: &ModelRecord) -> f64;

    /// Importance per training column, positionally aligned with the training schema.
    fn feature_importances(&self) -> &[f32];
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid model json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported booster `{0}`, expected gbtree")]
    UnsupportedBooster(String),
    #[error("tree {tree} is malformed: {reason}")]
    MalformedTree { tree: usize, reason: String },
    #[error("invalid model parameter {name}: `{value}`")]
    BadParam { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportanceType {
    /// Average loss reduction of the splits on a feature.
    #[default]
    Gain,
    /// Number of splits on a feature.
    Weight,
    TotalGain,
}

impl FromStr for ImportanceType {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "gain" => Ok(ImportanceType::Gain),
            "weight" => Ok(ImportanceType::Weight),
            "total_gain" => Ok(ImportanceType::TotalGain),
            other => Err(format!("unknown importance type `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Link {
    Identity,
    Logistic,
    Exp,
}

impl Link {
    fn from_objective(name: &str) -> Self {
        match name {
            "reg:logistic" | "binary:logistic" => Link::Logistic,
            "reg:gamma" | "reg:tweedie" | "count:poisson" => Link::Exp,
            _ => Link::Identity,
        }
    }

    fn to_margin(self, base_score: f32) -> f32 {
        match self {
            Link::Identity => base_score,
            Link::Logistic => (base_score / (1.0 - base_score)).ln(),
            Link::Exp => base_score.ln(),
        }
    }

    fn apply(self, margin: f32) -> f32 {
        match self {
            Link::Identity => margin,
            Link::Logistic => 1.0 / (1.0 + (-margin).exp()),
            Link::Exp => margin.exp(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Node {
    left: i32,
    right: i32,
    feature: usize,
    // Split threshold for internal nodes, leaf value for leaves.
    value: f32,
    default_left: bool,
    gain: f32,
}

impl Node {
    fn is_leaf(&self) -> bool {
        self.left == -1
    }
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn leaf_value(&self, row: &[f64]) -> f32 {
        let mut idx = 0usize;
        loop {
            let node = &self.nodes[idx];
            if node.is_leaf() {
                return node.value;
            }
            // Split indices past the end of the row are treated as missing values.
            let go_left = match row.get(node.feature) {
                Some(v) if !v.is_nan() => (*v as f32) < node.value,
                _ => node.default_left,
            };
            let next = if go_left { node.left } else { node.right };
            idx = next as usize;
        }
    }
}

#[derive(Debug, Clone)]
pub struct XgbModel {
    trees: Vec<Tree>,
    base_margin: f32,
    link: Link,
    num_feature: usize,
    feature_names: Vec<String>,
    importances: Vec<f32>,
}

impl XgbModel {
    pub fn load(path: &Path, importance: ImportanceType) -> Result<Self, ModelError> {
        let raw = fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let model = Self::from_json_str(&raw, importance)?;
        info!(
            path = %path.display(),
            trees = model.trees.len(),
            num_feature = model.num_feature,
            "loaded model"
        );
        Ok(model)
    }

    pub fn from_json_str(raw: &str, importance: ImportanceType) -> Result<Self, ModelError> {
        let parsed: RawModel = serde_json::from_str(raw)?;
        let learner = parsed.learner;

        if learner.gradient_booster.name != "gbtree" {
            return Err(ModelError::UnsupportedBooster(learner.gradient_booster.name));
        }
        let raw_trees = learner
            .gradient_booster
            .model
            .map(|m| m.trees)
            .unwrap_or_default();

        let trees = raw_trees
            .into_iter()
            .enumerate()
            .map(|(idx, raw)| build_tree(idx, raw))
            .collect::<Result<Vec<_>, _>>()?;

        let base_score = parse_param("base_score", &learner.learner_model_param.base_score)?;
        let link = learner
            .objective
            .as_ref()
            .map(|o| Link::from_objective(&o.name))
            .unwrap_or(Link::Identity);

        let max_split_feature = trees
            .iter()
            .flat_map(|t| t.nodes.iter())
            .filter(|n| !n.is_leaf())
            .map(|n| n.feature + 1)
            .max()
            .unwrap_or(0);
        let declared = match learner.learner_model_param.num_feature.as_deref() {
            Some(raw) => parse_param::<usize>("num_feature", raw)?,
            None => learner.feature_names.len(),
        };
        let num_feature = declared.max(max_split_feature);

        let importances = compute_importances(&trees, num_feature, importance);
        debug!(?link, base_score, ?importance, "model parameters");

        Ok(Self {
            trees,
            base_margin: link.to_margin(base_score),
            link,
            num_feature,
            feature_names: learner.feature_names,
            importances,
        })
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn num_feature(&self) -> usize {
        self.num_feature
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Describes how the stored training schema differs from `columns`, if it does.
    ///
    /// Models saved without feature names never report a mismatch.
    pub fn schema_mismatch(&self, columns: &[&str]) -> Option<String> {
        if self.feature_names.is_empty() {
            return None;
        }
        if self.feature_names.len() != columns.len() {
            return Some(format!(
                "model expects {} columns, form sends {}",
                self.feature_names.len(),
                columns.len()
            ));
        }
        self.feature_names
            .iter()
            .zip(columns)
            .enumerate()
            .find(|(_, (expected, sent))| expected.as_str() != **sent)
            .map(|(idx, (expected, sent))| {
                format!("column {idx}: model expects `{expected}`, form sends `{sent}`")
            })
    }
}

impl WinModel for XgbModel {
    fn predict(&self, record: &ModelRecord) -> f64 {
        let row = record.as_slice();
        let margin = self
            .trees
            .iter()
            .fold(self.base_margin, |acc, tree| acc + tree.leaf_value(row));
        self.link.apply(margin) as f64
    }

    fn feature_importances(&self) -> &[f32] {
        &self.importances
    }
}

fn build_tree(tree: usize, raw: RawTree) -> Result<Tree, ModelError> {
    let malformed = |reason: String| ModelError::MalformedTree { tree, reason };

    let len = raw.left_children.len();
    if len == 0 {
        return Err(malformed("no nodes".to_string()));
    }
    let parallel = [
        ("right_children", raw.right_children.len()),
        ("split_indices", raw.split_indices.len()),
        ("split_conditions", raw.split_conditions.len()),
    ];
    for (name, n) in parallel {
        if n != len {
            return Err(malformed(format!("{name} has {n} entries, expected {len}")));
        }
    }
    for (name, n) in [
        ("default_left", raw.default_left.len()),
        ("loss_changes", raw.loss_changes.len()),
    ] {
        if n != 0 && n != len {
            return Err(malformed(format!("{name} has {n} entries, expected {len}")));
        }
    }

    let mut nodes = Vec::with_capacity(len);
    for idx in 0..len {
        let left = raw.left_children[idx];
        let right = raw.right_children[idx];
        if left != -1 {
            // Children always follow their parent, which also rules out cycles.
            for child in [left, right] {
                if child <= idx as i32 || child as usize >= len {
                    return Err(malformed(format!("node {idx} has invalid child {child}")));
                }
            }
        }
        nodes.push(Node {
            left,
            right,
            feature: raw.split_indices[idx] as usize,
            value: raw.split_conditions[idx],
            default_left: raw.default_left.get(idx).is_some_and(Flag::is_set),
            gain: raw.loss_changes.get(idx).copied().unwrap_or(0.0),
        });
    }
    Ok(Tree { nodes })
}

fn compute_importances(trees: &[Tree], num_feature: usize, kind: ImportanceType) -> Vec<f32> {
    let mut weight = vec![0.0f64; num_feature];
    let mut total_gain = vec![0.0f64; num_feature];
    for node in trees.iter().flat_map(|t| t.nodes.iter()) {
        if node.is_leaf() {
            continue;
        }
        weight[node.feature] += 1.0;
        total_gain[node.feature] += node.gain as f64;
    }

    let scores: Vec<f64> = match kind {
        ImportanceType::Weight => weight,
        ImportanceType::TotalGain => total_gain,
        ImportanceType::Gain => weight
            .iter()
            .zip(&total_gain)
            .map(|(w, g)| if *w > 0.0 { g / w } else { 0.0 })
            .collect(),
    };

    let sum: f64 = scores.iter().sum();
    if sum <= 0.0 {
        return vec![0.0; num_feature];
    }
    scores.iter().map(|s| (s / sum) as f32).collect()
}

fn parse_param<T: FromStr>(name: &'static str, raw: &str) -> Result<T, ModelError> {
    // Newer XGBoost releases write vector-valued params such as "[5E-1]".
    raw.trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .trim()
        .parse::<T>()
        .map_err(|_| ModelError::BadParam {
            name,
            value: raw.to_string(),
        })
}

#[derive(Debug, Deserialize)]
struct RawModel {
    learner: RawLearner,
}

#[derive(Debug, Deserialize)]
struct RawLearner {
    #[serde(default)]
    feature_names: Vec<String>,
    learner_model_param: RawLearnerParam,
    #[serde(default)]
    objective: Option<RawObjective>,
    gradient_booster: RawBooster,
}

#[derive(Debug, Deserialize)]
struct RawLearnerParam {
    base_score: String,
    #[serde(default)]
    num_feature: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawObjective {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawBooster {
    name: String,
    #[serde(default)]
    model: Option<RawGbtree>,
}

#[derive(Debug, Deserialize)]
struct RawGbtree {
    #[serde(default)]
    trees: Vec<RawTree>,
}

#[derive(Debug, Deserialize)]
struct RawTree {
    left_children: Vec<i32>,
    right_children: Vec<i32>,
    split_indices: Vec<u32>,
    split_conditions: Vec<f32>,
    #[serde(default)]
    default_left: Vec<Flag>,
    #[serde(default)]
    loss_changes: Vec<f32>,
}

// Older files write 0/1, newer ones write booleans.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(u8),
}

impl Flag {
    fn is_set(&self) -> bool {
        match self {
            Flag::Bool(b) => *b,
            Flag::Int(n) => *n != 0,
        }
    }
}
