#[derive(Debug, Clone, PartialEq)]
pub struct ImportanceRow {
    pub feature: String,
    pub importance: f32,
}

/// Pairs importances with column names by position and sorts them, most important first.
///
/// Ties keep their column order. Extra entries on either side are dropped.
pub fn rank_importances(columns: &[&str], importances: &[f32]) -> Vec<ImportanceRow> {
    let mut rows: Vec<ImportanceRow> = columns
        .iter()
        .zip(importances)
        .map(|(feature, importance)| ImportanceRow {
            feature: feature.to_string(),
            importance: *importance,
        })
        .collect();
    rows.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    rows
}
