//! Per-node records flowing through the join.

use serde::{Deserialize, Serialize};

/// Externally computed values for one node, keyed (outside this struct) by
/// its external identifier. Both fields are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuzzyRecord {
    pub ground_truth_label: String,
    pub fuzzy_score: String,
}

impl FuzzyRecord {
    pub fn new(ground_truth_label: impl Into<String>, fuzzy_score: impl Into<String>) -> Self {
        Self {
            ground_truth_label: ground_truth_label.into(),
            fuzzy_score: fuzzy_score.into(),
        }
    }
}

/// One row of the merged dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinedRow {
    pub id: String,
    pub ground_truth_label: String,
    pub fuzzy_score: String,
    /// Shell index, or the join's default when the node had none.
    pub shell_index: u32,
}

impl JoinedRow {
    /// The fuzzy score as a number, for the threshold analysis.
    pub fn fuzzy_value(&self) -> Option<f64> {
        self.fuzzy_score.trim().parse().ok()
    }
}
