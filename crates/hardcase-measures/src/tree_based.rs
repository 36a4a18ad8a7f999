use hardcase_core::HardnessResult;
use hardcase_tree::{DecisionTreeClassifier, LeafStatistics};
use log::warn;
use serde::Deserialize;

use crate::measure::{Measure, MeasureInput, Scores};
use crate::params::{invalid, lenient_f64, lenient_u64, parse_settings, Params};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TreeSettings {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub seed: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrunedTreeSettings {
    #[serde(default = "default_min_impurity_split", deserialize_with = "lenient_f64")]
    pub min_impurity_split: f64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub seed: u64,
}

fn default_min_impurity_split() -> f64 {
    0.5
}

impl PrunedTreeSettings {
    fn validate(self, measure: &str) -> HardnessResult<Self> {
        if !(0.0..=1.0).contains(&self.min_impurity_split) {
            return Err(invalid(
                measure,
                format!(
                    "min_impurity_split must lie in [0, 1], got {}",
                    self.min_impurity_split
                ),
            ));
        }
        Ok(self)
    }
}

/// Fit a tree on the encoded rows and route every row back through it.
fn leaf_statistics(
    input: &MeasureInput<'_>,
    mut tree: DecisionTreeClassifier,
) -> HardnessResult<LeafStatistics> {
    let x = &input.encoded()?.matrix;
    let labels = input.labels();
    tree.fit(x, labels.ids())?;
    LeafStatistics::collect(&tree, x, labels.ids(), labels.n_classes())
}

// ─── DS ──────────────────────────────────────────────────────────────────

/// Disjunct size: `(leaf size - 1) / (largest leaf size - 1) - 1` in an unpruned
/// tree. Rows of the largest leaf score 0, rows alone in their leaf score -1.
pub struct DisjunctSize {
    settings: TreeSettings,
}

impl DisjunctSize {
    pub fn from_params(params: &Params) -> HardnessResult<Box<dyn Measure>> {
        Ok(Box::new(DisjunctSize {
            settings: parse_settings("DS", params)?,
        }))
    }
}

impl Measure for DisjunctSize {
    fn name(&self) -> &'static str {
        "DS"
    }

    fn compute(&self, input: &MeasureInput<'_>) -> HardnessResult<Scores> {
        let tree = DecisionTreeClassifier::unpruned().with_seed(self.settings.seed);
        let stats = leaf_statistics(input, tree)?;
        let n = stats.n_rows();
        let largest = stats.largest_leaf_size();
        if largest <= 1 {
            warn!("DS: every leaf holds a single row, scoring all rows 0");
            return Ok(Scores::broadcast(self.name(), 0.0, n));
        }
        let values = (0..n)
            .map(|i| (stats.leaf_size_of(i) - 1) as f64 / (largest - 1) as f64 - 1.0)
            .collect();
        Ok(Scores::per_row(self.name(), values))
    }
}

// ─── DCP ─────────────────────────────────────────────────────────────────

/// Disjunct class percentage: the negated share of a row's leaf that carries its
/// class, in a tree pruned by `min_impurity_split`.
pub struct DisjunctClassPercentage {
    settings: PrunedTreeSettings,
}

impl DisjunctClassPercentage {
    pub fn from_params(params: &Params) -> HardnessResult<Box<dyn Measure>> {
        let settings = parse_settings::<PrunedTreeSettings>("DCP", params)?.validate("DCP")?;
        Ok(Box::new(DisjunctClassPercentage { settings }))
    }
}

impl Measure for DisjunctClassPercentage {
    fn name(&self) -> &'static str {
        "DCP"
    }

    fn compute(&self, input: &MeasureInput<'_>) -> HardnessResult<Scores> {
        let tree = DecisionTreeClassifier::unpruned()
            .with_min_impurity_split(self.settings.min_impurity_split)
            .with_seed(self.settings.seed);
        let stats = leaf_statistics(input, tree)?;
        let labels = input.labels();

        let mut values = Vec::with_capacity(stats.n_rows());
        for i in 0..stats.n_rows() {
            input.check_interrupt()?;
            let same = stats.class_count_of(i, labels.id(i)) as f64;
            values.push(-same / stats.leaf_size_of(i) as f64);
        }
        Ok(Scores::per_row(self.name(), values))
    }
}

// ─── TD ──────────────────────────────────────────────────────────────────

/// Depth of each row's leaf in an unpruned tree.
pub struct TreeDepth {
    settings: TreeSettings,
}

impl TreeDepth {
    pub fn from_params(params: &Params) -> HardnessResult<Box<dyn Measure>> {
        Ok(Box::new(TreeDepth {
            settings: parse_settings("TD", params)?,
        }))
    }
}

impl Measure for TreeDepth {
    fn name(&self) -> &'static str {
        "TD"
    }

    fn compute(&self, input: &MeasureInput<'_>) -> HardnessResult<Scores> {
        let tree = DecisionTreeClassifier::unpruned().with_seed(self.settings.seed);
        let stats = leaf_statistics(input, tree)?;
        let values = (0..stats.n_rows()).map(|i| stats.depth_of(i) as f64).collect();
        Ok(Scores::per_row(self.name(), values))
    }
}

/// Depth of each row's leaf in a tree pruned by `min_impurity_split`.
pub struct PrunedTreeDepth {
    settings: PrunedTreeSettings,
}

impl PrunedTreeDepth {
    pub fn from_params(params: &Params) -> HardnessResult<Box<dyn Measure>> {
        let settings = parse_settings::<PrunedTreeSettings>("TDWithPruning", params)?
            .validate("TDWithPruning")?;
        Ok(Box::new(PrunedTreeDepth { settings }))
    }
}

impl Measure for PrunedTreeDepth {
    fn name(&self) -> &'static str {
        "TDWithPruning"
    }

    fn compute(&self, input: &MeasureInput<'_>) -> HardnessResult<Scores> {
        let tree = DecisionTreeClassifier::unpruned()
            .with_min_impurity_split(self.settings.min_impurity_split)
            .with_seed(self.settings.seed);
        let stats = leaf_statistics(input, tree)?;
        let values = (0..stats.n_rows()).map(|i| stats.depth_of(i) as f64).collect();
        Ok(Scores::per_row(self.name(), values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{blobs, line_dataset, numeric_dataset};
    use approx::assert_abs_diff_eq;
    use serde_json::json;

    fn params(value: serde_json::Value) -> Params {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_ds_uneven_leaves() {
        // Split at 2.5 leaves [0, 1, 2] (A) and [3, 4] (B).
        let ds = numeric_dataset(
            &[vec![0.0], vec![1.0], vec![2.0], vec![3.0], vec![4.0]],
            &["A", "A", "A", "B", "B"],
        );
        let input = MeasureInput::new(&ds).unwrap();
        let values = DisjunctSize::from_params(&Params::new())
            .unwrap()
            .compute(&input)
            .unwrap()
            .values;
        assert_abs_diff_eq!(values[0], 0.0);
        assert_abs_diff_eq!(values[4], -0.5);
        assert!(values.iter().all(|v| (-1.0..=0.0).contains(v)));
    }

    #[test]
    fn test_ds_single_leaf_and_singletons() {
        let ds = numeric_dataset(&[vec![0.0], vec![1.0], vec![2.0]], &["a", "a", "a"]);
        let input = MeasureInput::new(&ds).unwrap();
        let ds_measure = DisjunctSize::from_params(&Params::new()).unwrap();
        assert_eq!(ds_measure.compute(&input).unwrap().values, vec![0.0; 3]);

        let ds = numeric_dataset(&[vec![0.0], vec![1.0], vec![2.0]], &["a", "b", "a"]);
        let input = MeasureInput::new(&ds).unwrap();
        assert_eq!(ds_measure.compute(&input).unwrap().values, vec![0.0; 3]);
    }

    #[test]
    fn test_dcp_pure_leaves() {
        let ds = line_dataset();
        let input = MeasureInput::new(&ds).unwrap();
        let dcp = DisjunctClassPercentage::from_params(&params(json!({"min_impurity_split": 0})))
            .unwrap();
        assert_eq!(dcp.compute(&input).unwrap().values, vec![-1.0; 4]);
    }

    #[test]
    fn test_dcp_pruned_root() {
        // Balanced binary root has Gini 0.5, so the default threshold keeps one leaf.
        let ds = line_dataset();
        let input = MeasureInput::new(&ds).unwrap();
        let dcp = DisjunctClassPercentage::from_params(&Params::new()).unwrap();
        assert_eq!(dcp.compute(&input).unwrap().values, vec![-0.5; 4]);
    }

    #[test]
    fn test_dcp_rejects_bad_threshold() {
        assert!(DisjunctClassPercentage::from_params(&params(json!({"min_impurity_split": 1.5})))
            .is_err());
        assert!(PrunedTreeDepth::from_params(&params(json!({"min_impurity_split": "-0.1"})))
            .is_err());
    }

    #[test]
    fn test_tree_depths() {
        let ds = line_dataset();
        let input = MeasureInput::new(&ds).unwrap();
        let td = TreeDepth::from_params(&Params::new()).unwrap();
        assert_eq!(td.compute(&input).unwrap().values, vec![1.0; 4]);

        let pruned = PrunedTreeDepth::from_params(&Params::new()).unwrap();
        assert_eq!(pruned.compute(&input).unwrap().values, vec![0.0; 4]);
    }

    #[test]
    fn test_full_pruning_keeps_root() {
        let ds = blobs();
        let input = MeasureInput::new(&ds).unwrap();
        let full = TreeDepth::from_params(&params(json!({"seed": 3})))
            .unwrap()
            .compute(&input)
            .unwrap()
            .values;
        assert!(full.iter().all(|&d| d >= 1.0));

        let pruned = PrunedTreeDepth::from_params(&params(json!({"min_impurity_split": 1, "seed": 3})))
            .unwrap()
            .compute(&input)
            .unwrap()
            .values;
        assert_eq!(pruned, vec![0.0; 12]);
    }
}
