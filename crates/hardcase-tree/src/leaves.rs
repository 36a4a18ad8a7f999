use std::collections::BTreeMap;

use hardcase_core::{HardnessError, HardnessResult, Matrix};

use crate::decision_tree::DecisionTreeClassifier;

/// A model that partitions rows into disjuncts (leaves) with a known depth.
pub trait Disjuncts {
    /// Leaf id of every row of `x`.
    fn leaf_ids(&self, x: &Matrix) -> HardnessResult<Vec<usize>>;

    /// Depth of a leaf, the root being 0.
    fn leaf_depth(&self, leaf: usize) -> HardnessResult<usize>;
}

impl Disjuncts for DecisionTreeClassifier {
    fn leaf_ids(&self, x: &Matrix) -> HardnessResult<Vec<usize>> {
        self.apply(x)
    }

    fn leaf_depth(&self, leaf: usize) -> HardnessResult<usize> {
        self.node_depth(leaf)
            .ok_or_else(|| HardnessError::IndexOutOfBounds {
                index: leaf,
                axis: 0,
                size: self.node_count(),
            })
    }
}

#[derive(Debug, Clone)]
struct LeafSummary {
    size: usize,
    class_counts: Vec<usize>,
    depth: usize,
}

/// How the rows of a dataset are spread over the leaves of a fitted model.
#[derive(Debug, Clone)]
pub struct LeafStatistics {
    leaf_of_row: Vec<usize>,
    leaves: BTreeMap<usize, LeafSummary>,
}

impl LeafStatistics {
    /// Route every row of `x` through `model` and tally leaf sizes and class counts.
    pub fn collect<M: Disjuncts>(
        model: &M,
        x: &Matrix,
        labels: &[usize],
        n_classes: usize,
    ) -> HardnessResult<Self> {
        if labels.len() != x.rows() {
            return Err(HardnessError::ShapeMismatch {
                expected: vec![x.rows()],
                got: vec![labels.len()],
            });
        }
        let leaf_of_row = model.leaf_ids(x)?;
        let mut leaves: BTreeMap<usize, LeafSummary> = BTreeMap::new();
        for (&leaf, &label) in leaf_of_row.iter().zip(labels) {
            if !leaves.contains_key(&leaf) {
                let depth = model.leaf_depth(leaf)?;
                leaves.insert(
                    leaf,
                    LeafSummary {
                        size: 0,
                        class_counts: vec![0; n_classes],
                        depth,
                    },
                );
            }
            if let Some(summary) = leaves.get_mut(&leaf) {
                summary.size += 1;
                if let Some(c) = summary.class_counts.get_mut(label) {
                    *c += 1;
                }
            }
        }
        Ok(LeafStatistics {
            leaf_of_row,
            leaves,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.leaf_of_row.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.leaves.len()
    }

    pub fn leaf_of(&self, row: usize) -> usize {
        self.leaf_of_row[row]
    }

    /// Number of rows sharing `row`'s leaf, itself included.
    pub fn leaf_size_of(&self, row: usize) -> usize {
        self.leaves[&self.leaf_of_row[row]].size
    }

    /// Number of rows of `class` in `row`'s leaf.
    pub fn class_count_of(&self, row: usize, class: usize) -> usize {
        self.leaves[&self.leaf_of_row[row]]
            .class_counts
            .get(class)
            .copied()
            .unwrap_or(0)
    }

    pub fn depth_of(&self, row: usize) -> usize {
        self.leaves[&self.leaf_of_row[row]].depth
    }

    /// Size of the most populated leaf, 0 without rows.
    pub fn largest_leaf_size(&self) -> usize {
        self.leaves.values().map(|l| l.size).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_from_tree() {
        let x = Matrix::from_vec2d(&[vec![0.0], vec![1.0], vec![2.0], vec![10.0], vec![11.0]])
            .unwrap();
        let y = vec![0, 0, 0, 1, 1];
        let mut tree = DecisionTreeClassifier::unpruned();
        tree.fit(&x, &y).unwrap();

        let stats = LeafStatistics::collect(&tree, &x, &y, 2).unwrap();
        assert_eq!(stats.n_leaves(), 2);
        assert_eq!(stats.largest_leaf_size(), 3);
        assert_eq!(stats.leaf_size_of(0), 3);
        assert_eq!(stats.leaf_size_of(4), 2);
        assert_eq!(stats.class_count_of(0, 0), 3);
        assert_eq!(stats.class_count_of(0, 1), 0);
        assert_eq!(stats.depth_of(3), 1);
        assert_eq!(stats.leaf_of(0), stats.leaf_of(2));
    }

    struct Parity;

    impl Disjuncts for Parity {
        fn leaf_ids(&self, x: &Matrix) -> HardnessResult<Vec<usize>> {
            Ok((0..x.rows()).map(|i| i % 2).collect())
        }

        fn leaf_depth(&self, leaf: usize) -> HardnessResult<usize> {
            Ok(leaf + 3)
        }
    }

    #[test]
    fn test_collect_from_custom_model() {
        let x = Matrix::zeros(5, 1);
        let stats = LeafStatistics::collect(&Parity, &x, &[0, 1, 1, 1, 0], 2).unwrap();
        assert_eq!(stats.leaf_size_of(0), 3);
        assert_eq!(stats.class_count_of(0, 0), 2);
        assert_eq!(stats.class_count_of(1, 1), 2);
        assert_eq!(stats.depth_of(1), 4);
    }

    #[test]
    fn test_label_length_mismatch() {
        assert!(LeafStatistics::collect(&Parity, &Matrix::zeros(2, 1), &[0], 1).is_err());
    }
}
