use hardcase_core::{HardnessError, HardnessResult, Matrix};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Feature values closer than this are treated as equal when placing thresholds.
const FEATURE_THRESHOLD: f64 = 1e-7;

#[derive(Debug, Clone)]
enum NodeKind {
    /// Internal node: rows with `x[feature] <= threshold` go left.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf,
}

/// A node of the fitted tree, stored in a flat arena indexed by node id.
#[derive(Debug, Clone)]
struct Node {
    depth: usize,
    impurity: f64,
    kind: NodeKind,
}

/// Best split found for one node.
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    left: Vec<usize>,
    right: Vec<usize>,
}

/// Decision Tree Classifier using the CART algorithm (Gini impurity).
///
/// Nodes live in an arena so that fitted trees can report leaf ids and depths.
/// Features are visited in an order shuffled per node by a seeded RNG; the first
/// strictly best split wins, which makes fitting deterministic for a fixed `seed`.
pub struct DecisionTreeClassifier {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// A node whose Gini impurity is at or below this value is not split further.
    pub min_impurity_split: f64,
    pub seed: u64,
    nodes: Vec<Node>,
    pub n_classes: usize,
}

impl DecisionTreeClassifier {
    pub fn new(max_depth: usize, min_samples_split: usize, min_samples_leaf: usize) -> Self {
        DecisionTreeClassifier {
            max_depth,
            min_samples_split,
            min_samples_leaf,
            min_impurity_split: 0.0,
            seed: 0,
            nodes: Vec::new(),
            n_classes: 0,
        }
    }

    /// Fully grown tree: splits until leaves are pure or rows are indistinguishable.
    pub fn unpruned() -> Self {
        Self::new(usize::MAX, 2, 1)
    }

    pub fn with_min_impurity_split(mut self, threshold: f64) -> Self {
        self.min_impurity_split = threshold;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Fit on a feature matrix and integer class ids.
    pub fn fit(&mut self, x: &Matrix, y: &[usize]) -> HardnessResult<()> {
        let n = x.rows();
        if n == 0 {
            return Err(HardnessError::EmptyDataset);
        }
        if y.len() != n {
            return Err(HardnessError::ShapeMismatch {
                expected: vec![n],
                got: vec![y.len()],
            });
        }
        self.n_classes = y.iter().max().map_or(0, |m| m + 1);
        self.nodes.clear();

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut features: Vec<usize> = (0..x.cols()).collect();

        // Work stack of (node id, rows reaching it); children are pushed right first
        // so nodes are expanded depth-first, left to right.
        let all: Vec<usize> = (0..n).collect();
        let root = self.push_node(y, &all, 0);
        let mut stack = vec![(root, all)];

        while let Some((id, indices)) = stack.pop() {
            let depth = self.nodes[id].depth;
            let impurity = self.nodes[id].impurity;
            if depth >= self.max_depth
                || indices.len() < self.min_samples_split
                || indices.len() < 2 * self.min_samples_leaf.max(1)
                || impurity <= self.min_impurity_split
            {
                continue;
            }

            features.shuffle(&mut rng);
            let Some(split) = self.best_split(x, y, &indices, &features) else {
                continue;
            };

            let left = self.push_node(y, &split.left, depth + 1);
            let right = self.push_node(y, &split.right, depth + 1);
            self.nodes[id].kind = NodeKind::Split {
                feature: split.feature,
                threshold: split.threshold,
                left,
                right,
            };
            stack.push((right, split.right));
            stack.push((left, split.left));
        }
        Ok(())
    }

    fn push_node(&mut self, y: &[usize], indices: &[usize], depth: usize) -> usize {
        let mut class_counts = vec![0usize; self.n_classes];
        for &i in indices {
            class_counts[y[i]] += 1;
        }
        let impurity = gini(&class_counts, indices.len());
        self.nodes.push(Node {
            depth,
            impurity,
            kind: NodeKind::Leaf,
        });
        self.nodes.len() - 1
    }

    fn best_split(
        &self,
        x: &Matrix,
        y: &[usize],
        indices: &[usize],
        features: &[usize],
    ) -> Option<SplitCandidate> {
        let n = indices.len();
        let min_leaf = self.min_samples_leaf.max(1);
        let mut total = vec![0usize; self.n_classes];
        for &i in indices {
            total[y[i]] += 1;
        }

        let mut best: Option<(usize, f64, f64)> = None;
        let mut sorted = indices.to_vec();

        for &feature in features {
            sorted.sort_by(|&a, &b| x.row(a)[feature].total_cmp(&x.row(b)[feature]));

            let mut left_counts = vec![0usize; self.n_classes];
            for p in 0..n - 1 {
                left_counts[y[sorted[p]]] += 1;
                let n_left = p + 1;
                let n_right = n - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }
                let v = x.row(sorted[p])[feature];
                let next = x.row(sorted[p + 1])[feature];
                if next <= v + FEATURE_THRESHOLD {
                    continue;
                }

                let right_counts: Vec<usize> =
                    total.iter().zip(&left_counts).map(|(t, l)| t - l).collect();
                let impurity = (n_left as f64 * gini(&left_counts, n_left)
                    + n_right as f64 * gini(&right_counts, n_right))
                    / n as f64;

                if best.map_or(true, |(_, _, b)| impurity < b) {
                    best = Some((feature, (v + next) / 2.0, impurity));
                }
            }
        }

        let (feature, threshold, _) = best?;
        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x.row(i)[feature] <= threshold);
        Some(SplitCandidate {
            feature,
            threshold,
            left,
            right,
        })
    }

    fn fitted(&self) -> HardnessResult<()> {
        if self.nodes.is_empty() {
            return Err(HardnessError::InvalidOperation("Model not fitted".into()));
        }
        Ok(())
    }

    fn leaf_of(&self, row: &[f64]) -> usize {
        let mut id = 0;
        while let NodeKind::Split {
            feature,
            threshold,
            left,
            right,
        } = self.nodes[id].kind
        {
            id = if row[feature] <= threshold { left } else { right };
        }
        id
    }

    /// Id of the leaf every row of `x` falls into.
    pub fn apply(&self, x: &Matrix) -> HardnessResult<Vec<usize>> {
        self.fitted()?;
        Ok(x.row_iter().map(|row| self.leaf_of(row)).collect())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Depth of a node, the root being 0.
    pub fn node_depth(&self, node: usize) -> Option<usize> {
        self.nodes.get(node).map(|n| n.depth)
    }
}

fn gini(counts: &[usize], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / n;
            p * p
        })
        .sum::<f64>()
}
