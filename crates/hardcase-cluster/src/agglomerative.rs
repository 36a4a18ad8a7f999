use hardcase_core::{HardnessError, HardnessResult, Matrix};
use hardcase_neighbors::{minimum_spanning_tree, pairwise_distances};

/// Single-linkage agglomerative clustering cut at a distance threshold.
///
/// Two rows share a flat cluster when they are linked by a chain of rows whose
/// consecutive distances are all `<= distance_threshold`. Those chains are exactly
/// the minimum-spanning-tree edges at or below the threshold, so the tree is built
/// once and the light edges are merged with a union-find.
pub struct AgglomerativeClustering {
    pub distance_threshold: f64,
    labels: Option<Vec<usize>>,
}

impl AgglomerativeClustering {
    pub fn new(distance_threshold: f64) -> Self {
        AgglomerativeClustering {
            distance_threshold,
            labels: None,
        }
    }

    pub fn fit(&mut self, x: &Matrix) -> HardnessResult<()> {
        if !(self.distance_threshold >= 0.0) {
            return Err(HardnessError::InvalidOperation(format!(
                "distance threshold must be non-negative, got {}",
                self.distance_threshold
            )));
        }
        let n = x.rows();
        let dist = pairwise_distances(x)?;
        let edges = minimum_spanning_tree(&dist)?;

        let mut parent: Vec<usize> = (0..n).collect();
        for edge in edges.iter().filter(|e| e.weight <= self.distance_threshold) {
            let ra = find(&mut parent, edge.a);
            let rb = find(&mut parent, edge.b);
            if ra != rb {
                parent[ra.max(rb)] = ra.min(rb);
            }
        }

        // Number clusters in order of their first row.
        let mut cluster_of_root = vec![usize::MAX; n];
        let mut labels = vec![0usize; n];
        let mut next = 0;
        for i in 0..n {
            let root = find(&mut parent, i);
            if cluster_of_root[root] == usize::MAX {
                cluster_of_root[root] = next;
                next += 1;
            }
            labels[i] = cluster_of_root[root];
        }
        self.labels = Some(labels);
        Ok(())
    }

    pub fn labels(&self) -> Option<&[usize]> {
        self.labels.as_deref()
    }

    pub fn fit_predict(&mut self, x: &Matrix) -> HardnessResult<Vec<usize>> {
        self.fit(x)?;
        Ok(self.labels.clone().unwrap_or_default())
    }

    /// Number of rows in each cluster, indexed by cluster label.
    pub fn cluster_sizes(&self) -> Option<Vec<usize>> {
        let labels = self.labels.as_ref()?;
        let n_clusters = labels.iter().max().map_or(0, |m| m + 1);
        let mut sizes = vec![0usize; n_clusters];
        for &l in labels {
            sizes[l] += 1;
        }
        Some(sizes)
    }
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_clusters() {
        let x = Matrix::from_vec2d(&[
            vec![0.0, 0.0],
            vec![0.1, 0.1],
            vec![5.0, 5.0],
            vec![5.1, 5.1],
            vec![20.0, 20.0],
        ])
        .unwrap();

        let mut model = AgglomerativeClustering::new(1.5);
        let labels = model.fit_predict(&x).unwrap();

        assert_eq!(labels, vec![0, 0, 1, 1, 2]);
        assert_eq!(model.cluster_sizes().unwrap(), vec![2, 2, 1]);
    }

    #[test]
    fn test_chaining() {
        // Single linkage chains 0-1-2 even though 0 and 2 are 2.0 apart.
        let x = Matrix::from_vec2d(&[vec![0.0], vec![1.0], vec![2.0]]).unwrap();
        let mut model = AgglomerativeClustering::new(1.0);
        assert_eq!(model.fit_predict(&x).unwrap(), vec![0, 0, 0]);
    }

    #[test]
    fn test_zero_threshold_separates_distinct_points() {
        let x = Matrix::from_vec2d(&[vec![0.0], vec![0.0], vec![1.0]]).unwrap();
        let mut model = AgglomerativeClustering::new(0.0);
        assert_eq!(model.fit_predict(&x).unwrap(), vec![0, 0, 1]);
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let mut model = AgglomerativeClustering::new(-1.0);
        assert!(model.fit(&Matrix::zeros(2, 1)).is_err());
    }
}
