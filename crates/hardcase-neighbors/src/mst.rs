use hardcase_core::{HardnessError, HardnessResult, Matrix};

/// An undirected weighted edge between two rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
    pub weight: f64,
}

/// Minimum spanning tree of the complete graph described by a square distance matrix
/// (Prim's algorithm, O(n²)).
///
/// Vertex 0 is the root. Among equally light candidate edges the vertex with the
/// lowest index joins first, so the tree is reproducible. Returns `n - 1` edges,
/// none for fewer than two vertices.
pub fn minimum_spanning_tree(dist: &Matrix) -> HardnessResult<Vec<Edge>> {
    let (n, m) = dist.shape();
    if n != m {
        return Err(HardnessError::ShapeMismatch {
            expected: vec![n, n],
            got: vec![n, m],
        });
    }
    if n < 2 {
        return Ok(Vec::new());
    }

    let mut in_tree = vec![false; n];
    let mut best = vec![f64::INFINITY; n];
    let mut parent = vec![0usize; n];
    let mut edges = Vec::with_capacity(n - 1);

    in_tree[0] = true;
    for j in 1..n {
        best[j] = dist.row(0)[j];
    }

    for _ in 1..n {
        let mut next = None;
        for j in 0..n {
            if in_tree[j] {
                continue;
            }
            match next {
                Some(k) if best[j] >= best[k] => {}
                _ => next = Some(j),
            }
        }
        let Some(v) = next else { break };

        in_tree[v] = true;
        edges.push(Edge {
            a: parent[v],
            b: v,
            weight: best[v],
        });

        let row = dist.row(v);
        for j in 0..n {
            if !in_tree[j] && row[j] < best[j] {
                best[j] = row[j];
                parent[j] = v;
            }
        }
    }

    Ok(edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::pairwise_distances;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_two_clusters_on_a_line() {
        let x = Matrix::from_vec2d(&[vec![0.0], vec![1.0], vec![10.0], vec![11.0]]).unwrap();
        let edges = minimum_spanning_tree(&pairwise_distances(&x).unwrap()).unwrap();
        assert_eq!(edges.len(), 3);
        let total: f64 = edges.iter().map(|e| e.weight).sum();
        assert_abs_diff_eq!(total, 11.0);
        assert!(edges.iter().any(|e| (e.a, e.b) == (1, 2) && e.weight == 9.0));
    }

    #[test]
    fn test_degenerate_sizes() {
        assert!(minimum_spanning_tree(&Matrix::zeros(1, 1)).unwrap().is_empty());
        assert!(minimum_spanning_tree(&Matrix::zeros(0, 0)).unwrap().is_empty());
        assert!(minimum_spanning_tree(&Matrix::zeros(2, 3)).is_err());
    }

    #[test]
    fn test_equal_weights_pick_lowest_index() {
        // Every pair is at distance 1, so vertex 0 becomes everyone's parent in order.
        let x = Matrix::from_vec2d(&[
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
        ])
        .unwrap();
        let edges = minimum_spanning_tree(&pairwise_distances(&x).unwrap()).unwrap();
        let pairs: Vec<(usize, usize)> = edges.iter().map(|e| (e.a, e.b)).collect();
        assert_eq!(pairs, vec![(0, 1), (0, 2)]);
    }
}
