use hardcase_core::{HardnessError, HardnessResult, Matrix};
use std::cmp::Ordering;

use crate::distance::{distances_to, euclidean};

/// One neighbor of a query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub distance: f64,
}

impl Neighbor {
    /// Ascending by distance, ties broken by the lower row index.
    pub fn order(&self, other: &Neighbor) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.index.cmp(&other.index))
    }
}

/// The `k` closest candidates, sorted ascending. `k` larger than the candidate
/// count returns every candidate.
pub fn select_nearest(candidates: &[Neighbor], k: usize) -> Vec<Neighbor> {
    let mut selected = candidates.to_vec();
    if k == 0 {
        return Vec::new();
    }
    if k < selected.len() {
        selected.select_nth_unstable_by(k - 1, Neighbor::order);
        selected.truncate(k);
    }
    selected.sort_by(Neighbor::order);
    selected
}

/// Brute-force Euclidean nearest-neighbor index over the rows of a matrix.
pub struct NearestNeighbors {
    pub n_neighbors: usize,
    x_train: Option<Matrix>,
}

impl NearestNeighbors {
    pub fn new(n_neighbors: usize) -> Self {
        NearestNeighbors {
            n_neighbors,
            x_train: None,
        }
    }

    pub fn fit(&mut self, x: &Matrix) -> HardnessResult<()> {
        self.x_train = Some(x.clone());
        Ok(())
    }

    fn train(&self) -> HardnessResult<&Matrix> {
        self.x_train
            .as_ref()
            .ok_or_else(|| HardnessError::InvalidOperation("Model not fitted".into()))
    }

    /// Every other training row as a neighbor candidate of training row `row`.
    pub fn candidates_of_row(&self, row: usize) -> HardnessResult<Vec<Neighbor>> {
        let x = self.train()?;
        if row >= x.rows() {
            return Err(HardnessError::IndexOutOfBounds {
                index: row,
                axis: 0,
                size: x.rows(),
            });
        }
        let point = x.row(row);
        Ok((0..x.rows())
            .filter(|&j| j != row)
            .map(|j| Neighbor {
                index: j,
                distance: euclidean(point, x.row(j)),
            })
            .collect())
    }

    /// The `k` nearest neighbors of training row `row`, the row itself excluded.
    pub fn neighbors_of_row(&self, row: usize, k: usize) -> HardnessResult<Vec<Neighbor>> {
        let n = self.train()?.rows();
        if k >= n {
            return Err(HardnessError::TooManyNeighbors { k, n });
        }
        Ok(select_nearest(&self.candidates_of_row(row)?, k))
    }

    /// The `k` nearest training rows to an arbitrary point.
    pub fn query(&self, point: &[f64], k: usize) -> HardnessResult<Vec<Neighbor>> {
        let x = self.train()?;
        if k > x.rows() {
            return Err(HardnessError::TooManyNeighbors { k, n: x.rows() });
        }
        let candidates: Vec<Neighbor> = distances_to(x, point)?
            .into_iter()
            .enumerate()
            .map(|(index, distance)| Neighbor { index, distance })
            .collect();
        Ok(select_nearest(&candidates, k))
    }

    /// `n_neighbors` nearest neighbors of every training row, each row excluding itself.
    pub fn kneighbors(&self) -> HardnessResult<Vec<Vec<Neighbor>>> {
        let n = self.train()?.rows();
        (0..n).map(|i| self.neighbors_of_row(i, self.n_neighbors)).collect()
    }
}
