use hardcase_core::{HardnessError, HardnessResult, Matrix};

use crate::distance::distances_to;
use crate::knn::{select_nearest, NearestNeighbors, Neighbor};

/// Added to mean reachability distances so duplicated points keep a finite density.
const REACH_EPSILON: f64 = 1e-10;

struct FittedLof {
    k: usize,
    neighbors: Vec<Vec<Neighbor>>,
    factors: Vec<f64>,
    x: Matrix,
}

/// Local Outlier Factor (Breunig et al. 2000).
///
/// Scores are the raw factors: about 1 for inliers, larger for outliers, always
/// positive. The neighborhood size is `min(n_neighbors, n - 1)`.
pub struct LocalOutlierFactor {
    pub n_neighbors: usize,
    fitted: Option<FittedLof>,
}

impl LocalOutlierFactor {
    pub fn new(n_neighbors: usize) -> Self {
        LocalOutlierFactor {
            n_neighbors,
            fitted: None,
        }
    }

    pub fn fit(&mut self, x: &Matrix) -> HardnessResult<()> {
        let n = x.rows();
        if n < 2 {
            return Err(HardnessError::InvalidOperation(format!(
                "Local outlier factor needs at least 2 rows, got {n}"
            )));
        }
        if self.n_neighbors == 0 {
            return Err(HardnessError::InvalidOperation(
                "Local outlier factor needs n_neighbors >= 1".into(),
            ));
        }
        let k = self.n_neighbors.min(n - 1);

        let mut index = NearestNeighbors::new(k);
        index.fit(x)?;
        let neighbors = index.kneighbors()?;
        let k_distance: Vec<f64> = neighbors.iter().map(|nb| nb[k - 1].distance).collect();

        let lrd: Vec<f64> = neighbors
            .iter()
            .map(|nb| {
                let reach: f64 = nb
                    .iter()
                    .map(|o| k_distance[o.index].max(o.distance))
                    .sum();
                1.0 / (reach / k as f64 + REACH_EPSILON)
            })
            .collect();

        let factors = neighbors
            .iter()
            .enumerate()
            .map(|(i, nb)| {
                let mean_lrd: f64 = nb.iter().map(|o| lrd[o.index]).sum::<f64>() / k as f64;
                mean_lrd / lrd[i]
            })
            .collect();

        self.fitted = Some(FittedLof {
            k,
            neighbors,
            factors,
            x: x.clone(),
        });
        Ok(())
    }

    fn state(&self) -> HardnessResult<&FittedLof> {
        self.fitted
            .as_ref()
            .ok_or_else(|| HardnessError::InvalidOperation("Model not fitted".into()))
    }

    /// Outlier factor of every fitted row.
    pub fn outlier_factors(&self) -> HardnessResult<&[f64]> {
        Ok(&self.state()?.factors)
    }

    /// Outlier factor `point` would get if it were appended to the fitted rows and
    /// the model refit, without refitting.
    ///
    /// Only the neighborhoods the new point can enter are re-evaluated. Requires the
    /// fitted set to hold more than `n_neighbors` rows, so the neighborhood size is the
    /// same before and after the insertion.
    pub fn score_inserted(&self, point: &[f64]) -> HardnessResult<f64> {
        let state = self.state()?;
        let k = state.k;
        if k != self.n_neighbors {
            return Err(HardnessError::TooManyNeighbors {
                k: self.n_neighbors,
                n: state.x.rows(),
            });
        }

        let to_point = distances_to(&state.x, point)?;
        let candidates: Vec<Neighbor> = to_point
            .iter()
            .enumerate()
            .map(|(index, &distance)| Neighbor { index, distance })
            .collect();
        let point_neighbors = select_nearest(&candidates, k);
        let point_k_distance = point_neighbors[k - 1].distance;

        // k-distance of a fitted row once the point has joined the set.
        let k_distance_after = |o: usize| -> f64 {
            let nb = &state.neighbors[o];
            let d = to_point[o];
            if d < nb[k - 1].distance {
                if k >= 2 {
                    d.max(nb[k - 2].distance)
                } else {
                    d
                }
            } else {
                nb[k - 1].distance
            }
        };

        let lrd_after = |o: usize| -> f64 {
            let nb = &state.neighbors[o];
            let d = to_point[o];
            let reach: f64 = if d < nb[k - 1].distance {
                let kept: f64 = nb[..k - 1]
                    .iter()
                    .map(|p| k_distance_after(p.index).max(p.distance))
                    .sum();
                kept + point_k_distance.max(d)
            } else {
                nb.iter()
                    .map(|p| k_distance_after(p.index).max(p.distance))
                    .sum()
            };
            1.0 / (reach / k as f64 + REACH_EPSILON)
        };

        let reach: f64 = point_neighbors
            .iter()
            .map(|o| k_distance_after(o.index).max(o.distance))
            .sum();
        let point_lrd = 1.0 / (reach / k as f64 + REACH_EPSILON);

        let mean_lrd: f64 =
            point_neighbors.iter().map(|o| lrd_after(o.index)).sum::<f64>() / k as f64;
        Ok(mean_lrd / point_lrd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn grid_with_outlier() -> Matrix {
        Matrix::from_vec2d(&[
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
            vec![0.5, 0.5],
            vec![8.0, 8.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_outlier_has_largest_factor() {
        let mut lof = LocalOutlierFactor::new(3);
        lof.fit(&grid_with_outlier()).unwrap();
        let f = lof.outlier_factors().unwrap();
        let max_idx = f
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(max_idx, 5);
        assert!(f[5] > 2.0);
        assert!(f.iter().all(|v| v.is_finite() && *v > 0.0));
    }

    #[test]
    fn test_duplicates_stay_finite() {
        let x = Matrix::from_vec2d(&[vec![1.0], vec![1.0], vec![1.0]]).unwrap();
        let mut lof = LocalOutlierFactor::new(2);
        lof.fit(&x).unwrap();
        for &v in lof.outlier_factors().unwrap() {
            assert_relative_eq!(v, 1.0);
        }
    }

    fn with_row(base: &Matrix, point: &[f64]) -> Matrix {
        let rows: Vec<Vec<f64>> = base
            .row_iter()
            .map(<[f64]>::to_vec)
            .chain(std::iter::once(point.to_vec()))
            .collect();
        Matrix::from_vec2d(&rows).unwrap()
    }

    #[test]
    fn test_score_inserted_matches_refit() {
        let base = grid_with_outlier();
        let point = [0.2, 0.9];

        let mut lof = LocalOutlierFactor::new(2);
        lof.fit(&base).unwrap();
        let incremental = lof.score_inserted(&point).unwrap();

        let augmented = with_row(&base, &point);
        let mut refit = LocalOutlierFactor::new(2);
        refit.fit(&augmented).unwrap();
        let expected = refit.outlier_factors().unwrap()[6];

        assert_relative_eq!(incremental, expected, epsilon = 1e-9);
    }

    #[test]
    fn test_score_inserted_far_point_matches_refit() {
        let base = grid_with_outlier();
        let point = [20.0, -3.0];

        let mut lof = LocalOutlierFactor::new(3);
        lof.fit(&base).unwrap();
        let incremental = lof.score_inserted(&point).unwrap();

        let augmented = with_row(&base, &point);
        let mut refit = LocalOutlierFactor::new(3);
        refit.fit(&augmented).unwrap();

        assert_relative_eq!(incremental, refit.outlier_factors().unwrap()[6], epsilon = 1e-9);
    }

    #[test]
    fn test_score_inserted_needs_full_neighborhood() {
        let x = Matrix::from_vec2d(&[vec![0.0], vec![1.0]]).unwrap();
        let mut lof = LocalOutlierFactor::new(5);
        lof.fit(&x).unwrap();
        assert!(lof.score_inserted(&[0.5]).is_err());
    }

    #[test]
    fn test_too_few_rows() {
        let mut lof = LocalOutlierFactor::new(2);
        assert!(lof.fit(&Matrix::from_vec2d(&[vec![1.0]]).unwrap()).is_err());
    }
}
