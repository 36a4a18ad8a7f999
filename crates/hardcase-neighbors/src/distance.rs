use hardcase_core::{HardnessError, HardnessResult, Matrix};

/// Euclidean distance between two equally long points.
pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

/// Distances from `point` to every row of `x`.
pub fn distances_to(x: &Matrix, point: &[f64]) -> HardnessResult<Vec<f64>> {
    if point.len() != x.cols() {
        return Err(HardnessError::ShapeMismatch {
            expected: vec![x.cols()],
            got: vec![point.len()],
        });
    }
    Ok(x.row_iter().map(|row| euclidean(row, point)).collect())
}

/// Full symmetric N×N Euclidean distance matrix.
pub fn pairwise_distances(x: &Matrix) -> HardnessResult<Matrix> {
    let n = x.rows();
    let mut data = vec![0.0f64; n * n];
    for i in 0..n {
        for j in i + 1..n {
            let d = euclidean(x.row(i), x.row(j));
            data[i * n + j] = d;
            data[j * n + i] = d;
        }
    }
    Matrix::new(data, n, n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_euclidean() {
        assert_abs_diff_eq!(euclidean(&[0.0, 0.0], &[3.0, 4.0]), 5.0);
    }

    #[test]
    fn test_pairwise_is_symmetric() {
        let x = Matrix::from_vec2d(&[vec![0.0], vec![1.0], vec![10.0]]).unwrap();
        let d = pairwise_distances(&x).unwrap();
        assert_eq!(d.shape(), (3, 3));
        assert_abs_diff_eq!(d.get(0, 2).unwrap(), 10.0);
        assert_abs_diff_eq!(d.get(2, 1).unwrap(), 9.0);
        assert_eq!(d.get(1, 1).unwrap(), 0.0);
    }

    #[test]
    fn test_distances_to_checks_width() {
        let x = Matrix::from_vec2d(&[vec![0.0, 1.0]]).unwrap();
        assert!(distances_to(&x, &[1.0]).is_err());
        assert_eq!(distances_to(&x, &[0.0, 1.0]).unwrap(), vec![0.0]);
    }
}
