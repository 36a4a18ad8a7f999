use crate::error::{HardnessError, HardnessResult};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense two-dimensional matrix of `f64`, the numeric encoding every measure works on.
///
/// Stores data in a flat contiguous `Vec<f64>` with row-major (C-order) layout.
/// Row `i` always corresponds to row `i` of the dataset it was encoded from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

// ─── Construction ───────────────────────────────────────────────────────────

impl Matrix {
    /// Create a matrix from raw row-major data.
    pub fn new(data: Vec<f64>, rows: usize, cols: usize) -> HardnessResult<Self> {
        if data.len() != rows * cols {
            return Err(HardnessError::ShapeMismatch {
                expected: vec![rows, cols],
                got: vec![data.len()],
            });
        }
        Ok(Matrix { data, rows, cols })
    }

    /// Create a matrix filled with zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Matrix {
            data: vec![0.0; rows * cols],
            rows,
            cols,
        }
    }

    /// Create a matrix from a nested slice of rows.
    pub fn from_vec2d(data: &[Vec<f64>]) -> HardnessResult<Self> {
        if data.is_empty() {
            return Ok(Matrix::zeros(0, 0));
        }
        let rows = data.len();
        let cols = data[0].len();
        for row in data {
            if row.len() != cols {
                return Err(HardnessError::InvalidOperation(
                    "All rows must have the same number of columns".to_string(),
                ));
            }
        }
        let flat: Vec<f64> = data.iter().flat_map(|r| r.iter().copied()).collect();
        Matrix::new(flat, rows, cols)
    }

    /// Create a matrix by placing equally long columns side by side.
    pub fn from_columns(rows: usize, columns: &[Vec<f64>]) -> HardnessResult<Self> {
        let cols = columns.len();
        let mut data = vec![0.0; rows * cols];
        for (j, column) in columns.iter().enumerate() {
            if column.len() != rows {
                return Err(HardnessError::ShapeMismatch {
                    expected: vec![rows],
                    got: vec![column.len()],
                });
            }
            for (i, &v) in column.iter().enumerate() {
                data[i * cols + j] = v;
            }
        }
        Ok(Matrix { data, rows, cols })
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Bounds-checked element access.
    pub fn get(&self, row: usize, col: usize) -> HardnessResult<f64> {
        self.check_row(row)?;
        if col >= self.cols {
            return Err(HardnessError::IndexOutOfBounds {
                index: col,
                axis: 1,
                size: self.cols,
            });
        }
        Ok(self.data[row * self.cols + col])
    }

    /// Borrow row `i` as a slice.
    ///
    /// # Panics
    /// Panics if `i >= self.rows()`, like slice indexing.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Iterate over the rows as slices.
    pub fn row_iter(&self) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.rows).map(move |i| self.row(i))
    }

    /// Copy column `j` out.
    pub fn column(&self, j: usize) -> HardnessResult<Vec<f64>> {
        if j >= self.cols {
            return Err(HardnessError::IndexOutOfBounds {
                index: j,
                axis: 1,
                size: self.cols,
            });
        }
        Ok((0..self.rows).map(|i| self.data[i * self.cols + j]).collect())
    }

    fn check_row(&self, row: usize) -> HardnessResult<()> {
        if row >= self.rows {
            return Err(HardnessError::IndexOutOfBounds {
                index: row,
                axis: 0,
                size: self.rows,
            });
        }
        Ok(())
    }

    // ─── Row selection ──────────────────────────────────────────────────────

    /// New matrix holding the given rows, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> HardnessResult<Matrix> {
        let mut data = Vec::with_capacity(indices.len() * self.cols);
        for &i in indices {
            self.check_row(i)?;
            data.extend_from_slice(self.row(i));
        }
        Matrix::new(data, indices.len(), self.cols)
    }

    /// Minimum and maximum of column `j` over the given rows.
    /// Returns `None` when `rows` is empty.
    pub fn column_range(&self, j: usize, rows: &[usize]) -> Option<(f64, f64)> {
        let mut iter = rows.iter().map(|&i| self.data[i * self.cols + j]);
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Matrix({}x{})", self.rows, self.cols)?;
        for row in self.row_iter() {
            let cells: Vec<String> = row.iter().map(|v| format!("{v:.4}")).collect();
            writeln!(f, "  [{}]", cells.join(", "))?;
        }
        Ok(())
    }
}
