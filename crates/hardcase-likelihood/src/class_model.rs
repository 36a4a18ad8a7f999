use std::collections::HashMap;

use hardcase_core::{HardnessError, HardnessResult, Matrix};
use hardcase_preprocessing::ColumnKind;

use crate::kde::{Kernel, KernelDensity};

/// Probability model of one encoded column within one class.
#[derive(Debug, Clone)]
pub enum AttributeModel {
    /// Kernel density fit on the class's values of a continuous column.
    Continuous(KernelDensity),
    /// Frequency table of the class's exact values of an indicator column.
    Discrete {
        counts: HashMap<u64, usize>,
        total: usize,
    },
}

/// Key of a value in a frequency table; `-0.0` and `0.0` share a key.
fn value_key(value: f64) -> u64 {
    if value == 0.0 {
        0.0f64.to_bits()
    } else {
        value.to_bits()
    }
}

impl AttributeModel {
    pub fn fit(
        kind: ColumnKind,
        values: &[f64],
        bandwidth: f64,
        kernel: Kernel,
    ) -> HardnessResult<Self> {
        match kind {
            ColumnKind::Continuous => {
                let mut kde = KernelDensity::new(bandwidth, kernel);
                kde.fit(values)?;
                Ok(AttributeModel::Continuous(kde))
            }
            ColumnKind::Indicator => {
                let mut counts = HashMap::new();
                for &v in values {
                    *counts.entry(value_key(v)).or_insert(0) += 1;
                }
                Ok(AttributeModel::Discrete {
                    counts,
                    total: values.len(),
                })
            }
        }
    }

    /// Density (continuous) or relative frequency (discrete) of `value`.
    /// A value never seen by a discrete model has probability 0.
    pub fn probability(&self, value: f64) -> HardnessResult<f64> {
        match self {
            AttributeModel::Continuous(kde) => kde.density(value),
            AttributeModel::Discrete { counts, total } => {
                if *total == 0 {
                    return Ok(0.0);
                }
                let count = counts.get(&value_key(value)).copied().unwrap_or(0);
                Ok(count as f64 / *total as f64)
            }
        }
    }
}

/// Per-class, per-column attribute models, fit once and queried for any row
/// against any class.
#[derive(Debug, Clone)]
pub struct ClassModels {
    pub bandwidth: f64,
    pub kernel: Kernel,
    models: Vec<Vec<AttributeModel>>,
}

impl ClassModels {
    pub fn new(bandwidth: f64, kernel: Kernel) -> Self {
        ClassModels {
            bandwidth,
            kernel,
            models: Vec::new(),
        }
    }

    /// Fit one model per (class, column) on the rows of that class.
    ///
    /// `kinds[j]` tells how column `j` is modelled. Every class in `0..n_classes`
    /// must own at least one row.
    pub fn fit(
        &mut self,
        x: &Matrix,
        kinds: &[ColumnKind],
        labels: &[usize],
        n_classes: usize,
    ) -> HardnessResult<()> {
        if kinds.len() != x.cols() {
            return Err(HardnessError::ShapeMismatch {
                expected: vec![x.cols()],
                got: vec![kinds.len()],
            });
        }
        if labels.len() != x.rows() {
            return Err(HardnessError::ShapeMismatch {
                expected: vec![x.rows()],
                got: vec![labels.len()],
            });
        }

        let mut members = vec![Vec::new(); n_classes];
        for (i, &c) in labels.iter().enumerate() {
            members
                .get_mut(c)
                .ok_or(HardnessError::IndexOutOfBounds {
                    index: c,
                    axis: 0,
                    size: n_classes,
                })?
                .push(i);
        }

        let mut models = Vec::with_capacity(n_classes);
        for rows in &members {
            let class_x = x.select_rows(rows)?;
            let mut per_column = Vec::with_capacity(kinds.len());
            for (j, &kind) in kinds.iter().enumerate() {
                let values = class_x.column(j)?;
                per_column.push(AttributeModel::fit(
                    kind,
                    &values,
                    self.bandwidth,
                    self.kernel,
                )?);
            }
            models.push(per_column);
        }
        self.models = models;
        Ok(())
    }

    pub fn n_classes(&self) -> usize {
        self.models.len()
    }

    /// Product over columns of the probability of `row`'s values under `class`.
    pub fn likelihood(&self, row: &[f64], class: usize) -> HardnessResult<f64> {
        let models = self.models.get(class).ok_or(HardnessError::IndexOutOfBounds {
            index: class,
            axis: 0,
            size: self.models.len(),
        })?;
        if row.len() != models.len() {
            return Err(HardnessError::ShapeMismatch {
                expected: vec![models.len()],
                got: vec![row.len()],
            });
        }
        let mut product = 1.0;
        for (model, &value) in models.iter().zip(row) {
            product *= model.probability(value)?;
            if product == 0.0 {
                break;
            }
        }
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_discrete_frequencies() {
        let model = AttributeModel::fit(
            ColumnKind::Indicator,
            &[1.0, 0.0, 1.0, 1.0],
            1.0,
            Kernel::Gaussian,
        )
        .unwrap();
        assert_relative_eq!(model.probability(1.0).unwrap(), 0.75);
        assert_relative_eq!(model.probability(-0.0).unwrap(), 0.25);
        assert_eq!(model.probability(2.0).unwrap(), 0.0);
    }

    #[test]
    fn test_class_likelihood_product() {
        // Column 0 continuous, column 1 indicator.
        let x = Matrix::from_vec2d(&[
            vec![0.0, 1.0],
            vec![0.0, 0.0],
            vec![5.0, 1.0],
        ])
        .unwrap();
        let kinds = [ColumnKind::Continuous, ColumnKind::Indicator];
        let mut models = ClassModels::new(1.0, Kernel::Tophat);
        models.fit(&x, &kinds, &[0, 0, 1], 2).unwrap();

        assert_eq!(models.n_classes(), 2);
        // Class 0: density 0.5 at 0.0, indicator 1.0 seen in half the rows.
        assert_relative_eq!(models.likelihood(&[0.0, 1.0], 0).unwrap(), 0.25);
        // Class 1 never saw indicator 0.0.
        assert_eq!(models.likelihood(&[5.0, 0.0], 1).unwrap(), 0.0);
        assert_relative_eq!(models.likelihood(&[5.0, 1.0], 1).unwrap(), 0.5);
    }

    #[test]
    fn test_empty_class_rejected() {
        let x = Matrix::from_vec2d(&[vec![1.0]]).unwrap();
        let mut models = ClassModels::new(1.0, Kernel::Gaussian);
        assert!(models.fit(&x, &[ColumnKind::Continuous], &[0], 2).is_err());
    }

    #[test]
    fn test_row_width_checked() {
        let x = Matrix::from_vec2d(&[vec![1.0]]).unwrap();
        let mut models = ClassModels::new(1.0, Kernel::Gaussian);
        models.fit(&x, &[ColumnKind::Continuous], &[0], 1).unwrap();
        assert!(models.likelihood(&[1.0, 2.0], 0).is_err());
        assert!(models.likelihood(&[1.0], 3).is_err());
    }
}
