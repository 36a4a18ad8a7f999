use hardcase_core::{HardnessError, HardnessResult, Matrix};
use hardcase_data::{AttributeKind, Dataset, Value};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::imputer::{MeanImputer, MostFrequentImputer};

/// How an encoded column should be modelled by density-based measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Comes from a numeric attribute.
    Continuous,
    /// One-hot indicator of a categorical value.
    Indicator,
}

/// Provenance of one encoded column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedColumn {
    /// Name of the source attribute.
    pub attribute: String,
    /// The categorical value this indicator stands for; `None` for numeric columns.
    pub category: Option<String>,
    pub kind: ColumnKind,
}

/// Fully numeric view of a dataset's feature columns (label excluded).
#[derive(Debug, Clone, PartialEq)]
pub struct Encoded {
    pub matrix: Matrix,
    pub columns: Vec<EncodedColumn>,
}

impl Encoded {
    pub fn n_rows(&self) -> usize {
        self.matrix.rows()
    }

    pub fn n_features(&self) -> usize {
        self.matrix.cols()
    }
}

/// Converts a typed dataset into a numeric matrix.
///
/// - enumerated categorical columns are one-hot encoded over their *declared* values;
///   unknown or missing cells become an all-zero indicator row
/// - open string columns are imputed with their most frequent value, then one-hot
///   encoded over the observed values
/// - numeric columns are mean-imputed (all-missing columns take `numeric_fallback`)
///
/// Columns keep their left-to-right order; the label column is skipped.
#[derive(Debug, Clone)]
pub struct Encoder {
    pub numeric_fallback: f64,
}

impl Encoder {
    pub fn new() -> Self {
        Encoder {
            numeric_fallback: 0.0,
        }
    }

    pub fn encode(&self, dataset: &Dataset) -> HardnessResult<Encoded> {
        let n = dataset.n_rows();
        let mut data_columns: Vec<Vec<f64>> = Vec::new();
        let mut columns: Vec<EncodedColumn> = Vec::new();

        for (j, attr) in dataset.feature_attributes().iter().enumerate() {
            match &attr.kind {
                AttributeKind::Nominal(values) => {
                    for category in values {
                        let indicator = dataset
                            .column_values(j)
                            .map(|v| match v {
                                Value::Text(s) if s == category => 1.0,
                                _ => 0.0,
                            })
                            .collect();
                        data_columns.push(indicator);
                        columns.push(EncodedColumn {
                            attribute: attr.name.clone(),
                            category: Some(category.clone()),
                            kind: ColumnKind::Indicator,
                        });
                    }
                }
                AttributeKind::Text => {
                    let raw: Vec<Option<&str>> = dataset.column_values(j).map(Value::as_text).collect();
                    let imputed = MostFrequentImputer::new().fit_transform(&raw);

                    let mut categories: Vec<&str> = imputed.iter().flatten().map(String::as_str).collect();
                    categories.sort_unstable();
                    categories.dedup();
                    if categories.is_empty() {
                        warn!("string column '{}' has no observed value, it contributes no features", attr.name);
                    }

                    for category in categories {
                        let indicator = imputed
                            .iter()
                            .map(|v| if v.as_deref() == Some(category) { 1.0 } else { 0.0 })
                            .collect();
                        data_columns.push(indicator);
                        columns.push(EncodedColumn {
                            attribute: attr.name.clone(),
                            category: Some(category.to_string()),
                            kind: ColumnKind::Indicator,
                        });
                    }
                }
                AttributeKind::Numeric => {
                    let raw: Vec<Option<f64>> = dataset.column_values(j).map(Value::as_number).collect();
                    let mut imputer = MeanImputer::new(self.numeric_fallback);
                    let filled = imputer.fit_transform(&raw);
                    if imputer.mean.is_none() && n > 0 {
                        warn!(
                            "numeric column '{}' is entirely missing, using {}",
                            attr.name, self.numeric_fallback
                        );
                    }
                    data_columns.push(filled);
                    columns.push(EncodedColumn {
                        attribute: attr.name.clone(),
                        category: None,
                        kind: ColumnKind::Continuous,
                    });
                }
                AttributeKind::Other(kind) => {
                    return Err(HardnessError::UnsupportedAttributeKind {
                        column: attr.name.clone(),
                        kind: kind.clone(),
                    });
                }
            }
        }

        let matrix = Matrix::from_columns(n, &data_columns)?;
        Ok(Encoded { matrix, columns })
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}
