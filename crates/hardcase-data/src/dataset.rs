use hardcase_core::{HardnessError, HardnessResult};
use serde::{Deserialize, Serialize};

use crate::labels::Labels;

/// Declared kind of a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeKind {
    /// Continuous real or integer values.
    Numeric,
    /// Categorical column with a fixed, declared value set.
    Nominal(Vec<String>),
    /// Categorical column with open-ended string values.
    Text,
    /// Any other declaration the loader passed through (e.g. `date`).
    /// Encoding such a column is a configuration error.
    Other(String),
}

impl AttributeKind {
    /// Map a loader's textual type declaration onto a kind.
    pub fn from_declaration(declaration: &str) -> Self {
        match declaration.trim().to_ascii_lowercase().as_str() {
            "numeric" | "real" | "integer" => AttributeKind::Numeric,
            "string" => AttributeKind::Text,
            _ => AttributeKind::Other(declaration.trim().to_string()),
        }
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self, AttributeKind::Nominal(_) | AttributeKind::Text)
    }

    /// Short name used in error messages and encoded column metadata.
    pub fn describe(&self) -> String {
        match self {
            AttributeKind::Numeric => "numeric".to_string(),
            AttributeKind::Nominal(values) => format!("{{{}}}", values.join(",")),
            AttributeKind::Text => "string".to_string(),
            AttributeKind::Other(decl) => decl.clone(),
        }
    }
}

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub kind: AttributeKind,
}

impl Attribute {
    pub fn new(name: impl Into<String>, kind: AttributeKind) -> Self {
        Attribute {
            name: name.into(),
            kind,
        }
    }

    pub fn numeric(name: impl Into<String>) -> Self {
        Attribute::new(name, AttributeKind::Numeric)
    }

    pub fn nominal<S: Into<String>>(name: impl Into<String>, values: impl IntoIterator<Item = S>) -> Self {
        Attribute::new(
            name,
            AttributeKind::Nominal(values.into_iter().map(Into::into).collect()),
        )
    }

    pub fn text(name: impl Into<String>) -> Self {
        Attribute::new(name, AttributeKind::Text)
    }
}

/// One cell of a typed dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Number(f64),
    Text(String),
    Missing,
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        if v.is_nan() {
            Value::Missing
        } else {
            Value::Number(v)
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

/// In-memory typed table: ordered rows, named/typed columns, the last column is the class label.
///
/// Immutable once built; measures only ever borrow it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    attributes: Vec<Attribute>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    /// Build a dataset, checking that every row has one value per column and that each
    /// value matches its column's declared kind (or is missing).
    pub fn new(attributes: Vec<Attribute>, rows: Vec<Vec<Value>>) -> HardnessResult<Self> {
        let label = attributes.last().ok_or_else(|| {
            HardnessError::InvalidOperation("A dataset needs at least the label column".into())
        })?;
        if !label.kind.is_categorical() {
            return Err(HardnessError::UnsupportedAttributeKind {
                column: label.name.clone(),
                kind: label.kind.describe(),
            });
        }

        let m = attributes.len();
        for (i, row) in rows.iter().enumerate() {
            if row.len() != m {
                return Err(HardnessError::RowArity {
                    row: i,
                    expected: m,
                    got: row.len(),
                });
            }
            for (attr, value) in attributes.iter().zip(row) {
                let ok = match (&attr.kind, value) {
                    (_, Value::Missing) => true,
                    (AttributeKind::Numeric, Value::Number(_)) => true,
                    (AttributeKind::Nominal(_) | AttributeKind::Text, Value::Text(_)) => true,
                    (AttributeKind::Other(_), _) => true,
                    _ => false,
                };
                if !ok {
                    return Err(HardnessError::KindMismatch {
                        row: i,
                        column: attr.name.clone(),
                    });
                }
            }
        }

        Ok(Dataset { attributes, rows })
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_attributes(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Every attribute except the class label.
    pub fn feature_attributes(&self) -> &[Attribute] {
        &self.attributes[..self.attributes.len() - 1]
    }

    pub fn label_attribute(&self) -> &Attribute {
        &self.attributes[self.attributes.len() - 1]
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn value(&self, row: usize, col: usize) -> HardnessResult<&Value> {
        let r = self.rows.get(row).ok_or(HardnessError::IndexOutOfBounds {
            index: row,
            axis: 0,
            size: self.rows.len(),
        })?;
        r.get(col).ok_or(HardnessError::IndexOutOfBounds {
            index: col,
            axis: 1,
            size: self.attributes.len(),
        })
    }

    /// Iterate over the values of column `col`, top to bottom.
    pub fn column_values(&self, col: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().map(move |r| &r[col])
    }

    /// The row-aligned label vector. Fails on the first row without a label.
    pub fn labels(&self) -> HardnessResult<Labels> {
        let label_col = self.attributes.len() - 1;
        let mut values = Vec::with_capacity(self.rows.len());
        for (i, row) in self.rows.iter().enumerate() {
            match &row[label_col] {
                Value::Text(s) => values.push(s.as_str()),
                _ => return Err(HardnessError::MissingLabel { row: i }),
            }
        }
        Ok(Labels::from_values(&values))
    }

    /// Copy of the dataset holding only the given rows, column metadata intact.
    pub fn select_rows(&self, indices: &[usize]) -> HardnessResult<Dataset> {
        let mut rows = Vec::with_capacity(indices.len());
        for &i in indices {
            let row = self.rows.get(i).ok_or(HardnessError::IndexOutOfBounds {
                index: i,
                axis: 0,
                size: self.rows.len(),
            })?;
            rows.push(row.clone());
        }
        Ok(Dataset {
            attributes: self.attributes.clone(),
            rows,
        })
    }

    /// Copy of the dataset with a numeric column inserted just before the label column.
    pub fn with_score_column(&self, name: &str, values: &[f64]) -> HardnessResult<Dataset> {
        if values.len() != self.rows.len() {
            return Err(HardnessError::ShapeMismatch {
                expected: vec![self.rows.len()],
                got: vec![values.len()],
            });
        }
        let at = self.attributes.len() - 1;
        let mut attributes = self.attributes.clone();
        attributes.insert(at, Attribute::numeric(name));
        let rows = self
            .rows
            .iter()
            .zip(values)
            .map(|(row, &v)| {
                let mut row = row.clone();
                row.insert(at, Value::from(v));
                row
            })
            .collect();
        Ok(Dataset { attributes, rows })
    }
}
