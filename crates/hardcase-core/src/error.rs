use thiserror::Error;

/// Error type shared by every hardcase crate.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HardnessError {
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("Index out of bounds: index {index} for axis {axis} with size {size}")]
    IndexOutOfBounds {
        index: usize,
        axis: usize,
        size: usize,
    },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("Row {row} has {got} values, expected {expected}")]
    RowArity {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("Value in row {row} does not match the declared kind of column '{column}'")]
    KindMismatch { row: usize, column: String },

    #[error("Row {row} has no class label")]
    MissingLabel { row: usize },

    #[error("Unknown measure '{name}'. Supported measures are: {supported}")]
    UnknownMeasure { name: String, supported: String },

    #[error("Column '{column}' has unsupported attribute kind '{kind}'")]
    UnsupportedAttributeKind { column: String, kind: String },

    #[error("Invalid parameter for {measure}: {reason}")]
    InvalidParameter { measure: String, reason: String },

    #[error("Neighbor count {k} must be smaller than the number of rows {n}")]
    TooManyNeighbors { k: usize, n: usize },

    #[error("{measure} requires {expected} classes, found {found}")]
    ClassCount {
        measure: String,
        expected: String,
        found: usize,
    },

    #[error("Class '{class}' has {size} members, at least {required} are required")]
    ClassTooSmall {
        class: String,
        size: usize,
        required: usize,
    },

    #[error("Computation interrupted")]
    Interrupted,
}

impl HardnessError {
    /// Whether the error stems from configuration rather than the data itself.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            HardnessError::UnknownMeasure { .. }
                | HardnessError::UnsupportedAttributeKind { .. }
                | HardnessError::InvalidParameter { .. }
                | HardnessError::TooManyNeighbors { .. }
                | HardnessError::ClassCount { .. }
        )
    }
}

pub type HardnessResult<T> = Result<T, HardnessError>;
