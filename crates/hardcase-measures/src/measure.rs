use std::sync::OnceLock;

use hardcase_core::{HardnessError, HardnessResult};
use hardcase_data::{Dataset, Labels};
use hardcase_preprocessing::{Encoded, Encoder};
use serde::{Deserialize, Serialize};

use crate::interrupt::Interrupt;

/// Declared type of a measure's output column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DataKind {
    #[default]
    Real,
}

/// A named score column, one value per dataset row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub name: String,
    pub kind: DataKind,
    pub values: Vec<f64>,
}

impl Scores {
    pub fn per_row(name: impl Into<String>, values: Vec<f64>) -> Self {
        Scores {
            name: name.into(),
            kind: DataKind::Real,
            values,
        }
    }

    /// A dataset-level value repeated for every row.
    pub fn broadcast(name: impl Into<String>, value: f64, n_rows: usize) -> Self {
        Self::per_row(name, vec![value; n_rows])
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Everything a measure reads: the dataset, its label vector, the lazily built
/// numeric encoding and the cancellation flag.
///
/// The encoding is computed at most once per input and shared by every measure
/// evaluated against it, including measures running on other threads. A failed
/// encoding is kept too, so every later caller sees the same error.
pub struct MeasureInput<'a> {
    dataset: &'a Dataset,
    labels: Labels,
    encoder: Encoder,
    encoded: OnceLock<HardnessResult<Encoded>>,
    interrupt: Interrupt,
}

impl<'a> MeasureInput<'a> {
    pub fn new(dataset: &'a Dataset) -> HardnessResult<Self> {
        if dataset.is_empty() {
            return Err(HardnessError::EmptyDataset);
        }
        Ok(MeasureInput {
            dataset,
            labels: dataset.labels()?,
            encoder: Encoder::new(),
            encoded: OnceLock::new(),
            interrupt: Interrupt::new(),
        })
    }

    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn dataset(&self) -> &Dataset {
        self.dataset
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    pub fn n_rows(&self) -> usize {
        self.dataset.n_rows()
    }

    /// Numeric encoding of the feature columns, built on first use.
    pub fn encoded(&self) -> HardnessResult<&Encoded> {
        self.encoded
            .get_or_init(|| self.encoder.encode(self.dataset))
            .as_ref()
            .map_err(HardnessError::clone)
    }

    pub fn interrupt(&self) -> &Interrupt {
        &self.interrupt
    }

    pub fn check_interrupt(&self) -> HardnessResult<()> {
        self.interrupt.check()
    }
}

/// A complexity or hardness measure, configured at construction.
pub trait Measure: Send + Sync {
    fn name(&self) -> &'static str;
    fn compute(&self, input: &MeasureInput<'_>) -> HardnessResult<Scores>;
}
