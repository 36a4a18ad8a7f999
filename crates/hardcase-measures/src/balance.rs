use hardcase_core::HardnessResult;

use crate::geometric::NoSettings;
use crate::measure::{Measure, MeasureInput, Scores};
use crate::params::{parse_settings, Params};

/// Class balance: `|class of row| / N - 1 / C`.
pub struct ClassBalance;

impl ClassBalance {
    pub fn from_params(params: &Params) -> HardnessResult<Box<dyn Measure>> {
        parse_settings::<NoSettings>("CB", params)?;
        Ok(Box::new(ClassBalance))
    }
}

impl Measure for ClassBalance {
    fn name(&self) -> &'static str {
        "CB"
    }

    fn compute(&self, input: &MeasureInput<'_>) -> HardnessResult<Scores> {
        let labels = input.labels();
        let counts = labels.class_counts();
        let n = labels.len() as f64;
        let uniform = 1.0 / labels.n_classes() as f64;
        let values = labels
            .ids()
            .iter()
            .map(|&c| counts[c] as f64 / n - uniform)
            .collect();
        Ok(Scores::per_row(self.name(), values))
    }
}

/// Minority value: `|class of row| / |majority class|`.
pub struct MinorityValue;

impl MinorityValue {
    pub fn from_params(params: &Params) -> HardnessResult<Box<dyn Measure>> {
        parse_settings::<NoSettings>("MV", params)?;
        Ok(Box::new(MinorityValue))
    }
}

impl Measure for MinorityValue {
    fn name(&self) -> &'static str {
        "MV"
    }

    fn compute(&self, input: &MeasureInput<'_>) -> HardnessResult<Scores> {
        let labels = input.labels();
        let counts = labels.class_counts();
        let majority = counts.iter().copied().max().unwrap_or(1) as f64;
        let values = labels
            .ids()
            .iter()
            .map(|&c| counts[c] as f64 / majority)
            .collect();
        Ok(Scores::per_row(self.name(), values))
    }
}
