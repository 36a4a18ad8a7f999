use hardcase_cluster::AgglomerativeClustering;
use hardcase_core::HardnessResult;
use log::warn;
use serde::Deserialize;

use crate::geometric::NoSettings;
use crate::measure::{Measure, MeasureInput, Scores};
use crate::params::{invalid, lenient_f64, parse_settings, Params};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct T1Settings {
    #[serde(default = "default_threshold", deserialize_with = "lenient_f64")]
    pub threshold: f64,
}

fn default_threshold() -> f64 {
    1.5
}

/// Fraction of rows that end up alone in a single-linkage cluster cut at
/// `threshold`.
pub struct T1 {
    settings: T1Settings,
}

impl T1 {
    pub fn from_params(params: &Params) -> HardnessResult<Box<dyn Measure>> {
        let settings: T1Settings = parse_settings("T1", params)?;
        if !(settings.threshold >= 0.0 && settings.threshold.is_finite()) {
            return Err(invalid(
                "T1",
                format!("threshold must be non-negative, got {}", settings.threshold),
            ));
        }
        Ok(Box::new(T1 { settings }))
    }
}

impl Measure for T1 {
    fn name(&self) -> &'static str {
        "T1"
    }

    fn compute(&self, input: &MeasureInput<'_>) -> HardnessResult<Scores> {
        let x = &input.encoded()?.matrix;
        let n = x.rows();
        let mut clustering = AgglomerativeClustering::new(self.settings.threshold);
        clustering.fit(x)?;
        let singletons = clustering
            .cluster_sizes()
            .unwrap_or_default()
            .into_iter()
            .filter(|&size| size == 1)
            .count();
        Ok(Scores::broadcast(self.name(), singletons as f64 / n as f64, n))
    }
}

/// Rows per encoded feature.
pub struct T2;

impl T2 {
    pub fn from_params(params: &Params) -> HardnessResult<Box<dyn Measure>> {
        parse_settings::<NoSettings>("T2", params)?;
        Ok(Box::new(T2))
    }
}

impl Measure for T2 {
    fn name(&self) -> &'static str {
        "T2"
    }

    fn compute(&self, input: &MeasureInput<'_>) -> HardnessResult<Scores> {
        let encoded = input.encoded()?;
        let n = encoded.n_rows();
        let k = encoded.n_features();
        let value = if k == 0 {
            warn!("T2: no encoded features, using the row count");
            n as f64
        } else {
            n as f64 / k as f64
        };
        Ok(Scores::broadcast(self.name(), value, n))
    }
}
