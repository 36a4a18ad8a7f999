use std::collections::BTreeMap;

use hardcase_core::{HardnessError, HardnessResult};
use hardcase_data::Dataset;
use log::{debug, error, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::balance::{ClassBalance, MinorityValue};
use crate::geometric::{Clof, Kdn, N1, N2};
use crate::interrupt::Interrupt;
use crate::likelihood::{ClassLikelihood, ClassLikelihoodDifference};
use crate::measure::{Measure, MeasureInput, Scores};
use crate::overlap::{F2, F3, F4};
use crate::params::Params;
use crate::structural::{T1, T2};
use crate::tree_based::{DisjunctClassPercentage, DisjunctSize, PrunedTreeDepth, TreeDepth};

/// Builds a configured measure from its parameters.
pub type Factory = fn(&Params) -> HardnessResult<Box<dyn Measure>>;

/// A batch of measures to compute: measure name → parameters.
///
/// Deserializes from `{"KDN": {"n_neighbors": 5}, "CB": {}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeasureSuite {
    measures: BTreeMap<String, Params>,
}

impl MeasureSuite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> HardnessResult<Self> {
        serde_json::from_str(json).map_err(|e| HardnessError::InvalidParameter {
            measure: "suite".into(),
            reason: e.to_string(),
        })
    }

    pub fn with(mut self, name: impl Into<String>, params: Params) -> Self {
        self.measures.insert(name.into(), params);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Params)> {
        self.measures.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.measures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measures.is_empty()
    }
}

/// Dataset enriched with the scores of a suite, plus the measures that failed.
#[derive(Debug, Clone)]
pub struct Enrichment {
    pub dataset: Dataset,
    pub failures: Vec<(String, HardnessError)>,
}

/// Name → factory table of the available measures.
pub struct Registry {
    factories: BTreeMap<String, Factory>,
}

impl Registry {
    /// A registry without any measure.
    pub fn empty() -> Self {
        Registry {
            factories: BTreeMap::new(),
        }
    }

    /// Every built-in measure.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register("N1", N1::from_params);
        registry.register("N2", N2::from_params);
        registry.register("KDN", Kdn::from_params);
        registry.register("CLOF", Clof::from_params);
        registry.register("DS", DisjunctSize::from_params);
        registry.register("DCP", DisjunctClassPercentage::from_params);
        registry.register("TD", TreeDepth::from_params);
        registry.register("TDWithPruning", PrunedTreeDepth::from_params);
        registry.register("CL", ClassLikelihood::from_params);
        registry.register("CLD", ClassLikelihoodDifference::from_params);
        registry.register("F2", F2::from_params);
        registry.register("F3", F3::from_params);
        registry.register("F4", F4::from_params);
        registry.register("CB", ClassBalance::from_params);
        registry.register("MV", MinorityValue::from_params);
        registry.register("T1", T1::from_params);
        registry.register("T2", T2::from_params);
        registry
    }

    /// Add or replace a measure.
    pub fn register(&mut self, name: impl Into<String>, factory: Factory) {
        self.factories.insert(name.into(), factory);
    }

    /// Registered names, sorted.
    pub fn supported(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Instantiate a measure, validating its parameters.
    pub fn create(&self, name: &str, params: &Params) -> HardnessResult<Box<dyn Measure>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| HardnessError::UnknownMeasure {
                name: name.to_string(),
                supported: self.supported().join(", "),
            })?;
        factory(params)
    }

    /// Check every name and parameter set of `suite` without computing anything.
    pub fn validate(&self, suite: &MeasureSuite) -> HardnessResult<()> {
        for (name, params) in suite.iter() {
            self.create(name, params)?;
        }
        Ok(())
    }

    /// Compute one measure on a dataset.
    pub fn compute(&self, name: &str, params: &Params, dataset: &Dataset) -> HardnessResult<Scores> {
        let measure = self.create(name, params)?;
        let input = MeasureInput::new(dataset)?;
        input.encoded()?;
        run(measure.as_ref(), &input)
    }

    /// Compute every measure of `suite` on one dataset, measures in parallel.
    ///
    /// The suite is validated and the dataset encoded up front, so a
    /// configuration error fails the whole call. Failures during computation are
    /// reported per measure; results are returned in suite order.
    pub fn compute_suite(
        &self,
        suite: &MeasureSuite,
        dataset: &Dataset,
        interrupt: &Interrupt,
    ) -> HardnessResult<Vec<(String, HardnessResult<Scores>)>> {
        let measures = suite
            .iter()
            .map(|(name, params)| Ok((name.to_string(), self.create(name, params)?)))
            .collect::<HardnessResult<Vec<_>>>()?;
        let input = MeasureInput::new(dataset)?.with_interrupt(interrupt.clone());
        input.encoded()?;

        Ok(measures
            .into_par_iter()
            .map(|(name, measure)| {
                let result = run(measure.as_ref(), &input);
                (name, result)
            })
            .collect())
    }

    /// Compute `suite` and insert each successful score column before the label.
    ///
    /// A failing measure adds no column; its error is listed in
    /// [`Enrichment::failures`] and the other measures are unaffected.
    pub fn enrich(
        &self,
        dataset: &Dataset,
        suite: &MeasureSuite,
        interrupt: &Interrupt,
    ) -> HardnessResult<Enrichment> {
        let results = self.compute_suite(suite, dataset, interrupt)?;
        let mut enriched = dataset.clone();
        let mut failures = Vec::new();
        for (name, result) in results {
            match result {
                Ok(scores) => {
                    enriched = enriched.with_score_column(&name, &scores.values)?;
                }
                Err(e) => {
                    error!("measure {name} failed: {e}");
                    failures.push((name, e));
                }
            }
        }
        info!(
            "enriched dataset of {} rows with {} of {} measures",
            dataset.n_rows(),
            suite.len() - failures.len(),
            suite.len()
        );
        Ok(Enrichment {
            dataset: enriched,
            failures,
        })
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::standard()
    }
}

fn run(measure: &dyn Measure, input: &MeasureInput<'_>) -> HardnessResult<Scores> {
    debug!("{}: computing over {} rows", measure.name(), input.n_rows());
    let scores = measure.compute(input)?;
    debug!("{}: done", measure.name());
    Ok(scores)
}
