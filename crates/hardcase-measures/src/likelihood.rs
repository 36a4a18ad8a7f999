use hardcase_core::HardnessResult;
use hardcase_likelihood::{ClassModels, Kernel};
use hardcase_preprocessing::ColumnKind;
use serde::Deserialize;

use crate::measure::{Measure, MeasureInput, Scores};
use crate::params::{from_str, invalid, lenient_f64, parse_settings, Params};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LikelihoodSettings {
    #[serde(default = "default_bandwidth", deserialize_with = "lenient_f64")]
    pub bandwidth: f64,
    #[serde(default, deserialize_with = "from_str")]
    pub kernel: Kernel,
}

fn default_bandwidth() -> f64 {
    1.0
}

impl LikelihoodSettings {
    fn parse(measure: &str, params: &Params) -> HardnessResult<Self> {
        let settings: Self = parse_settings(measure, params)?;
        if !(settings.bandwidth > 0.0 && settings.bandwidth.is_finite()) {
            return Err(invalid(
                measure,
                format!("bandwidth must be positive, got {}", settings.bandwidth),
            ));
        }
        Ok(settings)
    }
}

/// Per-class attribute models fit on the encoded rows of every class.
fn fit_models(
    input: &MeasureInput<'_>,
    settings: &LikelihoodSettings,
) -> HardnessResult<ClassModels> {
    let encoded = input.encoded()?;
    let kinds: Vec<ColumnKind> = encoded.columns.iter().map(|c| c.kind).collect();
    let labels = input.labels();
    let mut models = ClassModels::new(settings.bandwidth, settings.kernel);
    models.fit(&encoded.matrix, &kinds, labels.ids(), labels.n_classes())?;
    Ok(models)
}

// ─── CL ──────────────────────────────────────────────────────────────────

/// Class likelihood: `1 - P(row | own class)`, the probability being the product
/// of per-attribute densities (continuous) or frequencies (indicators).
pub struct ClassLikelihood {
    settings: LikelihoodSettings,
}

impl ClassLikelihood {
    pub fn from_params(params: &Params) -> HardnessResult<Box<dyn Measure>> {
        Ok(Box::new(ClassLikelihood {
            settings: LikelihoodSettings::parse("CL", params)?,
        }))
    }
}

impl Measure for ClassLikelihood {
    fn name(&self) -> &'static str {
        "CL"
    }

    fn compute(&self, input: &MeasureInput<'_>) -> HardnessResult<Scores> {
        let models = fit_models(input, &self.settings)?;
        let x = &input.encoded()?.matrix;
        let labels = input.labels();

        let mut values = Vec::with_capacity(x.rows());
        for (i, row) in x.row_iter().enumerate() {
            input.check_interrupt()?;
            let own = models.likelihood(row, labels.id(i))?.clamp(0.0, 1.0);
            values.push(1.0 - own);
        }
        Ok(Scores::per_row(self.name(), values))
    }
}

// ─── CLD ─────────────────────────────────────────────────────────────────

/// Class likelihood difference: `1 - (P(row | own class) - max P(row | other class))`,
/// the difference floored at 0.
pub struct ClassLikelihoodDifference {
    settings: LikelihoodSettings,
}

impl ClassLikelihoodDifference {
    pub fn from_params(params: &Params) -> HardnessResult<Box<dyn Measure>> {
        Ok(Box::new(ClassLikelihoodDifference {
            settings: LikelihoodSettings::parse("CLD", params)?,
        }))
    }
}

impl Measure for ClassLikelihoodDifference {
    fn name(&self) -> &'static str {
        "CLD"
    }

    fn compute(&self, input: &MeasureInput<'_>) -> HardnessResult<Scores> {
        let models = fit_models(input, &self.settings)?;
        let x = &input.encoded()?.matrix;
        let labels = input.labels();

        let mut values = Vec::with_capacity(x.rows());
        for (i, row) in x.row_iter().enumerate() {
            input.check_interrupt()?;
            let own_class = labels.id(i);
            let own = models.likelihood(row, own_class)?.clamp(0.0, 1.0);
            let mut competing = 0.0f64;
            for class in (0..models.n_classes()).filter(|&c| c != own_class) {
                competing = competing.max(models.likelihood(row, class)?.clamp(0.0, 1.0));
            }
            values.push(1.0 - (own - competing).clamp(0.0, 1.0));
        }
        Ok(Scores::per_row(self.name(), values))
    }
}
