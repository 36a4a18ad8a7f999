use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};
use std::fmt;
use std::str::FromStr;

use hardcase_core::{HardnessError, HardnessResult};
use serde::{Deserialize, Serialize};

/// Smoothing kernel of a [`KernelDensity`]. Every kernel integrates to 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kernel {
    #[default]
    Gaussian,
    Tophat,
    Epanechnikov,
    Exponential,
    Linear,
    Cosine,
}

impl Kernel {
    pub const ALL: [Kernel; 6] = [
        Kernel::Gaussian,
        Kernel::Tophat,
        Kernel::Epanechnikov,
        Kernel::Exponential,
        Kernel::Linear,
        Kernel::Cosine,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Kernel::Gaussian => "gaussian",
            Kernel::Tophat => "tophat",
            Kernel::Epanechnikov => "epanechnikov",
            Kernel::Exponential => "exponential",
            Kernel::Linear => "linear",
            Kernel::Cosine => "cosine",
        }
    }

    /// Kernel value at the scaled offset `u = (x - xi) / h`.
    pub fn evaluate(&self, u: f64) -> f64 {
        let a = u.abs();
        match self {
            Kernel::Gaussian => (-0.5 * u * u).exp() / (2.0 * PI).sqrt(),
            Kernel::Exponential => 0.5 * (-a).exp(),
            _ if a >= 1.0 => 0.0,
            Kernel::Tophat => 0.5,
            Kernel::Epanechnikov => 0.75 * (1.0 - u * u),
            Kernel::Linear => 1.0 - a,
            Kernel::Cosine => FRAC_PI_4 * (FRAC_PI_2 * u).cos(),
        }
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Kernel {
    type Err = HardnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Kernel::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| HardnessError::InvalidParameter {
                measure: "kernel density".into(),
                reason: format!(
                    "unknown kernel '{s}', expected one of: {}",
                    Kernel::ALL.map(|k| k.name()).join(", ")
                ),
            })
    }
}

/// One-dimensional kernel density estimate.
///
/// `density(x) = Σ K((x - xi) / h) / (n · h)` over the fitted samples `xi`.
#[derive(Debug, Clone)]
pub struct KernelDensity {
    pub bandwidth: f64,
    pub kernel: Kernel,
    samples: Option<Vec<f64>>,
}

impl KernelDensity {
    pub fn new(bandwidth: f64, kernel: Kernel) -> Self {
        KernelDensity {
            bandwidth,
            kernel,
            samples: None,
        }
    }

    pub fn fit(&mut self, values: &[f64]) -> HardnessResult<()> {
        if !(self.bandwidth > 0.0 && self.bandwidth.is_finite()) {
            return Err(HardnessError::InvalidParameter {
                measure: "kernel density".into(),
                reason: format!("bandwidth must be positive, got {}", self.bandwidth),
            });
        }
        if values.is_empty() {
            return Err(HardnessError::EmptyDataset);
        }
        self.samples = Some(values.to_vec());
        Ok(())
    }

    pub fn density(&self, x: f64) -> HardnessResult<f64> {
        let samples = self
            .samples
            .as_ref()
            .ok_or_else(|| HardnessError::InvalidOperation("Model not fitted".into()))?;
        let h = self.bandwidth;
        let total: f64 = samples
            .iter()
            .map(|&xi| self.kernel.evaluate((x - xi) / h))
            .sum();
        Ok(total / (samples.len() as f64 * h))
    }
}
