use std::collections::BTreeMap;

/// Replace missing numeric values with the mean of the observed ones.
pub struct MeanImputer {
    /// Value used when a column has no observed value at all.
    pub fallback: f64,
    pub mean: Option<f64>,
}

impl MeanImputer {
    pub fn new(fallback: f64) -> Self {
        MeanImputer {
            fallback,
            mean: None,
        }
    }

    /// Compute the mean of the non-missing, non-NaN values.
    pub fn fit(&mut self, values: &[Option<f64>]) {
        let observed: Vec<f64> = values.iter().flatten().copied().filter(|v| !v.is_nan()).collect();
        self.mean = if observed.is_empty() {
            None
        } else {
            Some(observed.iter().sum::<f64>() / observed.len() as f64)
        };
    }

    /// Fill gaps with the fitted mean, or with the fallback when nothing was observed.
    pub fn transform(&self, values: &[Option<f64>]) -> Vec<f64> {
        let fill = self.mean.unwrap_or(self.fallback);
        values
            .iter()
            .map(|v| match v {
                Some(x) if !x.is_nan() => *x,
                _ => fill,
            })
            .collect()
    }

    pub fn fit_transform(&mut self, values: &[Option<f64>]) -> Vec<f64> {
        self.fit(values);
        self.transform(values)
    }
}

/// Replace missing categorical values with the most frequent observed one.
/// Ties go to the lexicographically smallest value.
#[derive(Default)]
pub struct MostFrequentImputer {
    pub most_frequent: Option<String>,
}

impl MostFrequentImputer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(&mut self, values: &[Option<&str>]) {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for v in values.iter().flatten() {
            *counts.entry(*v).or_insert(0) += 1;
        }
        // BTreeMap iterates in key order, so the first maximum wins ties.
        let mut best: Option<(&str, usize)> = None;
        for (value, count) in counts {
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((value, count));
            }
        }
        self.most_frequent = best.map(|(v, _)| v.to_string());
    }

    /// Fill gaps; a column with no observed value stays missing.
    pub fn transform(&self, values: &[Option<&str>]) -> Vec<Option<String>> {
        values
            .iter()
            .map(|v| match v {
                Some(s) => Some(s.to_string()),
                None => self.most_frequent.clone(),
            })
            .collect()
    }

    pub fn fit_transform(&mut self, values: &[Option<&str>]) -> Vec<Option<String>> {
        self.fit(values);
        self.transform(values)
    }
}
