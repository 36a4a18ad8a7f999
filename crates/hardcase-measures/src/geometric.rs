use hardcase_core::{HardnessError, HardnessResult};
use hardcase_neighbors::{
    minimum_spanning_tree, pairwise_distances, select_nearest, LocalOutlierFactor,
    NearestNeighbors,
};
use log::warn;
use serde::Deserialize;

use crate::measure::{Measure, MeasureInput, Scores};
use crate::params::{invalid, lenient_f64, lenient_usize, parse_settings, Params};

/// Neighborhood size N2 starts its search with.
const N2_INITIAL_NEIGHBORS: usize = 200;

// ─── N1 ──────────────────────────────────────────────────────────────────

/// Fraction of rows joined by a minimum-spanning-tree edge to a row of another class.
pub struct N1;

impl N1 {
    pub fn from_params(params: &Params) -> HardnessResult<Box<dyn Measure>> {
        parse_settings::<NoSettings>("N1", params)?;
        Ok(Box::new(N1))
    }
}

impl Measure for N1 {
    fn name(&self) -> &'static str {
        "N1"
    }

    fn compute(&self, input: &MeasureInput<'_>) -> HardnessResult<Scores> {
        let n = input.n_rows();
        if n < 2 {
            return Ok(Scores::broadcast(self.name(), 0.0, n));
        }
        let x = &input.encoded()?.matrix;
        let dist = pairwise_distances(x)?;
        input.check_interrupt()?;
        let edges = minimum_spanning_tree(&dist)?;

        let ids = input.labels().ids();
        let mut boundary = vec![false; n];
        for edge in edges.iter().filter(|e| ids[e.a] != ids[e.b]) {
            boundary[edge.a] = true;
            boundary[edge.b] = true;
        }
        let count = boundary.iter().filter(|&&b| b).count();
        Ok(Scores::broadcast(self.name(), count as f64 / n as f64, n))
    }
}

// ─── N2 ──────────────────────────────────────────────────────────────────

/// Mean distance to the nearest same-class row over mean distance to the nearest
/// row of another class.
pub struct N2;

impl N2 {
    pub fn from_params(params: &Params) -> HardnessResult<Box<dyn Measure>> {
        parse_settings::<NoSettings>("N2", params)?;
        Ok(Box::new(N2))
    }
}

impl Measure for N2 {
    fn name(&self) -> &'static str {
        "N2"
    }

    fn compute(&self, input: &MeasureInput<'_>) -> HardnessResult<Scores> {
        let n = input.n_rows();
        let ids = input.labels().ids();
        let mut index = NearestNeighbors::new(1);
        index.fit(&input.encoded()?.matrix)?;

        let mut intra = Vec::with_capacity(n);
        let mut inter = Vec::with_capacity(n);
        for i in 0..n {
            input.check_interrupt()?;
            let candidates = index.candidates_of_row(i)?;
            let cap = n - 1;
            let mut k = N2_INITIAL_NEIGHBORS.min(cap);

            // k doubles until both distances are found or every row is a neighbor,
            // so the loop runs at most log2(n) + 1 times.
            let (same, other) = loop {
                let nearest = select_nearest(&candidates, k);
                let same = nearest.iter().find(|nb| ids[nb.index] == ids[i]);
                let other = nearest.iter().find(|nb| ids[nb.index] != ids[i]);
                if (same.is_some() && other.is_some()) || k >= cap {
                    break (same.map(|nb| nb.distance), other.map(|nb| nb.distance));
                }
                k = (k * 2).min(cap);
            };
            intra.extend(same);
            inter.extend(other);
        }

        if intra.len() < n || inter.len() < n {
            warn!(
                "N2: {} rows without a same-class neighbor, {} without an other-class neighbor",
                n - intra.len(),
                n - inter.len()
            );
        }
        let mean = |v: &[f64]| {
            if v.is_empty() {
                0.0
            } else {
                v.iter().sum::<f64>() / v.len() as f64
            }
        };
        let inter_mean = mean(&inter);
        let value = if inter_mean > 0.0 {
            mean(&intra) / inter_mean
        } else {
            0.0
        };
        Ok(Scores::broadcast(self.name(), value, n))
    }
}

// ─── KDN ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KdnSettings {
    #[serde(default = "default_kdn_neighbors", deserialize_with = "lenient_usize")]
    pub n_neighbors: usize,
}

fn default_kdn_neighbors() -> usize {
    5
}

/// Fraction of a row's k nearest neighbors that carry another class label.
pub struct Kdn {
    settings: KdnSettings,
}

impl Kdn {
    pub fn new(settings: KdnSettings) -> HardnessResult<Self> {
        if settings.n_neighbors == 0 {
            return Err(invalid("KDN", "n_neighbors must be at least 1"));
        }
        Ok(Kdn { settings })
    }

    pub fn from_params(params: &Params) -> HardnessResult<Box<dyn Measure>> {
        Ok(Box::new(Self::new(parse_settings("KDN", params)?)?))
    }
}

impl Measure for Kdn {
    fn name(&self) -> &'static str {
        "KDN"
    }

    fn compute(&self, input: &MeasureInput<'_>) -> HardnessResult<Scores> {
        let n = input.n_rows();
        let k = self.settings.n_neighbors;
        if k >= n {
            return Err(HardnessError::TooManyNeighbors { k, n });
        }
        let ids = input.labels().ids();
        let mut index = NearestNeighbors::new(k);
        index.fit(&input.encoded()?.matrix)?;

        let mut values = Vec::with_capacity(n);
        for i in 0..n {
            input.check_interrupt()?;
            let disagreeing = index
                .neighbors_of_row(i, k)?
                .iter()
                .filter(|nb| ids[nb.index] != ids[i])
                .count();
            values.push(disagreeing as f64 / k as f64);
        }
        Ok(Scores::per_row(self.name(), values))
    }
}

// ─── CLOF ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClofSettings {
    #[serde(default = "default_weight", deserialize_with = "lenient_f64")]
    pub alfa: f64,
    #[serde(default = "default_weight", deserialize_with = "lenient_f64")]
    pub beta: f64,
    #[serde(default = "default_clof_neighbors", deserialize_with = "lenient_usize")]
    pub n_neighbors: usize,
}

fn default_weight() -> f64 {
    0.5
}

fn default_clof_neighbors() -> usize {
    20
}

/// Class-wise local outlier factor.
///
/// `score = LOF_own + alfa / LOF_others + beta / LOF_all`, where `LOF_own` is the
/// row's factor within its own class, `LOF_others` the factor it gets once inserted
/// among the pooled rows of every other class, and `LOF_all` its factor in the
/// whole dataset.
pub struct Clof {
    settings: ClofSettings,
}

impl Clof {
    pub fn new(settings: ClofSettings) -> HardnessResult<Self> {
        if settings.n_neighbors == 0 {
            return Err(invalid("CLOF", "n_neighbors must be at least 1"));
        }
        if !settings.alfa.is_finite() || !settings.beta.is_finite() {
            return Err(invalid("CLOF", "alfa and beta must be finite"));
        }
        Ok(Clof { settings })
    }

    pub fn from_params(params: &Params) -> HardnessResult<Box<dyn Measure>> {
        Ok(Box::new(Self::new(parse_settings("CLOF", params)?)?))
    }
}

impl Measure for Clof {
    fn name(&self) -> &'static str {
        "CLOF"
    }

    fn compute(&self, input: &MeasureInput<'_>) -> HardnessResult<Scores> {
        let k = self.settings.n_neighbors;
        let labels = input.labels();
        let groups = labels.partition();
        if groups.len() < 2 {
            return Err(HardnessError::ClassCount {
                measure: self.name().into(),
                expected: "at least 2".into(),
                found: groups.len(),
            });
        }
        for (class, rows) in groups.iter().enumerate() {
            if rows.len() <= k {
                return Err(HardnessError::ClassTooSmall {
                    class: labels.class_name(class).to_string(),
                    size: rows.len(),
                    required: k + 1,
                });
            }
        }

        let x = &input.encoded()?.matrix;
        let n = x.rows();
        let mut whole = LocalOutlierFactor::new(k);
        whole.fit(x)?;
        let all_factors = whole.outlier_factors()?;

        let mut values = vec![0.0; n];
        for (class, rows) in groups.iter().enumerate() {
            let mut own = LocalOutlierFactor::new(k);
            own.fit(&x.select_rows(rows)?)?;
            let own_factors = own.outlier_factors()?;

            let others: Vec<usize> = (0..n).filter(|&i| labels.id(i) != class).collect();
            let mut complement = LocalOutlierFactor::new(k);
            complement.fit(&x.select_rows(&others)?)?;

            for (pos, &i) in rows.iter().enumerate() {
                input.check_interrupt()?;
                let other_factor = complement.score_inserted(x.row(i))?;
                values[i] = own_factors[pos]
                    + self.settings.alfa / other_factor
                    + self.settings.beta / all_factors[i];
            }
        }
        Ok(Scores::per_row(self.name(), values))
    }
}

/// Settings of measures without parameters; any key is rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoSettings {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{blobs, line_dataset, numeric_dataset};
    use crate::interrupt::Interrupt;
    use approx::assert_abs_diff_eq;
    use serde_json::json;

    fn params(value: serde_json::Value) -> Params {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_n1_line_example() {
        let ds = line_dataset();
        let input = MeasureInput::new(&ds).unwrap();
        let scores = N1.compute(&input).unwrap();
        assert_eq!(scores.values, vec![0.5; 4]);
    }

    #[test]
    fn test_n1_single_class_and_single_row() {
        let ds = numeric_dataset(&[vec![0.0], vec![3.0], vec![4.0]], &["a", "a", "a"]);
        let input = MeasureInput::new(&ds).unwrap();
        assert_eq!(N1.compute(&input).unwrap().values, vec![0.0; 3]);

        let ds = numeric_dataset(&[vec![1.0]], &["a"]);
        let input = MeasureInput::new(&ds).unwrap();
        assert_eq!(N1.compute(&input).unwrap().values, vec![0.0]);
    }

    #[test]
    fn test_n2_line_example() {
        // Intra distances are all 1, inter distances are 10, 9, 9, 10.
        let ds = line_dataset();
        let input = MeasureInput::new(&ds).unwrap();
        let value = N2.compute(&input).unwrap().values[0];
        assert_abs_diff_eq!(value, 1.0 / 9.5, epsilon = 1e-12);
    }

    #[test]
    fn test_n2_singleton_class_is_finite() {
        let ds = numeric_dataset(&[vec![0.0], vec![2.0], vec![5.0]], &["a", "a", "b"]);
        let input = MeasureInput::new(&ds).unwrap();
        let value = N2.compute(&input).unwrap().values[0];
        // Intra: 2, 2 (row 2 excluded). Inter: 5, 3, 3.
        assert_abs_diff_eq!(value, 2.0 / (11.0 / 3.0), epsilon = 1e-12);
    }

    #[test]
    fn test_n2_grows_neighborhood_past_initial_size() {
        // Class b sits at both ends of the line, so each b row's only same-class
        // partner is its farthest neighbor among 250 rows.
        let xs: Vec<f64> = std::iter::once(0.0)
            .chain((1..=248).map(f64::from))
            .chain(std::iter::once(1000.0))
            .collect();
        let labels: Vec<&str> = (0..xs.len())
            .map(|i| if i == 0 || i == xs.len() - 1 { "b" } else { "a" })
            .collect();
        let features: Vec<Vec<f64>> = xs.iter().map(|&x| vec![x]).collect();
        let ds = numeric_dataset(&features, &labels);
        let input = MeasureInput::new(&ds).unwrap();
        let value = N2.compute(&input).unwrap().values[0];

        let nearest = |i: usize, same: bool| {
            (0..xs.len())
                .filter(|&j| j != i && (labels[j] == labels[i]) == same)
                .map(|j| (xs[i] - xs[j]).abs())
                .fold(f64::INFINITY, f64::min)
        };
        let n = xs.len() as f64;
        let intra: f64 = (0..xs.len()).map(|i| nearest(i, true)).sum::<f64>() / n;
        let inter: f64 = (0..xs.len()).map(|i| nearest(i, false)).sum::<f64>() / n;
        assert!(nearest(0, true) > nearest(0, false) * 200.0);
        assert_abs_diff_eq!(value, intra / inter, epsilon = 1e-12);
    }

    #[test]
    fn test_n2_single_class_gives_zero() {
        let ds = numeric_dataset(&[vec![0.0], vec![2.0]], &["a", "a"]);
        let input = MeasureInput::new(&ds).unwrap();
        assert_eq!(N2.compute(&input).unwrap().values, vec![0.0; 2]);
    }

    #[test]
    fn test_kdn_values() {
        let ds = line_dataset();
        let input = MeasureInput::new(&ds).unwrap();
        let kdn = Kdn::from_params(&params(json!({"n_neighbors": 2}))).unwrap();
        // Row 0: neighbors 1 (A), 10 (B).
        assert_eq!(kdn.compute(&input).unwrap().values, vec![0.5; 4]);
    }

    #[test]
    fn test_kdn_range_and_single_class() {
        let ds = blobs();
        let input = MeasureInput::new(&ds).unwrap();
        let kdn = Kdn::from_params(&params(json!({"n_neighbors": "3"}))).unwrap();
        let values = kdn.compute(&input).unwrap().values;
        assert!(values.iter().all(|v| (0.0..=1.0).contains(v)));
        assert!(values[5] > values[0]);

        let ds = numeric_dataset(&[vec![0.0], vec![1.0], vec![5.0]], &["a", "a", "a"]);
        let input = MeasureInput::new(&ds).unwrap();
        let kdn = Kdn::from_params(&params(json!({"n_neighbors": 2}))).unwrap();
        assert_eq!(kdn.compute(&input).unwrap().values, vec![0.0; 3]);
    }

    #[test]
    fn test_kdn_too_many_neighbors() {
        let ds = line_dataset();
        let input = MeasureInput::new(&ds).unwrap();
        let kdn = Kdn::from_params(&params(json!({"n_neighbors": 4}))).unwrap();
        assert_eq!(
            kdn.compute(&input).unwrap_err(),
            HardnessError::TooManyNeighbors { k: 4, n: 4 }
        );
        assert!(Kdn::from_params(&params(json!({"n_neighbors": 0}))).is_err());
    }

    #[test]
    fn test_kdn_interrupted() {
        let ds = line_dataset();
        let interrupt = Interrupt::new();
        interrupt.trigger();
        let input = MeasureInput::new(&ds).unwrap().with_interrupt(interrupt);
        let kdn = Kdn::new(KdnSettings { n_neighbors: 1 }).unwrap();
        assert_eq!(kdn.compute(&input).unwrap_err(), HardnessError::Interrupted);
    }

    #[test]
    fn test_clof_outlier_scores_highest_in_class() {
        let ds = blobs();
        let input = MeasureInput::new(&ds).unwrap();
        let clof = Clof::from_params(&params(json!({"n_neighbors": 3}))).unwrap();
        let values = clof.compute(&input).unwrap().values;
        assert_eq!(values.len(), 12);
        assert!(values.iter().all(|v| v.is_finite() && *v > 0.0));
        let max_a = (0..6).max_by(|&a, &b| values[a].total_cmp(&values[b])).unwrap();
        assert_eq!(max_a, 5);
    }

    #[test]
    fn test_clof_weights() {
        let ds = blobs();
        let input = MeasureInput::new(&ds).unwrap();
        let base = Clof::from_params(&params(json!({"n_neighbors": 3, "alfa": 0, "beta": 0})))
            .unwrap()
            .compute(&input)
            .unwrap()
            .values;
        let weighted = Clof::from_params(&params(json!({"n_neighbors": 3})))
            .unwrap()
            .compute(&input)
            .unwrap()
            .values;
        for (b, w) in base.iter().zip(&weighted) {
            assert!(w > b);
        }
    }

    #[test]
    fn test_clof_rejects_small_classes() {
        let ds = blobs();
        let input = MeasureInput::new(&ds).unwrap();
        let clof = Clof::from_params(&Params::new()).unwrap();
        assert!(matches!(
            clof.compute(&input).unwrap_err(),
            HardnessError::ClassTooSmall { required: 21, .. }
        ));

        let ds = numeric_dataset(&[vec![0.0], vec![1.0], vec![2.0]], &["a", "a", "a"]);
        let input = MeasureInput::new(&ds).unwrap();
        let clof = Clof::from_params(&params(json!({"n_neighbors": 1}))).unwrap();
        assert!(matches!(
            clof.compute(&input).unwrap_err(),
            HardnessError::ClassCount { found: 1, .. }
        ));
    }

    #[test]
    fn test_no_settings_reject_keys() {
        assert!(N1::from_params(&params(json!({"k": 1}))).is_err());
        assert!(N2::from_params(&Params::new()).is_ok());
    }
}
