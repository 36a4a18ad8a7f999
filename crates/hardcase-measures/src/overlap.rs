use hardcase_core::{HardnessError, HardnessResult, Matrix};
use log::{debug, warn};

use crate::geometric::NoSettings;
use crate::measure::{Measure, MeasureInput, Scores};
use crate::params::{parse_settings, Params};

/// Row indices of the two classes; any other class count is an error.
fn two_classes(input: &MeasureInput<'_>, measure: &str) -> HardnessResult<(Vec<usize>, Vec<usize>)> {
    let mut groups = input.labels().partition();
    if groups.len() != 2 {
        return Err(HardnessError::ClassCount {
            measure: measure.to_string(),
            expected: "exactly 2".into(),
            found: groups.len(),
        });
    }
    let second = groups.pop().unwrap_or_default();
    let first = groups.pop().unwrap_or_default();
    Ok((first, second))
}

/// `[max(min₁, min₂), min(max₁, max₂)]` of a feature over two row sets. The
/// interval is empty (lower > upper) when the classes do not overlap.
fn overlap_interval(x: &Matrix, feature: usize, a: &[usize], b: &[usize]) -> Option<(f64, f64)> {
    let (min_a, max_a) = x.column_range(feature, a)?;
    let (min_b, max_b) = x.column_range(feature, b)?;
    Some((min_a.max(min_b), max_a.min(max_b)))
}

/// Number of `rows` whose value of `feature` lies inside `[lo, hi]`.
fn count_inside(x: &Matrix, feature: usize, rows: &[usize], (lo, hi): (f64, f64)) -> usize {
    rows.iter()
        .filter(|&&i| {
            let v = x.row(i)[feature];
            v >= lo && v <= hi
        })
        .count()
}

/// Feature among `features` whose overlap interval holds the fewest of `rows`:
/// `(feature, interval, (|rows| - inside) / |rows|)`. Ties go to the earlier feature.
fn most_separating(
    x: &Matrix,
    features: &[usize],
    rows: &[usize],
    a: &[usize],
    b: &[usize],
) -> Option<(usize, (f64, f64), f64)> {
    let n = rows.len() as f64;
    let mut best: Option<(usize, (f64, f64), f64)> = None;
    for &feature in features {
        let Some(interval) = overlap_interval(x, feature, a, b) else {
            continue;
        };
        let ratio = (n - count_inside(x, feature, rows, interval) as f64) / n;
        if best.map_or(true, |(_, _, r)| ratio > r) {
            best = Some((feature, interval, ratio));
        }
    }
    best
}

// ─── F2 ──────────────────────────────────────────────────────────────────

/// Product over features of the overlap interval length relative to the feature's
/// total range. Negative factors (separated classes) are kept as is.
pub struct F2;

impl F2 {
    pub fn from_params(params: &Params) -> HardnessResult<Box<dyn Measure>> {
        parse_settings::<NoSettings>("F2", params)?;
        Ok(Box::new(F2))
    }
}

impl Measure for F2 {
    fn name(&self) -> &'static str {
        "F2"
    }

    fn compute(&self, input: &MeasureInput<'_>) -> HardnessResult<Scores> {
        let (a, b) = two_classes(input, self.name())?;
        let x = &input.encoded()?.matrix;

        let mut product = 1.0;
        for feature in 0..x.cols() {
            let (Some((min_a, max_a)), Some((min_b, max_b))) =
                (x.column_range(feature, &a), x.column_range(feature, &b))
            else {
                continue;
            };
            let range = max_a.max(max_b) - min_a.min(min_b);
            if range == 0.0 {
                warn!("F2: feature {feature} is constant, counting it as full overlap");
                continue;
            }
            product *= (max_a.min(max_b) - min_a.max(min_b)) / range;
        }
        Ok(Scores::broadcast(self.name(), product, x.rows()))
    }
}

// ─── F3 ──────────────────────────────────────────────────────────────────

/// Largest fraction of rows a single feature places outside its overlap interval.
pub struct F3;

impl F3 {
    pub fn from_params(params: &Params) -> HardnessResult<Box<dyn Measure>> {
        parse_settings::<NoSettings>("F3", params)?;
        Ok(Box::new(F3))
    }
}

impl Measure for F3 {
    fn name(&self) -> &'static str {
        "F3"
    }

    fn compute(&self, input: &MeasureInput<'_>) -> HardnessResult<Scores> {
        let (a, b) = two_classes(input, self.name())?;
        let x = &input.encoded()?.matrix;
        let rows: Vec<usize> = (0..x.rows()).collect();
        let features: Vec<usize> = (0..x.cols()).collect();

        let value = most_separating(x, &features, &rows, &a, &b).map_or(0.0, |(_, _, r)| r);
        Ok(Scores::broadcast(self.name(), value, x.rows()))
    }
}

// ─── F4 ──────────────────────────────────────────────────────────────────

/// Collective feature efficiency.
///
/// Each round picks the most separating remaining feature over the remaining rows,
/// keeps only the rows inside its overlap interval and drops the feature. The
/// score is the fraction of rows separated once every feature has been used.
pub struct F4;

impl F4 {
    pub fn from_params(params: &Params) -> HardnessResult<Box<dyn Measure>> {
        parse_settings::<NoSettings>("F4", params)?;
        Ok(Box::new(F4))
    }
}

impl Measure for F4 {
    fn name(&self) -> &'static str {
        "F4"
    }

    fn compute(&self, input: &MeasureInput<'_>) -> HardnessResult<Scores> {
        let (a, _) = two_classes(input, self.name())?;
        let x = &input.encoded()?.matrix;
        let n = x.rows();
        let ids = input.labels().ids();
        let class_a = ids[a[0]];

        let mut rows: Vec<usize> = (0..n).collect();
        let mut features: Vec<usize> = (0..x.cols()).collect();
        let mut rounds = 0;
        while !features.is_empty() && !rows.is_empty() {
            input.check_interrupt()?;
            rounds += 1;
            let (rows_a, rows_b): (Vec<usize>, Vec<usize>) =
                rows.iter().partition(|&&i| ids[i] == class_a);
            if rows_a.is_empty() || rows_b.is_empty() {
                // A single class left has nothing to overlap with.
                rows.clear();
                break;
            }
            let Some((feature, interval, _)) =
                most_separating(x, &features, &rows, &rows_a, &rows_b)
            else {
                break;
            };
            rows.retain(|&i| {
                let v = x.row(i)[feature];
                v >= interval.0 && v <= interval.1
            });
            features.retain(|&f| f != feature);
        }
        debug!("F4: {} of {n} rows left after {rounds} rounds", rows.len());

        let value = (n - rows.len()) as f64 / n as f64;
        Ok(Scores::broadcast(self.name(), value, n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{line_dataset, numeric_dataset};
    use crate::interrupt::Interrupt;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_f2_line_example_is_negative() {
        let ds = line_dataset();
        let input = MeasureInput::new(&ds).unwrap();
        let values = F2.compute(&input).unwrap().values;
        for v in values {
            assert_abs_diff_eq!(v, -9.0 / 11.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_f2_overlapping_features_multiply() {
        // x0: A [0, 2], B [1, 3] → 1/3. x1: A [0, 4], B [0, 4] → 1.
        let ds = numeric_dataset(
            &[vec![0.0, 0.0], vec![2.0, 4.0], vec![1.0, 4.0], vec![3.0, 0.0]],
            &["A", "A", "B", "B"],
        );
        let input = MeasureInput::new(&ds).unwrap();
        assert_abs_diff_eq!(F2.compute(&input).unwrap().values[0], 1.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_f2_constant_feature_is_neutral() {
        let ds = numeric_dataset(
            &[vec![0.0, 5.0], vec![2.0, 5.0], vec![1.0, 5.0], vec![3.0, 5.0]],
            &["A", "A", "B", "B"],
        );
        let input = MeasureInput::new(&ds).unwrap();
        let value = F2.compute(&input).unwrap().values[0];
        assert!(value.is_finite());
        assert_abs_diff_eq!(value, 1.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_f3_picks_best_feature() {
        // x0 fully overlaps; x1: A [0, 1], B [1, 5] overlaps on [1, 1] only.
        let ds = numeric_dataset(
            &[
                vec![0.0, 0.0],
                vec![5.0, 1.0],
                vec![0.0, 1.0],
                vec![5.0, 5.0],
            ],
            &["A", "A", "B", "B"],
        );
        let input = MeasureInput::new(&ds).unwrap();
        assert_abs_diff_eq!(F3.compute(&input).unwrap().values[0], 0.5);
    }

    #[test]
    fn test_f3_separated_line() {
        let ds = line_dataset();
        let input = MeasureInput::new(&ds).unwrap();
        assert_eq!(F3.compute(&input).unwrap().values, vec![1.0; 4]);
    }

    #[test]
    fn test_f4_collective_separation() {
        // x1 separates rows 0 and 3; x0 then separates rows 1 and 2.
        let ds = numeric_dataset(
            &[
                vec![0.0, 0.0],
                vec![5.0, 1.0],
                vec![0.0, 1.0],
                vec![5.0, 5.0],
            ],
            &["A", "A", "B", "B"],
        );
        let input = MeasureInput::new(&ds).unwrap();
        assert_eq!(F4.compute(&input).unwrap().values, vec![1.0; 4]);
    }

    #[test]
    fn test_f4_inseparable_rows_remain() {
        let ds = numeric_dataset(
            &[vec![0.0], vec![1.0], vec![0.0], vec![1.0]],
            &["A", "A", "B", "B"],
        );
        let input = MeasureInput::new(&ds).unwrap();
        assert_eq!(F4.compute(&input).unwrap().values, vec![0.0; 4]);
    }

    #[test]
    fn test_two_class_only() {
        let ds = numeric_dataset(&[vec![0.0], vec![1.0], vec![2.0]], &["a", "b", "c"]);
        let input = MeasureInput::new(&ds).unwrap();
        let measures: [&dyn Measure; 3] = [&F2, &F3, &F4];
        for measure in measures {
            assert!(matches!(
                measure.compute(&input).unwrap_err(),
                HardnessError::ClassCount { found: 3, .. }
            ));
        }
    }

    #[test]
    fn test_f4_interrupted() {
        let ds = line_dataset();
        let interrupt = Interrupt::new();
        interrupt.trigger();
        let input = MeasureInput::new(&ds).unwrap().with_interrupt(interrupt);
        assert_eq!(F4.compute(&input).unwrap_err(), HardnessError::Interrupted);
    }
}
