use hardcase_core::{HardnessError, HardnessResult};
use hardcase_data::Dataset;
use log::debug;

/// The `q`-quantile of `values` with linear interpolation between order
/// statistics. `None` for an empty slice.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Drop the rows whose score is in the top `percentage` percent.
///
/// Rows with a score at or below the `(1 - percentage / 100)` quantile are kept,
/// in their original order.
pub fn remove_top_percentage(
    dataset: &Dataset,
    scores: &[f64],
    percentage: f64,
) -> HardnessResult<Dataset> {
    if !(0.0..=100.0).contains(&percentage) {
        return Err(HardnessError::InvalidParameter {
            measure: "remove_top_percentage".into(),
            reason: format!("percentage must lie in [0, 100], got {percentage}"),
        });
    }
    if scores.len() != dataset.n_rows() {
        return Err(HardnessError::ShapeMismatch {
            expected: vec![dataset.n_rows()],
            got: vec![scores.len()],
        });
    }
    let Some(threshold) = quantile(scores, 1.0 - percentage / 100.0) else {
        return Ok(dataset.clone());
    };
    let keep: Vec<usize> = scores
        .iter()
        .enumerate()
        .filter(|(_, &s)| s <= threshold)
        .map(|(i, _)| i)
        .collect();
    debug!(
        "keeping {} of {} rows at score threshold {threshold}",
        keep.len(),
        scores.len()
    );
    dataset.select_rows(&keep)
}
