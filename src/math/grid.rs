/// Evenly spaced values in `[start, stop)`, computed as `start + i * step`.
///
/// Works for negative steps as well (descending sequences). Returns an empty
/// vector for a zero or non-finite step, or when the range is empty.
///
/// ```
/// use stand_thinning_planner::math::arange;
///
/// assert_eq!(arange(0.0, 2.0, 0.5), vec![0.0, 0.5, 1.0, 1.5]);
/// assert_eq!(arange(1.0, 0.0, -0.5), vec![1.0, 0.5]);
/// ```
pub fn arange(start: f64, stop: f64, step: f64) -> Vec<f64> {
    if step == 0.0 || !step.is_finite() || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    let count = ((stop - start) / step).ceil();
    if count <= 0.0 {
        return Vec::new();
    }
    (0..count as usize).map(|i| start + i as f64 * step).collect()
}

/// Monotonicity repair: make `values` weakly non-decreasing in place,
/// `y[i] = max(y[i], y[i-1])`.
pub fn enforce_non_decreasing(values: &mut [f64]) {
    for i in 1..values.len() {
        if values[i] < values[i - 1] {
            values[i] = values[i - 1];
        }
    }
}
