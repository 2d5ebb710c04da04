// =============================================================================
// Rolling-window statistics
// =============================================================================
//
// Trailing windows of `period` rows ending at the current row.  Only observed
// (`Some`) cells count towards a window; a row whose window holds fewer than
// `min_periods` observations yields `None`.
//
// Windows are re-summed at every row, O(N * period), so the output for a row
// never depends on floating-point residue carried from earlier rows.

/// Element-wise `values[i] - values[i - 1]`.  Row 0, and any row where either
/// operand is missing, is `None`.
pub fn first_difference(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut result = Vec::with_capacity(values.len());
    if values.is_empty() {
        return result;
    }
    result.push(None);
    result.extend(values.windows(2).map(|w| match (w[0], w[1]) {
        (Some(prev), Some(curr)) => Some(curr - prev),
        _ => None,
    }));
    result
}

/// Observed cells of the window ending at row `end` (inclusive).
fn window(values: &[Option<f64>], end: usize, period: usize) -> impl Iterator<Item = f64> + '_ {
    let start = (end + 1).saturating_sub(period);
    values[start..=end].iter().flatten().copied()
}

fn sum_count(observed: impl Iterator<Item = f64>) -> (f64, usize) {
    observed.fold((0.0, 0), |(sum, n), x| (sum + x, n + 1))
}

/// Rolling arithmetic mean.
///
/// `min_periods` is clamped to `1..=period`.  Returns an empty vec when
/// `period == 0`.
pub fn rolling_mean(values: &[Option<f64>], period: usize, min_periods: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return Vec::new();
    }
    let min_periods = min_periods.clamp(1, period);

    (0..values.len())
        .map(|i| {
            let (sum, count) = sum_count(window(values, i, period));
            if count < min_periods {
                None
            } else {
                Some(sum / count as f64)
            }
        })
        .collect()
}

/// Rolling sample standard deviation (N - 1 denominator).
///
/// A window needs at least `max(min_periods, 2)` observations.  Returns an
/// empty vec when `period == 0`.
pub fn rolling_std(values: &[Option<f64>], period: usize, min_periods: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return Vec::new();
    }
    let min_periods = min_periods.clamp(1, period).max(2);

    (0..values.len())
        .map(|i| {
            let (sum, count) = sum_count(window(values, i, period));
            if count < min_periods {
                return None;
            }
            let mean = sum / count as f64;
            let sq: f64 = window(values, i, period).map(|x| (x - mean).powi(2)).sum();
            Some((sq / (count - 1) as f64).sqrt())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn difference_leaves_first_row_empty() {
        let diff = first_difference(&cells(&[1.0, 3.0, 2.0]));
        assert_eq!(diff, vec![None, Some(2.0), Some(-1.0)]);
    }

    #[test]
    fn difference_propagates_gaps() {
        let diff = first_difference(&[Some(1.0), None, Some(4.0), Some(5.0)]);
        assert_eq!(diff, vec![None, None, None, Some(1.0)]);
        assert!(first_difference(&[]).is_empty());
    }

    #[test]
    fn mean_waits_for_full_window() {
        let mean = rolling_mean(&cells(&[1.0, 2.0, 3.0, 4.0]), 3, 3);
        assert_eq!(mean, vec![None, None, Some(2.0), Some(3.0)]);
    }

    #[test]
    fn mean_with_partial_windows() {
        let mean = rolling_mean(&cells(&[2.0, 4.0, 6.0, 8.0]), 2, 1);
        assert_eq!(mean, vec![Some(2.0), Some(3.0), Some(5.0), Some(7.0)]);
    }

    #[test]
    fn mean_skips_missing_cells() {
        let mean = rolling_mean(&[Some(2.0), None, Some(6.0)], 3, 2);
        assert_eq!(mean, vec![None, None, Some(4.0)]);
    }

    #[test]
    fn std_is_sample_deviation() {
        // Sample std of [2, 4, 4, 4, 5, 5, 7, 9] = sqrt(32 / 7).
        let values = cells(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        let std = rolling_std(&values, 8, 8);
        assert!(std[..7].iter().all(Option::is_none));
        let last = std[7].unwrap();
        assert!((last - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn std_needs_two_observations() {
        let std = rolling_std(&cells(&[5.0, 5.0]), 1, 1);
        assert_eq!(std, vec![None, None]);
    }

    #[test]
    fn zero_period_yields_nothing() {
        assert!(rolling_mean(&cells(&[1.0]), 0, 1).is_empty());
        assert!(rolling_std(&cells(&[1.0]), 0, 1).is_empty());
    }
}
