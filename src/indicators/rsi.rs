// =============================================================================
// Relative Strength Index (RSI) — simple rolling averages, unit scale
// =============================================================================
//
// Step 1 — Compute price changes (deltas) from consecutive closes.
// Step 2 — Split into gains = max(Δ, 0) and losses = max(-Δ, 0).  A delta that
//          cannot be computed (row 0, or a missing close on either side)
//          contributes zero gain and zero loss.
// Step 3 — avg_gain / avg_loss = rolling mean over `period` rows, partial
//          windows allowed from the very first row.
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 1 - 1 / (1 + RS)          (range [0, 1])
//
// avg_loss == 0 means RS = ∞ and the RSI saturates at 1.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::error::{ensure_positive, Result};
use crate::indicators::rolling::{first_difference, rolling_mean};
use crate::indicators::Indicator;
use crate::price_series::PriceSeries;
use crate::types::{Column, NamedColumn};

fn default_period() -> usize {
    14
}

/// Parameters for [`rsi`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsiParams {
    #[serde(default = "default_period")]
    pub period: usize,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self {
            period: default_period(),
        }
    }
}

impl RsiParams {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("rsi.period", self.period)
    }
}

/// Compute the RSI series over the close column.
///
/// The output is row-aligned.  A row is `None` exactly when its own delta is
/// unavailable (always row 0).
pub fn rsi(series: &PriceSeries, params: &RsiParams) -> Result<Vec<Option<f64>>> {
    params.validate()?;
    let delta = first_difference(series.close()?);

    let gains: Vec<Option<f64>> = delta
        .iter()
        .map(|d| Some(d.map_or(0.0, |d| d.max(0.0))))
        .collect();
    let losses: Vec<Option<f64>> = delta
        .iter()
        .map(|d| Some(d.map_or(0.0, |d| (-d).max(0.0))))
        .collect();

    let avg_gain = rolling_mean(&gains, params.period, 1);
    let avg_loss = rolling_mean(&losses, params.period, 1);

    Ok(delta
        .iter()
        .zip(avg_gain.iter().zip(&avg_loss))
        .map(|(d, (g, l))| {
            d.as_ref()?;
            Some(rsi_from_averages((*g)?, (*l)?))
        })
        .collect())
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Convert average gain / average loss into an RSI value in [0, 1].
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 1.0;
    }
    let rs = avg_gain / avg_loss;
    1.0 - 1.0 / (1.0 + rs)
}

impl Indicator for RsiParams {
    fn name(&self) -> String {
        "rsi".to_string()
    }

    fn compute(&self, series: &PriceSeries) -> Result<Vec<NamedColumn>> {
        Ok(vec![NamedColumn::new(self.name(), Column::Numeric(rsi(series, self)?))])
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn rsi_of(closes: &[f64], period: usize) -> Vec<Option<f64>> {
        rsi(&PriceSeries::from_closes(closes), &RsiParams::new(period)).unwrap()
    }

    #[test]
    fn rsi_empty_input() {
        assert!(rsi_of(&[], 14).is_empty());
    }

    #[test]
    fn rsi_period_zero() {
        let series = PriceSeries::from_closes(&[1.0, 2.0, 3.0]);
        assert!(rsi(&series, &RsiParams::new(0)).is_err());
    }

    #[test]
    fn rsi_first_row_unavailable() {
        let series = rsi_of(&[44.34, 44.09, 44.15], 14);
        assert_eq!(series.len(), 3);
        assert_eq!(series[0], None);
        assert!(series[1..].iter().all(Option::is_some));
    }

    #[test]
    fn rsi_all_gains() {
        // Strictly ascending prices => avg_loss = 0 => RSI saturates at 1.
        let closes: Vec<f64> = (1..=30).map(f64::from).collect();
        let series = rsi_of(&closes, 14);
        for v in &series[1..] {
            assert_eq!(*v, Some(1.0));
        }
    }

    #[test]
    fn rsi_all_losses() {
        // Strictly descending prices => avg_gain = 0 => RSI = 0.
        let closes: Vec<f64> = (1..=30).rev().map(f64::from).collect();
        let series = rsi_of(&closes, 14);
        for v in &series[1..] {
            assert!(v.unwrap().abs() < 1e-10, "expected 0.0, got {v:?}");
        }
    }

    #[test]
    fn rsi_known_values_with_partial_windows() {
        // period 2; deltas: -, +2, -1, +3
        // gains  [0, 2, 0, 3]  -> avg [0, 1, 1, 1.5]
        // losses [0, 0, 1, 0]  -> avg [0, 0, 0.5, 0.5]
        let series = rsi_of(&[10.0, 12.0, 11.0, 14.0], 2);
        assert_eq!(series[0], None);
        assert_eq!(series[1], Some(1.0));
        assert!((series[2].unwrap() - (1.0 - 1.0 / 3.0)).abs() < 1e-12);
        assert!((series[3].unwrap() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn rsi_range_check() {
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08,
            45.89, 46.03, 44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        for v in rsi_of(&closes, 14).into_iter().flatten() {
            assert!((0.0..=1.0).contains(&v), "RSI {v} out of range");
        }
    }

    #[test]
    fn rsi_missing_close_blanks_adjacent_rows() {
        let series = PriceSeries::builder()
            .close(vec![Some(1.0), Some(2.0), None, Some(3.0), Some(2.0)])
            .build()
            .unwrap();
        let out = rsi(&series, &RsiParams::new(14)).unwrap();
        assert_eq!(out[0], None);
        assert!(out[1].is_some());
        assert_eq!(out[2], None);
        assert_eq!(out[3], None);
        assert!(out[4].is_some());
    }

    #[test]
    fn rsi_is_idempotent() {
        let closes = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0];
        assert_eq!(rsi_of(&closes, 3), rsi_of(&closes, 3));
    }
}
