// =============================================================================
// Exponentially Weighted Moving Average (EWMA / EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula (non-adjusted recurrence):
//   alpha  = 2 / (span + 1)
//   EMA_0  = x_0
//   EMA_t  = alpha * x_t + (1 - alpha) * EMA_{t-1}
//
// The recurrence is seeded with the first observed value, not with an SMA and
// not with a bias-corrected weighting.  MACD and its signal line depend on
// this exact form.  Missing rows keep decaying the weight of the last EMA
// rather than being skipped over.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::error::{ensure_positive, Result};
use crate::indicators::Indicator;
use crate::price_series::PriceSeries;
use crate::types::{Column, NamedColumn};

fn default_span() -> usize {
    10
}

/// Parameters for [`ewma`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EwmaParams {
    /// Decay span; `alpha = 2 / (span + 1)`.
    #[serde(default = "default_span")]
    pub span: usize,
}

impl Default for EwmaParams {
    fn default() -> Self {
        Self {
            span: default_span(),
        }
    }
}

impl EwmaParams {
    pub fn new(span: usize) -> Self {
        Self { span }
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("ewma.span", self.span)
    }
}

/// Smoothing factor for a given span.
pub fn alpha(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// Compute the EMA series for `values` with decay `span`.
///
/// Output is row-aligned with the input.
///
/// # Edge cases
/// - `span == 0` => empty vec
/// - Rows before the first observed value are `None`.
/// - A missing cell yields `None` for that row, but the weight of the last
///   EMA keeps decaying by `1 - alpha` per row.  The next observed cell is
///   blended as `(w * prev + alpha * x) / (w + alpha)`; without gaps this is
///   the plain recurrence above.
pub fn calculate_ema(values: &[Option<f64>], span: usize) -> Vec<Option<f64>> {
    if span == 0 {
        return Vec::new();
    }

    let alpha = alpha(span);
    let decay = 1.0 - alpha;
    let mut weighted: Option<f64> = None;
    let mut old_weight = 1.0;
    let mut result = Vec::with_capacity(values.len());

    for cell in values {
        let Some(prev) = weighted else {
            weighted = *cell;
            result.push(*cell);
            continue;
        };

        old_weight *= decay;
        let Some(x) = *cell else {
            result.push(None);
            continue;
        };

        // Skip the blend on an unchanged value so flat series stay exact.
        #[allow(clippy::float_cmp)]
        let ema = if prev == x {
            prev
        } else {
            (old_weight * prev + alpha * x) / (old_weight + alpha)
        };
        old_weight = 1.0;
        weighted = Some(ema);
        result.push(Some(ema));
    }

    result
}

/// EWMA of the close column.
pub fn ewma(series: &PriceSeries, params: &EwmaParams) -> Result<Vec<Option<f64>>> {
    params.validate()?;
    Ok(calculate_ema(series.close()?, params.span))
}

impl Indicator for EwmaParams {
    fn name(&self) -> String {
        format!("ewma_{}", self.span)
    }

    fn compute(&self, series: &PriceSeries) -> Result<Vec<NamedColumn>> {
        Ok(vec![NamedColumn::new(
            self.name(),
            Column::Numeric(ewma(series, self)?),
        )])
    }
}
