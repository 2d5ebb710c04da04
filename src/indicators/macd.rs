// =============================================================================
// MACD — Moving Average Convergence / Divergence
// =============================================================================
//
//   macd      = EMA(close, short_span) - EMA(close, long_span)
//   signal    = EMA(macd, signal_span)
//   histogram = macd - signal
//
// All three EMAs use the non-adjusted recurrence from `ema.rs`.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{ensure_positive, Result};
use crate::indicators::ema::calculate_ema;
use crate::indicators::Indicator;
use crate::price_series::PriceSeries;
use crate::types::{Column, NamedColumn};

fn default_short_span() -> usize {
    12
}

fn default_long_span() -> usize {
    26
}

fn default_signal_span() -> usize {
    9
}

/// Parameters for [`macd`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacdParams {
    #[serde(default = "default_short_span")]
    pub short_span: usize,
    #[serde(default = "default_long_span")]
    pub long_span: usize,
    #[serde(default = "default_signal_span")]
    pub signal_span: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            short_span: default_short_span(),
            long_span: default_long_span(),
            signal_span: default_signal_span(),
        }
    }
}

impl MacdParams {
    pub fn validate(&self) -> Result<()> {
        ensure_positive("macd.short_span", self.short_span)?;
        ensure_positive("macd.long_span", self.long_span)?;
        ensure_positive("macd.signal_span", self.signal_span)
    }
}

/// The three MACD columns, row-aligned with the input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacdColumns {
    pub macd: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub histogram: Vec<Option<f64>>,
}

/// Compute MACD line, signal line and histogram over the close column.
pub fn macd(series: &PriceSeries, params: &MacdParams) -> Result<MacdColumns> {
    params.validate()?;
    let close = series.close()?;

    let short = calculate_ema(close, params.short_span);
    let long = calculate_ema(close, params.long_span);

    let line: Vec<Option<f64>> = short
        .iter()
        .zip(&long)
        .map(|(s, l)| Some((*s)? - (*l)?))
        .collect();

    let signal = calculate_ema(&line, params.signal_span);

    let histogram = line
        .iter()
        .zip(&signal)
        .map(|(m, s)| Some((*m)? - (*s)?))
        .collect();

    trace!(
        rows = close.len(),
        short = params.short_span,
        long = params.long_span,
        signal = params.signal_span,
        "MACD computed"
    );

    Ok(MacdColumns {
        macd: line,
        signal,
        histogram,
    })
}

impl Indicator for MacdParams {
    fn name(&self) -> String {
        "macd".to_string()
    }

    fn compute(&self, series: &PriceSeries) -> Result<Vec<NamedColumn>> {
        let cols = macd(series, self)?;
        Ok(vec![
            NamedColumn::new("macd", Column::Numeric(cols.macd)),
            NamedColumn::new("macd_signal", Column::Numeric(cols.signal)),
            NamedColumn::new("macd_histogram", Column::Numeric(cols.histogram)),
        ])
    }
}
