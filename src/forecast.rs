// =============================================================================
// Forecast labeler — raw look-ahead targets
// =============================================================================
//
// For every row that has a bar `span` rows ahead, the label is that bar's
// close.  The value is the raw future price, not a buy / sell class; the
// trailing `span` rows have no target and are dropped rather than padded.

use serde::Serialize;
use tracing::trace;

use crate::error::Result;
use crate::price_series::PriceSeries;

/// Default look-ahead distance in rows.
pub const DEFAULT_SPAN: usize = 10;

/// Look-ahead labels, `len(series) - span` long.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub span: usize,
    pub values: Vec<Option<f64>>,
}

impl Forecast {
    /// Column name the labels are published under.
    pub fn name(&self) -> String {
        format!("precise_forecast_{}", self.span)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Emit `close[i + span]` for each `i` in `0..len - span`.
///
/// Returns an empty forecast when `span >= len`.
pub fn precise_forecast(series: &PriceSeries, span: usize) -> Result<Forecast> {
    let close = series.close()?;
    let values = close.get(span..).map(<[_]>::to_vec).unwrap_or_default();

    trace!(rows = close.len(), span, labels = values.len(), "forecast labels built");

    Ok(Forecast { span, values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MetricsError;

    fn closes(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64 * 1.5).collect()
    }

    #[test]
    fn forecast_is_shorter_by_span() {
        let c = closes(20);
        let out = precise_forecast(&PriceSeries::from_closes(&c), 5).unwrap();
        assert_eq!(out.len(), 15);
        assert_eq!(out.values[0], Some(c[5]));
        assert_eq!(out.values[14], Some(c[19]));
        assert_eq!(out.name(), "precise_forecast_5");
    }

    #[test]
    fn forecast_default_span() {
        let c = closes(25);
        let out = precise_forecast(&PriceSeries::from_closes(&c), DEFAULT_SPAN).unwrap();
        assert_eq!(out.len(), 15);
        assert_eq!(out.values[0], Some(c[10]));
    }

    #[test]
    fn forecast_span_longer_than_series() {
        let series = PriceSeries::from_closes(&closes(3));
        assert!(precise_forecast(&series, 3).unwrap().is_empty());
        assert!(precise_forecast(&series, 10).unwrap().is_empty());
    }

    #[test]
    fn forecast_carries_missing_closes() {
        let series = PriceSeries::builder()
            .close(vec![Some(1.0), Some(2.0), None, Some(4.0)])
            .build()
            .unwrap();
        let out = precise_forecast(&series, 1).unwrap();
        assert_eq!(out.values, vec![Some(2.0), None, Some(4.0)]);
    }

    #[test]
    fn forecast_requires_close() {
        let series = PriceSeries::builder().open(vec![Some(1.0)]).build().unwrap();
        assert_eq!(
            precise_forecast(&series, 1).unwrap_err(),
            MetricsError::MissingColumn { column: "Close" }
        );
    }
}
