// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators derived from a
// price table.  Every public function takes the validated `PriceSeries` plus
// its parameters and returns freshly allocated columns, row-aligned with the
// input.  Rows that cannot be computed are `None`; only structural problems
// (missing column, invalid parameter) fail the call.

use std::fmt::Debug;

use crate::error::Result;
use crate::price_series::PriceSeries;
use crate::types::NamedColumn;

pub mod bollinger;
pub mod candles;
pub mod ema;
pub mod macd;
pub mod rolling;
pub mod rsi;

pub use bollinger::{bollinger_bands, BollingerColumns, BollingerParams};
pub use candles::{
    doji, engulfing, hammer, inverted_hammer, marubozo, DojiParams, Engulfing, HammerParams,
    InvertedHammer, Marubozo,
};
pub use ema::{calculate_ema, ewma, EwmaParams};
pub use macd::{macd, MacdColumns, MacdParams};
pub use rsi::{rsi, RsiParams};

/// A named producer of derived columns.
///
/// Implemented by each indicator's parameter type so a configured set of
/// indicators can be run as one pipeline.  Implementations hold no state
/// between calls.
pub trait Indicator: Debug + Send + Sync {
    /// Pipeline label, also the column name for single-column indicators.
    fn name(&self) -> String;

    /// Compute every column this indicator publishes.
    fn compute(&self, series: &PriceSeries) -> Result<Vec<NamedColumn>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicators_are_object_safe() {
        let pipeline: Vec<Box<dyn Indicator>> = vec![
            Box::new(RsiParams::default()),
            Box::new(EwmaParams::new(5)),
            Box::new(MacdParams::default()),
        ];
        let series = PriceSeries::from_closes(&[1.0, 2.0, 3.0, 2.5]);
        let total: usize = pipeline
            .iter()
            .map(|ind| ind.compute(&series).unwrap().len())
            .sum();
        assert_eq!(total, 5);
    }
}
