// =============================================================================
// Stonks Metrics — technical-analysis columns over OHLCV price tables
// =============================================================================
//
// A price table is validated once into a `PriceSeries`; the indicator library
// turns it into row-aligned derived columns (candlestick patterns, moving
// averages, oscillators) and the forecast labeler adds look-ahead targets.
// Nothing runs at load time: callers invoke the functions they need, or build
// a whole `FeatureFrame` from a `MetricsConfig`.
// =============================================================================

pub mod config;
pub mod error;
pub mod feature_frame;
pub mod forecast;
pub mod indicators;
pub mod price_series;
pub mod types;

pub use crate::config::MetricsConfig;
pub use crate::error::{MetricsError, Result};
pub use crate::feature_frame::FeatureFrame;
pub use crate::forecast::{precise_forecast, Forecast};
pub use crate::indicators::Indicator;
pub use crate::price_series::{Field, PriceBar, PriceSeries, PriceSeriesBuilder, Timestamp};
pub use crate::types::{CandlePattern, Column, NamedColumn};
