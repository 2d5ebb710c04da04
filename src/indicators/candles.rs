// =============================================================================
// Candlestick Pattern Classifiers
// =============================================================================
//
// Single-bar and two-bar classifications over open / high / low / close.
//
//   body         = |close - open|
//   range        = high - low
//   upper shadow = high - max(open, close)
//   lower shadow = min(open, close) - low
//
// A row is `None` whenever one of the prices it needs is missing.  Engulfing
// compares against the previous bar, so its row 0 is always `None`.

use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, MetricsError, Result};
use crate::indicators::Indicator;
use crate::price_series::PriceSeries;
use crate::types::{CandlePattern, Column, NamedColumn};

// ---------------------------------------------------------------------------
// Bar geometry
// ---------------------------------------------------------------------------

/// One fully observed candle.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Candle {
    open: f64,
    high: f64,
    low: f64,
    close: f64,
}

impl Candle {
    fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    fn range(&self) -> f64 {
        self.high - self.low
    }

    fn upper_shadow(&self) -> f64 {
        self.high - self.open.max(self.close)
    }

    fn lower_shadow(&self) -> f64 {
        self.open.min(self.close) - self.low
    }
}

/// Zip the four price columns into per-row candles.
fn candles(series: &PriceSeries) -> Result<Vec<Option<Candle>>> {
    let open = series.open()?;
    let high = series.high()?;
    let low = series.low()?;
    let close = series.close()?;
    Ok((0..series.len())
        .map(|i| {
            Some(Candle {
                open: open[i]?,
                high: high[i]?,
                low: low[i]?,
                close: close[i]?,
            })
        })
        .collect())
}

fn flag(hit: bool) -> u8 {
    u8::from(hit)
}

// ---------------------------------------------------------------------------
// Engulfing
// ---------------------------------------------------------------------------

/// Two-bar engulfing pattern.
///
/// - bullish: `close > open && close > prev_open && open < prev_close`
/// - bearish: `close < open && close < prev_open && open > prev_close`
pub fn engulfing(series: &PriceSeries) -> Result<Vec<Option<CandlePattern>>> {
    let open = series.open()?;
    let close = series.close()?;

    let mut result = Vec::with_capacity(series.len());
    if series.is_empty() {
        return Ok(result);
    }
    result.push(None);

    for i in 1..series.len() {
        let cell = match (open[i - 1], close[i - 1], open[i], close[i]) {
            (Some(prev_open), Some(prev_close), Some(curr_open), Some(curr_close)) => {
                Some(classify_engulfing(prev_open, prev_close, curr_open, curr_close))
            }
            _ => None,
        };
        result.push(cell);
    }

    Ok(result)
}

fn classify_engulfing(
    prev_open: f64,
    prev_close: f64,
    curr_open: f64,
    curr_close: f64,
) -> CandlePattern {
    if curr_close > curr_open && curr_close > prev_open && curr_open < prev_close {
        CandlePattern::Bullish
    } else if curr_close < curr_open && curr_close < prev_open && curr_open > prev_close {
        CandlePattern::Bearish
    } else {
        CandlePattern::Neutral
    }
}

/// Marker type for the engulfing classifier in a pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Engulfing;

impl Indicator for Engulfing {
    fn name(&self) -> String {
        "engulfing".to_string()
    }

    fn compute(&self, series: &PriceSeries) -> Result<Vec<NamedColumn>> {
        Ok(vec![NamedColumn::new(self.name(), Column::Pattern(engulfing(series)?))])
    }
}

// ---------------------------------------------------------------------------
// Marubozo
// ---------------------------------------------------------------------------

/// Shadowless candle, decided on exact price equality.
///
/// - bullish: `open == low && close == high`
/// - bearish: `open == high && close == low`
#[allow(clippy::float_cmp)]
pub fn marubozo(series: &PriceSeries) -> Result<Vec<Option<CandlePattern>>> {
    Ok(candles(series)?
        .into_iter()
        .map(|c| {
            let c = c?;
            Some(if c.open == c.low && c.close == c.high {
                CandlePattern::Bullish
            } else if c.open == c.high && c.close == c.low {
                CandlePattern::Bearish
            } else {
                CandlePattern::Neutral
            })
        })
        .collect())
}

/// Marker type for the marubozo classifier in a pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Marubozo;

impl Indicator for Marubozo {
    fn name(&self) -> String {
        "marubozo".to_string()
    }

    fn compute(&self, series: &PriceSeries) -> Result<Vec<NamedColumn>> {
        Ok(vec![NamedColumn::new(self.name(), Column::Pattern(marubozo(series)?))])
    }
}

// ---------------------------------------------------------------------------
// Doji
// ---------------------------------------------------------------------------

fn default_epsilon() -> f64 {
    0.01
}

/// Parameters for [`doji`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DojiParams {
    /// Maximum body size as a fraction of the bar range.
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
}

impl Default for DojiParams {
    fn default() -> Self {
        Self {
            epsilon: default_epsilon(),
        }
    }
}

impl DojiParams {
    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("doji.epsilon", self.epsilon)
    }
}

/// 1 when `|open - close| <= epsilon * (high - low)`, else 0.
pub fn doji(series: &PriceSeries, params: &DojiParams) -> Result<Vec<Option<u8>>> {
    params.validate()?;
    Ok(candles(series)?
        .into_iter()
        .map(|c| c.map(|c| flag(c.body() <= params.epsilon * c.range())))
        .collect())
}

impl Indicator for DojiParams {
    fn name(&self) -> String {
        "doji".to_string()
    }

    fn compute(&self, series: &PriceSeries) -> Result<Vec<NamedColumn>> {
        Ok(vec![NamedColumn::new(self.name(), Column::Flag(doji(series, self)?))])
    }
}

// ---------------------------------------------------------------------------
// Hammer / Inverted hammer
// ---------------------------------------------------------------------------

fn default_body_ratio() -> f64 {
    0.3
}

fn default_shadow_ratio() -> f64 {
    2.0
}

/// Parameters shared by [`hammer`] and [`inverted_hammer`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HammerParams {
    /// Maximum body size as a fraction of the bar range.
    #[serde(default = "default_body_ratio")]
    pub body_ratio: f64,
    /// Minimum long-shadow length as a multiple of the body.  Must exceed 1.
    #[serde(default = "default_shadow_ratio")]
    pub shadow_ratio: f64,
}

impl Default for HammerParams {
    fn default() -> Self {
        Self {
            body_ratio: default_body_ratio(),
            shadow_ratio: default_shadow_ratio(),
        }
    }
}

impl HammerParams {
    /// `shadow_ratio > 1` keeps the long shadow strictly longer than the
    /// short one, which makes hammer and inverted hammer mutually exclusive.
    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("hammer.body_ratio", self.body_ratio)?;
        ensure_non_negative("hammer.shadow_ratio", self.shadow_ratio)?;
        if self.shadow_ratio <= 1.0 {
            return Err(MetricsError::InvalidParameter {
                name: "hammer.shadow_ratio",
                reason: format!("must be greater than 1, got {}", self.shadow_ratio),
            });
        }
        Ok(())
    }

    /// Small body, long shadow on one side, short shadow on the other.
    /// A bar with zero range carries no shape and never matches.
    fn matches(&self, c: &Candle, long_shadow: f64, short_shadow: f64) -> bool {
        let body = c.body();
        c.range() > 0.0
            && body <= self.body_ratio * c.range()
            && long_shadow >= self.shadow_ratio * body
            && short_shadow <= body
    }
}

/// 1 for a hammer (long lower shadow), else 0.
///
/// `body <= body_ratio * range && lower >= shadow_ratio * body && upper <= body`
/// on a bar with `range > 0`.
///
/// # Errors
/// `InvalidParameter` unless `body_ratio >= 0` and `shadow_ratio > 1`.  A
/// ratio of 1 or less would let the same bar be both a hammer and an
/// inverted hammer, so it is refused rather than computed.
pub fn hammer(series: &PriceSeries, params: &HammerParams) -> Result<Vec<Option<u8>>> {
    params.validate()?;
    Ok(candles(series)?
        .into_iter()
        .map(|c| c.map(|c| flag(params.matches(&c, c.lower_shadow(), c.upper_shadow()))))
        .collect())
}

/// 1 for an inverted hammer (long upper shadow), else 0.
///
/// Mirror of [`hammer`] with the shadows swapped; zero-range bars are 0.
///
/// # Errors
/// Same parameter domain as [`hammer`]: `shadow_ratio <= 1` is
/// `InvalidParameter`.
pub fn inverted_hammer(series: &PriceSeries, params: &HammerParams) -> Result<Vec<Option<u8>>> {
    params.validate()?;
    Ok(candles(series)?
        .into_iter()
        .map(|c| c.map(|c| flag(params.matches(&c, c.upper_shadow(), c.lower_shadow()))))
        .collect())
}

impl Indicator for HammerParams {
    fn name(&self) -> String {
        "hammer".to_string()
    }

    fn compute(&self, series: &PriceSeries) -> Result<Vec<NamedColumn>> {
        Ok(vec![NamedColumn::new(self.name(), Column::Flag(hammer(series, self)?))])
    }
}

/// Pipeline wrapper that runs [`inverted_hammer`] with the given params.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InvertedHammer(pub HammerParams);

impl Indicator for InvertedHammer {
    fn name(&self) -> String {
        "inverted_hammer".to_string()
    }

    fn compute(&self, series: &PriceSeries) -> Result<Vec<NamedColumn>> {
        Ok(vec![NamedColumn::new(
            self.name(),
            Column::Flag(inverted_hammer(series, &self.0)?),
        )])
    }
}
