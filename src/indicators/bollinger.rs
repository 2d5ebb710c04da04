// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ), where σ is the *sample* standard deviation of
// the same window.
//
// Every band is published relative to the contemporaneous close
// (band / close), so a middle band of exactly 1.0 means the close sits on its
// moving average.  Rows before the window fills are `None`.

use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, ensure_positive, Result};
use crate::indicators::rolling::{rolling_mean, rolling_std};
use crate::indicators::Indicator;
use crate::price_series::PriceSeries;
use crate::types::{Column, NamedColumn};

fn default_period() -> usize {
    20
}

fn default_num_std_dev() -> f64 {
    2.0
}

/// Parameters for [`bollinger_bands`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerParams {
    #[serde(default = "default_period")]
    pub period: usize,
    /// Band half-width in standard deviations (k).
    #[serde(default = "default_num_std_dev")]
    pub num_std_dev: f64,
}

impl Default for BollingerParams {
    fn default() -> Self {
        Self {
            period: default_period(),
            num_std_dev: default_num_std_dev(),
        }
    }
}

impl BollingerParams {
    pub fn validate(&self) -> Result<()> {
        ensure_positive("bollinger.period", self.period)?;
        ensure_non_negative("bollinger.num_std_dev", self.num_std_dev)
    }
}

/// Close-normalised Bollinger Bands.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BollingerColumns {
    pub middle: Vec<Option<f64>>,
    pub upper: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

/// Calculate close-normalised Bollinger Bands.
///
/// A row is `None` when:
/// - fewer than `period` closes are observed in its window,
/// - its own close is missing,
/// - the normalised value is non-finite (zero close).
pub fn bollinger_bands(series: &PriceSeries, params: &BollingerParams) -> Result<BollingerColumns> {
    params.validate()?;
    let close = series.close()?;

    let sma = rolling_mean(close, params.period, params.period);
    let std_dev = rolling_std(close, params.period, params.period);

    let n = close.len();
    let mut middle = Vec::with_capacity(n);
    let mut upper = Vec::with_capacity(n);
    let mut lower = Vec::with_capacity(n);

    for i in 0..n {
        let normalise = |band: Option<f64>| -> Option<f64> {
            let v = band? / close[i]?;
            v.is_finite().then_some(v)
        };
        let band = |sign: f64| -> Option<f64> {
            Some(sma[i]? + sign * params.num_std_dev * std_dev[i]?)
        };

        middle.push(normalise(sma[i]));
        upper.push(normalise(band(1.0)));
        lower.push(normalise(band(-1.0)));
    }

    Ok(BollingerColumns {
        middle,
        upper,
        lower,
    })
}

impl Indicator for BollingerParams {
    fn name(&self) -> String {
        "bollinger_bands".to_string()
    }

    fn compute(&self, series: &PriceSeries) -> Result<Vec<NamedColumn>> {
        let bands = bollinger_bands(series, self)?;
        Ok(vec![
            NamedColumn::new("bollinger_middle_band", Column::Numeric(bands.middle)),
            NamedColumn::new("bollinger_upper_band", Column::Numeric(bands.upper)),
            NamedColumn::new("bollinger_lower_band", Column::Numeric(bands.lower)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bollinger_basic() {
        let closes: Vec<f64> = (1..=20).map(f64::from).collect();
        let series = PriceSeries::from_closes(&closes);
        let bb = bollinger_bands(&series, &BollingerParams::default()).unwrap();
        assert_eq!(bb.middle.len(), 20);

        // SMA(1..=20) = 10.5, close = 20
        let middle = bb.middle[19].unwrap();
        assert!((middle - 10.5 / 20.0).abs() < 1e-12);
        assert!(bb.upper[19].unwrap() > middle);
        assert!(bb.lower[19].unwrap() < middle);

        // Sample std of 1..=20 = sqrt(35)
        let sigma = 35.0_f64.sqrt();
        assert!((bb.upper[19].unwrap() - (10.5 + 2.0 * sigma) / 20.0).abs() < 1e-12);
        assert!((bb.lower[19].unwrap() - (10.5 - 2.0 * sigma) / 20.0).abs() < 1e-12);
    }

    #[test]
    fn bollinger_insufficient_history() {
        let closes: Vec<f64> = (1..=25).map(f64::from).collect();
        let series = PriceSeries::from_closes(&closes);
        let bb = bollinger_bands(&series, &BollingerParams::default()).unwrap();
        assert!(bb.middle[..19].iter().all(Option::is_none));
        assert!(bb.upper[..19].iter().all(Option::is_none));
        assert!(bb.lower[..19].iter().all(Option::is_none));
        assert!(bb.middle[19..].iter().all(Option::is_some));
    }

    #[test]
    fn bollinger_flat_is_exactly_one() {
        let series = PriceSeries::from_closes(&[100.0; 20]);
        let bb = bollinger_bands(&series, &BollingerParams::default()).unwrap();
        assert_eq!(bb.middle[19], Some(1.0));
        assert_eq!(bb.upper[19], Some(1.0));
        assert_eq!(bb.lower[19], Some(1.0));
    }

    #[test]
    fn bollinger_zero_close_is_unavailable() {
        let params = BollingerParams {
            period: 2,
            num_std_dev: 2.0,
        };
        let bb = bollinger_bands(&PriceSeries::from_closes(&[0.0, 0.0, 1.0]), &params).unwrap();
        assert_eq!(bb.middle[1], None);
        assert!(bb.middle[2].is_some());
    }

    #[test]
    fn bollinger_rejects_negative_width() {
        let params = BollingerParams {
            period: 20,
            num_std_dev: -1.0,
        };
        assert!(bollinger_bands(&PriceSeries::from_closes(&[1.0]), &params).is_err());
    }
}
