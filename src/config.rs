// =============================================================================
// Metrics Configuration — indicator selection and parameters
// =============================================================================
//
// Every tunable indicator parameter lives here so that a feature frame can be
// reconfigured without code changes.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash.  All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
//
// =============================================================================

use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::forecast::DEFAULT_SPAN;
use crate::indicators::{
    BollingerParams, DojiParams, Engulfing, EwmaParams, HammerParams, Indicator, InvertedHammer,
    MacdParams, Marubozo, RsiParams,
};

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_true() -> bool {
    true
}

fn default_ewma_spans() -> Vec<usize> {
    vec![9, 21]
}

fn default_forecast_span() -> Option<usize> {
    Some(DEFAULT_SPAN)
}

// =============================================================================
// MetricsConfig
// =============================================================================

/// Which indicators a feature frame computes, and with what parameters.
///
/// Every field has a serde default so that older JSON files missing new fields
/// will still deserialise correctly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    // --- Candlestick patterns -----------------------------------------------

    #[serde(default = "default_true")]
    pub enable_engulfing: bool,

    #[serde(default = "default_true")]
    pub enable_marubozo: bool,

    #[serde(default = "default_true")]
    pub enable_doji: bool,

    #[serde(default = "default_true")]
    pub enable_hammer: bool,

    #[serde(default = "default_true")]
    pub enable_inverted_hammer: bool,

    #[serde(default)]
    pub doji: DojiParams,

    /// Shared by hammer and inverted hammer.
    #[serde(default)]
    pub hammer: HammerParams,

    // --- Moving averages & oscillators --------------------------------------

    #[serde(default = "default_true")]
    pub enable_macd: bool,

    #[serde(default = "default_true")]
    pub enable_bollinger: bool,

    #[serde(default = "default_true")]
    pub enable_rsi: bool,

    #[serde(default)]
    pub macd: MacdParams,

    #[serde(default)]
    pub bollinger: BollingerParams,

    #[serde(default)]
    pub rsi: RsiParams,

    /// One `ewma_{span}` column per entry.
    #[serde(default = "default_ewma_spans")]
    pub ewma_spans: Vec<usize>,

    // --- Labels --------------------------------------------------------------

    /// Look-ahead distance for `precise_forecast`; `null` disables labels.
    #[serde(default = "default_forecast_span")]
    pub forecast_span: Option<usize>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enable_engulfing: true,
            enable_marubozo: true,
            enable_doji: true,
            enable_hammer: true,
            enable_inverted_hammer: true,
            doji: DojiParams::default(),
            hammer: HammerParams::default(),
            enable_macd: true,
            enable_bollinger: true,
            enable_rsi: true,
            macd: MacdParams::default(),
            bollinger: BollingerParams::default(),
            rsi: RsiParams::default(),
            ewma_spans: default_ewma_spans(),
            forecast_span: default_forecast_span(),
        }
    }
}

impl MetricsConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read metrics config from {}", path.display()))?;

        Self::parse(path, &content)
    }

    /// Load from `path`, falling back to defaults only when the file is not
    /// found.  Any other read error, and any parse failure, is reported.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(path, &content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "metrics config not found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e)
                .with_context(|| format!("failed to read metrics config from {}", path.display())),
        }
    }

    fn parse(path: &Path, content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)
            .with_context(|| format!("failed to parse metrics config from {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("invalid metrics config in {}", path.display()))?;

        info!(
            path = %path.display(),
            indicators = config.indicators().len(),
            forecast_span = ?config.forecast_span,
            "metrics config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise metrics config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "metrics config saved (atomic)");
        Ok(())
    }

    /// Check every enabled indicator's parameters.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.enable_doji {
            self.doji.validate()?;
        }
        if self.enable_hammer || self.enable_inverted_hammer {
            self.hammer.validate()?;
        }
        if self.enable_macd {
            self.macd.validate()?;
        }
        if self.enable_bollinger {
            self.bollinger.validate()?;
        }
        if self.enable_rsi {
            self.rsi.validate()?;
        }
        for &span in &self.ewma_spans {
            EwmaParams::new(span).validate()?;
        }
        Ok(())
    }

    /// The enabled indicators, in feature-frame column order.
    pub fn indicators(&self) -> Vec<Box<dyn Indicator>> {
        let mut pipeline: Vec<Box<dyn Indicator>> = Vec::new();

        if self.enable_engulfing {
            pipeline.push(Box::new(Engulfing));
        }
        if self.enable_marubozo {
            pipeline.push(Box::new(Marubozo));
        }
        if self.enable_doji {
            pipeline.push(Box::new(self.doji));
        }
        if self.enable_hammer {
            pipeline.push(Box::new(self.hammer));
        }
        if self.enable_inverted_hammer {
            pipeline.push(Box::new(InvertedHammer(self.hammer)));
        }
        if self.enable_macd {
            pipeline.push(Box::new(self.macd));
        }
        for &span in &self.ewma_spans {
            pipeline.push(Box::new(EwmaParams::new(span)));
        }
        if self.enable_bollinger {
            pipeline.push(Box::new(self.bollinger));
        }
        if self.enable_rsi {
            pipeline.push(Box::new(self.rsi));
        }

        pipeline
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("stonks-metrics-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn default_config_has_expected_values() {
        let cfg = MetricsConfig::default();
        assert!(cfg.enable_engulfing);
        assert!(cfg.enable_rsi);
        assert_eq!(cfg.macd.short_span, 12);
        assert_eq!(cfg.macd.long_span, 26);
        assert_eq!(cfg.macd.signal_span, 9);
        assert_eq!(cfg.bollinger.period, 20);
        assert!((cfg.bollinger.num_std_dev - 2.0).abs() < f64::EPSILON);
        assert_eq!(cfg.rsi.period, 14);
        assert!((cfg.doji.epsilon - 0.01).abs() < f64::EPSILON);
        assert!((cfg.hammer.body_ratio - 0.3).abs() < f64::EPSILON);
        assert!((cfg.hammer.shadow_ratio - 2.0).abs() < f64::EPSILON);
        assert_eq!(cfg.forecast_span, Some(10));
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: MetricsConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, MetricsConfig::default());
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{
            "enable_doji": false,
            "rsi": { "period": 7 },
            "macd": { "short_span": 5 }
        }"#;
        let cfg: MetricsConfig = serde_json::from_str(json).unwrap();
        assert!(!cfg.enable_doji);
        assert_eq!(cfg.rsi.period, 7);
        assert_eq!(cfg.macd.short_span, 5);
        assert_eq!(cfg.macd.long_span, 26);
        assert!(cfg.enable_hammer);
    }

    #[test]
    fn null_forecast_span_disables_labels() {
        let cfg: MetricsConfig = serde_json::from_str(r#"{ "forecast_span": null }"#).unwrap();
        assert_eq!(cfg.forecast_span, None);
    }

    #[test]
    fn default_pipeline_order() {
        let names: Vec<String> = MetricsConfig::default()
            .indicators()
            .iter()
            .map(|i| i.name())
            .collect();
        assert_eq!(
            names,
            [
                "engulfing",
                "marubozo",
                "doji",
                "hammer",
                "inverted_hammer",
                "macd",
                "ewma_9",
                "ewma_21",
                "bollinger_bands",
                "rsi",
            ]
        );
    }

    #[test]
    fn disabled_indicators_are_skipped() {
        let cfg = MetricsConfig {
            enable_engulfing: false,
            enable_marubozo: false,
            enable_macd: false,
            ewma_spans: Vec::new(),
            ..MetricsConfig::default()
        };
        let names: Vec<String> = cfg.indicators().iter().map(|i| i.name()).collect();
        assert_eq!(names, ["doji", "hammer", "inverted_hammer", "bollinger_bands", "rsi"]);
    }

    #[test]
    fn validate_rejects_zero_ewma_span() {
        let cfg = MetricsConfig {
            ewma_spans: vec![5, 0],
            ..MetricsConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_ignores_disabled_blocks() {
        let cfg = MetricsConfig {
            enable_rsi: false,
            rsi: RsiParams::new(0),
            ..MetricsConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn save_then_load() {
        let path = temp_path("roundtrip");
        let cfg = MetricsConfig {
            ewma_spans: vec![50],
            forecast_span: Some(3),
            ..MetricsConfig::default()
        };
        cfg.save(&path).unwrap();
        let loaded = MetricsConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn load_reports_invalid_parameters() {
        let path = temp_path("invalid");
        std::fs::write(&path, r#"{ "bollinger": { "period": 0 } }"#).unwrap();
        let err = MetricsConfig::load(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(format!("{err:#}").contains("bollinger.period"));
    }

    #[test]
    fn load_or_default_falls_back_only_when_missing() {
        let missing = temp_path("missing");
        assert_eq!(
            MetricsConfig::load_or_default(&missing).unwrap(),
            MetricsConfig::default()
        );

        let broken = temp_path("broken");
        std::fs::write(&broken, "{ not json").unwrap();
        let result = MetricsConfig::load_or_default(&broken);
        std::fs::remove_file(&broken).ok();
        assert!(result.is_err());
    }

    #[test]
    fn load_or_default_reports_unreadable_paths() {
        // A regular file used as a directory: the config path does not
        // "exist", but the read fails with something other than not-found.
        let blocker = temp_path("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let nested = blocker.join("metrics.json");
        let result = MetricsConfig::load_or_default(&nested);
        std::fs::remove_file(&blocker).ok();
        assert!(result.is_err());
    }
}
