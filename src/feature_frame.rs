// =============================================================================
// Feature Frame — one table of every configured indicator column
// =============================================================================
//
// Runs the indicator pipeline described by a `MetricsConfig` over a single
// price series and collects the named output columns in pipeline order.
// Every indicator column is row-aligned with the input.  The optional
// forecast labels are kept apart because they are `span` rows shorter.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::MetricsConfig;
use crate::error::{MetricsError, Result};
use crate::forecast::{precise_forecast, Forecast};
use crate::indicators::Indicator;
use crate::price_series::PriceSeries;
use crate::types::{Column, NamedColumn};

/// Derived columns for one price series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureFrame {
    pub rows: usize,
    pub columns: Vec<NamedColumn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Forecast>,
}

impl FeatureFrame {
    /// Compute every indicator enabled in `config`.
    ///
    /// Fails on the first structural error (missing column, invalid
    /// parameter); no partially built frame is returned.
    pub fn build(series: &PriceSeries, config: &MetricsConfig) -> Result<Self> {
        config.validate()?;
        let mut frame = Self::from_indicators(series, &config.indicators())?;

        if let Some(span) = config.forecast_span {
            frame.labels = Some(precise_forecast(series, span)?);
        }

        info!(
            rows = frame.rows,
            columns = frame.columns.len(),
            labels = frame.labels.as_ref().map_or(0, Forecast::len),
            "feature frame built"
        );

        Ok(frame)
    }

    /// Run an explicit indicator pipeline, without forecast labels.
    pub fn from_indicators(series: &PriceSeries, pipeline: &[Box<dyn Indicator>]) -> Result<Self> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut columns = Vec::new();

        for indicator in pipeline {
            let produced = indicator.compute(series)?;
            debug!(
                indicator = %indicator.name(),
                columns = produced.len(),
                rows = series.len(),
                "indicator computed"
            );

            for column in produced {
                debug_assert_eq!(column.values.len(), series.len());
                if !seen.insert(column.name.clone()) {
                    return Err(MetricsError::DuplicateColumn(column.name));
                }
                columns.push(column);
            }
        }

        Ok(Self {
            rows: series.len(),
            columns,
            labels: None,
        })
    }

    /// Look a column up by its published name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name).map(|c| &c.values)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
