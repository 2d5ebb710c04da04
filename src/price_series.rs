// =============================================================================
// PriceSeries — validated, column-wise OHLCV table
// =============================================================================
//
// Column lookup by name happens exactly once, here at ingestion.  Indicators
// only ever see typed accessors that either hand back a full, row-aligned
// column or fail with `MissingColumn`.
//
// Cells are `Option<_>`: a missing value in an otherwise present column is
// `None` and makes every indicator that touches it undefined for that row.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{MetricsError, Result};

/// Timestamp type carried by the `Datetime` column.
pub type Timestamp = DateTime<FixedOffset>;

/// Datetime layouts accepted for string cells, tried in order.  The first is
/// what the yfinance-based price collector writes (`2024-01-02 09:15:00+05:30`).
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M:%S%z"];

// ---------------------------------------------------------------------------
// Field names
// ---------------------------------------------------------------------------

/// The named columns callers must supply.  Names are part of the table
/// contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Datetime,
    Open,
    High,
    Low,
    Close,
    Volume,
    Dividends,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Datetime,
        Field::Open,
        Field::High,
        Field::Low,
        Field::Close,
        Field::Volume,
        Field::Dividends,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Datetime => "Datetime",
            Self::Open => "Open",
            Self::High => "High",
            Self::Low => "Low",
            Self::Close => "Close",
            Self::Volume => "Volume",
            Self::Dividends => "Dividends",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// PriceBar
// ---------------------------------------------------------------------------

/// One fully populated row of the price table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    #[serde(rename = "Datetime")]
    pub timestamp: Timestamp,
    #[serde(rename = "Open")]
    pub open: f64,
    #[serde(rename = "High")]
    pub high: f64,
    #[serde(rename = "Low")]
    pub low: f64,
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "Volume")]
    pub volume: f64,
    #[serde(rename = "Dividends", default)]
    pub dividends: f64,
}

// ---------------------------------------------------------------------------
// PriceSeries
// ---------------------------------------------------------------------------

/// An ordered (chronological) price table indexed `0..len`.
///
/// Every present column has exactly `len` cells.  Timestamps are not checked
/// for uniqueness or monotonicity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    len: usize,
    timestamp: Option<Vec<Option<Timestamp>>>,
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<f64>>>,
    dividends: Option<Vec<Option<f64>>>,
}

impl PriceSeries {
    pub fn builder() -> PriceSeriesBuilder {
        PriceSeriesBuilder::default()
    }

    /// Build a table with every column present and no missing cells.
    pub fn from_bars(bars: &[PriceBar]) -> Self {
        Self {
            len: bars.len(),
            timestamp: Some(bars.iter().map(|b| Some(b.timestamp)).collect()),
            open: Some(bar_column(bars, |b| b.open)),
            high: Some(bar_column(bars, |b| b.high)),
            low: Some(bar_column(bars, |b| b.low)),
            close: Some(bar_column(bars, |b| b.close)),
            volume: Some(bar_column(bars, |b| b.volume)),
            dividends: Some(bar_column(bars, |b| b.dividends)),
        }
    }

    /// Build a close-only table, enough for the moving-average family.
    pub fn from_closes(closes: &[f64]) -> Self {
        Self {
            len: closes.len(),
            close: Some(closes.iter().copied().map(Some).collect()),
            ..Self::default()
        }
    }

    /// Decode an array of row objects keyed by the contract column names.
    ///
    /// A column is present when at least one row carries its key; rows that
    /// omit the key or hold `null` get a missing cell.  Numeric cells may be
    /// JSON numbers or numeric strings.  `Datetime` cells may be strings in
    /// one of the accepted layouts or epoch milliseconds.
    pub fn from_json_records(text: &str) -> Result<Self> {
        let rows: Vec<Map<String, Value>> = serde_json::from_str(text)
            .map_err(|e| MetricsError::MalformedTable(e.to_string()))?;

        let present = |field: Field| rows.iter().any(|r| r.contains_key(field.name()));

        let numeric = |field: Field| -> Result<Option<Vec<Option<f64>>>> {
            if !present(field) {
                return Ok(None);
            }
            rows.iter()
                .enumerate()
                .map(|(row, r)| parse_numeric_cell(r.get(field.name()), field, row))
                .collect::<Result<Vec<_>>>()
                .map(Some)
        };

        let timestamp = if present(Field::Datetime) {
            let cells = rows
                .iter()
                .enumerate()
                .map(|(row, r)| parse_timestamp_cell(r.get(Field::Datetime.name()), row))
                .collect::<Result<Vec<_>>>()?;
            Some(cells)
        } else {
            None
        };

        let series = Self {
            len: rows.len(),
            timestamp,
            open: numeric(Field::Open)?,
            high: numeric(Field::High)?,
            low: numeric(Field::Low)?,
            close: numeric(Field::Close)?,
            volume: numeric(Field::Volume)?,
            dividends: numeric(Field::Dividends)?,
        };

        debug!(
            rows = series.len,
            columns = ?series.present_fields(),
            "price table ingested"
        );

        Ok(series)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the named column was supplied.
    pub fn has(&self, field: Field) -> bool {
        match field {
            Field::Datetime => self.timestamp.is_some(),
            Field::Open => self.open.is_some(),
            Field::High => self.high.is_some(),
            Field::Low => self.low.is_some(),
            Field::Close => self.close.is_some(),
            Field::Volume => self.volume.is_some(),
            Field::Dividends => self.dividends.is_some(),
        }
    }

    pub fn present_fields(&self) -> Vec<Field> {
        Field::ALL.into_iter().filter(|f| self.has(*f)).collect()
    }

    // --- Typed accessors -----------------------------------------------------

    pub fn open(&self) -> Result<&[Option<f64>]> {
        require(&self.open, Field::Open)
    }

    pub fn high(&self) -> Result<&[Option<f64>]> {
        require(&self.high, Field::High)
    }

    pub fn low(&self) -> Result<&[Option<f64>]> {
        require(&self.low, Field::Low)
    }

    pub fn close(&self) -> Result<&[Option<f64>]> {
        require(&self.close, Field::Close)
    }

    pub fn volume(&self) -> Result<&[Option<f64>]> {
        require(&self.volume, Field::Volume)
    }

    pub fn dividends(&self) -> Result<&[Option<f64>]> {
        require(&self.dividends, Field::Dividends)
    }

    pub fn timestamp(&self) -> Result<&[Option<Timestamp>]> {
        require(&self.timestamp, Field::Datetime)
    }
}

fn bar_column(bars: &[PriceBar], pick: impl Fn(&PriceBar) -> f64) -> Vec<Option<f64>> {
    bars.iter().map(|b| Some(pick(b))).collect()
}

fn require<T>(column: &Option<Vec<T>>, field: Field) -> Result<&[T]> {
    column.as_deref().ok_or(MetricsError::MissingColumn {
        column: field.name(),
    })
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Column-at-a-time constructor.  [`build`](PriceSeriesBuilder::build)
/// checks that every supplied column has the same length.
#[derive(Debug, Clone, Default)]
pub struct PriceSeriesBuilder {
    timestamp: Option<Vec<Option<Timestamp>>>,
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<f64>>>,
    dividends: Option<Vec<Option<f64>>>,
}

impl PriceSeriesBuilder {
    pub fn timestamp(mut self, cells: Vec<Option<Timestamp>>) -> Self {
        self.timestamp = Some(cells);
        self
    }

    pub fn open(mut self, cells: Vec<Option<f64>>) -> Self {
        self.open = Some(cells);
        self
    }

    pub fn high(mut self, cells: Vec<Option<f64>>) -> Self {
        self.high = Some(cells);
        self
    }

    pub fn low(mut self, cells: Vec<Option<f64>>) -> Self {
        self.low = Some(cells);
        self
    }

    pub fn close(mut self, cells: Vec<Option<f64>>) -> Self {
        self.close = Some(cells);
        self
    }

    pub fn volume(mut self, cells: Vec<Option<f64>>) -> Self {
        self.volume = Some(cells);
        self
    }

    pub fn dividends(mut self, cells: Vec<Option<f64>>) -> Self {
        self.dividends = Some(cells);
        self
    }

    pub fn build(self) -> Result<PriceSeries> {
        let lengths = [
            (Field::Datetime, self.timestamp.as_ref().map(Vec::len)),
            (Field::Open, self.open.as_ref().map(Vec::len)),
            (Field::High, self.high.as_ref().map(Vec::len)),
            (Field::Low, self.low.as_ref().map(Vec::len)),
            (Field::Close, self.close.as_ref().map(Vec::len)),
            (Field::Volume, self.volume.as_ref().map(Vec::len)),
            (Field::Dividends, self.dividends.as_ref().map(Vec::len)),
        ];

        let mut expected: Option<usize> = None;
        for (field, len) in lengths {
            let Some(found) = len else { continue };
            match expected {
                None => expected = Some(found),
                Some(expected) if expected != found => {
                    return Err(MetricsError::RaggedColumn {
                        column: field.name(),
                        expected,
                        found,
                    });
                }
                Some(_) => {}
            }
        }

        Ok(PriceSeries {
            len: expected.unwrap_or(0),
            timestamp: self.timestamp,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
            dividends: self.dividends,
        })
    }
}

// ---------------------------------------------------------------------------
// Cell parsing
// ---------------------------------------------------------------------------

/// Numeric cells may arrive as JSON numbers or as numeric strings.
fn parse_numeric_cell(val: Option<&Value>, field: Field, row: usize) -> Result<Option<f64>> {
    match val {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s.trim().parse::<f64>().map(Some).map_err(|_| {
            MetricsError::MalformedTable(format!("row {row}: {field} value {s:?} is not a number"))
        }),
        Some(other) => Err(MetricsError::MalformedTable(format!(
            "row {row}: {field} has unexpected JSON value {other}"
        ))),
    }
}

fn parse_timestamp_cell(val: Option<&Value>, row: usize) -> Result<Option<Timestamp>> {
    match val {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => parse_timestamp(s)
            .map(Some)
            .ok_or_else(|| MetricsError::InvalidTimestamp {
                row,
                value: s.clone(),
            }),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .map(|dt| Some(dt.into()))
            .ok_or_else(|| MetricsError::InvalidTimestamp {
                row,
                value: n.to_string(),
            }),
        Some(other) => Err(MetricsError::InvalidTimestamp {
            row,
            value: other.to_string(),
        }),
    }
}

/// Parse a `Datetime` string in any accepted layout.
pub fn parse_timestamp(text: &str) -> Option<Timestamp> {
    let text = text.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(text, fmt).ok())
        .or_else(|| DateTime::parse_from_rfc3339(text).ok())
}
