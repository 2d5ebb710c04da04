// =============================================================================
// Shared output types used across the indicator library
// =============================================================================

use serde::{Deserialize, Serialize};

/// Categorical classification of one or two consecutive candles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandlePattern {
    Bullish,
    Bearish,
    /// Neither pattern matched. Serialised as `"none"`.
    #[serde(rename = "none")]
    Neutral,
}

impl Default for CandlePattern {
    fn default() -> Self {
        Self::Neutral
    }
}

impl std::fmt::Display for CandlePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bullish => write!(f, "bullish"),
            Self::Bearish => write!(f, "bearish"),
            Self::Neutral => write!(f, "none"),
        }
    }
}

/// One output column, row-aligned to the input series.  `None` cells mark
/// rows the indicator cannot compute.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Column {
    Numeric(Vec<Option<f64>>),
    /// 1 when the pattern is present, 0 when it is not.
    Flag(Vec<Option<u8>>),
    Pattern(Vec<Option<CandlePattern>>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(v) => v.len(),
            Self::Flag(v) => v.len(),
            Self::Pattern(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of rows holding a value.
    pub fn available(&self) -> usize {
        match self {
            Self::Numeric(v) => v.iter().filter(|c| c.is_some()).count(),
            Self::Flag(v) => v.iter().filter(|c| c.is_some()).count(),
            Self::Pattern(v) => v.iter().filter(|c| c.is_some()).count(),
        }
    }

    pub fn as_numeric(&self) -> Option<&[Option<f64>]> {
        match self {
            Self::Numeric(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<&[Option<u8>]> {
        match self {
            Self::Flag(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_pattern(&self) -> Option<&[Option<CandlePattern>]> {
        match self {
            Self::Pattern(v) => Some(v),
            _ => None,
        }
    }
}

/// A column together with the name it is published under.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedColumn {
    pub name: String,
    pub values: Column,
}

impl NamedColumn {
    pub fn new(name: impl Into<String>, values: Column) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}
