// =============================================================================
// Error taxonomy
// =============================================================================
//
// Structural problems with the input table or the indicator parameters fail
// the whole call.  Rows that simply lack enough history are never errors: they
// surface as `None` cells in the output columns.

use thiserror::Error;

/// Errors raised while ingesting a price table or computing an indicator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricsError {
    /// A column required by the indicator is absent from the table.
    #[error("{column} not present in data")]
    MissingColumn { column: &'static str },

    /// A present column does not have one cell per row.
    #[error("column {column} has {found} rows, expected {expected}")]
    RaggedColumn {
        column: &'static str,
        expected: usize,
        found: usize,
    },

    /// A `Datetime` cell could not be parsed.
    #[error("row {row}: unrecognised Datetime value {value:?}")]
    InvalidTimestamp {
        row: usize,
        value: String,
    },

    /// The raw table could not be decoded at all.
    #[error("malformed price table: {0}")]
    MalformedTable(String),

    /// An indicator parameter is outside its valid domain.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: String,
    },

    /// Two indicators in one pipeline produced the same column name.
    #[error("duplicate column {0} in feature frame")]
    DuplicateColumn(String),
}

pub type Result<T> = std::result::Result<T, MetricsError>;

/// Reject spans / periods / windows of zero.
pub(crate) fn ensure_positive(name: &'static str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(MetricsError::InvalidParameter {
            name,
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(())
}

/// Reject negative, NaN or infinite ratios.
pub(crate) fn ensure_non_negative(name: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(MetricsError::InvalidParameter {
            name,
            reason: format!("must be finite and non-negative, got {value}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_message_names_the_column() {
        let err = MetricsError::MissingColumn { column: "Open" };
        assert_eq!(err.to_string(), "Open not present in data");
    }

    #[test]
    fn zero_span_is_rejected() {
        let err = ensure_positive("span", 0).unwrap_err();
        assert!(matches!(err, MetricsError::InvalidParameter { name: "span", .. }));
        assert!(ensure_positive("span", 1).is_ok());
    }

    #[test]
    fn non_finite_ratio_is_rejected() {
        assert!(ensure_non_negative("epsilon", f64::NAN).is_err());
        assert!(ensure_non_negative("epsilon", -0.1).is_err());
        assert!(ensure_non_negative("epsilon", 0.0).is_ok());
    }
}
