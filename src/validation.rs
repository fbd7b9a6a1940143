// =============================================================================
// Series Validation
// =============================================================================
//
// Structural checks run before any indicator is computed. The validator never
// repairs input: clamping high/low or filling gaps belongs to whoever produced
// the bars.
//
// Checks, in order, per bar:
//   1. every field is a finite number           => MissingColumn
//   2. open/high/low/close > 0, volume >= 0     => NonPositivePrice
//   3. low <= open, close <= high               => InvalidHighLowOrder
// The series length is checked first (TooShort).
// =============================================================================

use serde::Serialize;
use thiserror::Error;

use crate::market_data::Bar;

/// Minimum number of bars required for any analysis.
pub const MIN_BARS: usize = 20;

/// Reason a bar series cannot be analysed.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("series too short: required {required} bars, got {actual}")]
    TooShort { required: usize, actual: usize },

    #[error("bar {index}: column `{column}` is missing or not a finite number")]
    MissingColumn { index: usize, column: &'static str },

    #[error("bar {index}: column `{column}` has non-positive value {value}")]
    NonPositivePrice {
        index: usize,
        column: &'static str,
        value: f64,
    },

    #[error("bar {index}: low/high do not bracket open and close")]
    InvalidHighLowOrder { index: usize },
}

impl ValidationError {
    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TooShort { .. } => "too_short",
            Self::MissingColumn { .. } => "missing_column",
            Self::NonPositivePrice { .. } => "non_positive_price",
            Self::InvalidHighLowOrder { .. } => "invalid_high_low_order",
        }
    }
}

/// Validate a bar series for analysis.
pub fn validate_series(bars: &[Bar]) -> Result<(), ValidationError> {
    if bars.len() < MIN_BARS {
        return Err(ValidationError::TooShort {
            required: MIN_BARS,
            actual: bars.len(),
        });
    }

    bars.iter()
        .enumerate()
        .try_for_each(|(index, bar)| validate_bar(index, bar))
}

fn validate_bar(index: usize, bar: &Bar) -> Result<(), ValidationError> {
    let columns = [
        ("open", bar.open),
        ("high", bar.high),
        ("low", bar.low),
        ("close", bar.close),
        ("volume", bar.volume),
    ];

    if let Some(&(column, _)) = columns.iter().find(|(_, v)| !v.is_finite()) {
        return Err(ValidationError::MissingColumn { index, column });
    }

    if let Some(&(column, value)) = columns[..4].iter().find(|(_, v)| *v <= 0.0) {
        return Err(ValidationError::NonPositivePrice {
            index,
            column,
            value,
        });
    }
    if bar.volume < 0.0 {
        return Err(ValidationError::NonPositivePrice {
            index,
            column: "volume",
            value: bar.volume,
        });
    }

    let body_high = bar.open.max(bar.close);
    let body_low = bar.open.min(bar.close);
    if bar.low > body_low || bar.high < body_high {
        return Err(ValidationError::InvalidHighLowOrder { index });
    }

    Ok(())
}
