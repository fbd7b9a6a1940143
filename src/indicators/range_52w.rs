// =============================================================================
// 52-Week High / Low
// =============================================================================
//
// Highest high and lowest low over the trailing min(252, len) bars, and the
// latest close as a percentage of each:
//
//   high_ratio = close / high_52w * 100
//   low_ratio  = close / low_52w  * 100
//
// Shorter histories fall back to the full available range.

use serde::{Deserialize, Serialize};

use super::backend::IndicatorBackend;

/// Trading days in a year.
pub const TRADING_DAYS_52W: usize = 252;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range52w {
    pub high: f64,
    pub low: f64,
    /// Close as a percentage of the 52-week high.
    pub high_ratio: f64,
    /// Close as a percentage of the 52-week low.
    pub low_ratio: f64,
}

pub fn calculate_52w_range(
    backend: &dyn IndicatorBackend,
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
) -> Option<Range52w> {
    if closes.is_empty() || highs.len() != closes.len() || lows.len() != closes.len() {
        return None;
    }

    let window = closes.len().min(TRADING_DAYS_52W);
    let high = *backend.rolling_max(highs, window).last()?;
    let low = *backend.rolling_min(lows, window).last()?;
    let close = *closes.last()?;

    if high <= 0.0 || low <= 0.0 {
        return None;
    }

    Some(Range52w {
        high,
        low,
        high_ratio: close / high * 100.0,
        low_ratio: close / low * 100.0,
    })
}
