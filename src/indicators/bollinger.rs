// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ), with σ the population standard deviation of
// the window.  Two derived measures are reported:
//
//   width    = (upper - lower) / middle * 100
//   position = (close - lower) / (upper - lower) * 100     (%B, in percent)
// =============================================================================

use serde::{Deserialize, Serialize};

use super::backend::IndicatorBackend;

pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_STD: f64 = 2.0;

/// Result of a Bollinger Band calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerResult {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    pub width: f64,
}

impl BollingerResult {
    /// Where `close` sits inside the bands, in percent of the band range.
    ///
    /// `None` when the bands have collapsed (upper == lower).
    pub fn position(&self, close: f64) -> Option<f64> {
        let range = self.upper - self.lower;
        if range == 0.0 {
            return None;
        }
        let position = (close - self.lower) / range * 100.0;
        position.is_finite().then_some(position)
    }
}

/// Calculate Bollinger Bands over the last `period` closes.
///
/// Returns `None` when:
/// - Fewer than `period` data points.
/// - Middle band is zero (degenerate input).
pub fn calculate_bollinger(
    backend: &dyn IndicatorBackend,
    closes: &[f64],
    period: usize,
    num_std: f64,
) -> Option<BollingerResult> {
    if period == 0 || closes.len() < period {
        return None;
    }

    let middle = *backend.rolling_mean(closes, period).last()?;
    let window = &closes[closes.len() - period..];

    if middle == 0.0 {
        return None;
    }

    let variance = window.iter().map(|x| (x - middle).powi(2)).sum::<f64>() / period as f64;
    let std_dev = variance.sqrt();

    let upper = middle + num_std * std_dev;
    let lower = middle - num_std * std_dev;
    let width = (upper - lower) / middle * 100.0;

    width.is_finite().then_some(BollingerResult {
        upper,
        middle,
        lower,
        width,
    })
}
