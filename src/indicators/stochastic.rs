// =============================================================================
// Stochastic Oscillator (%K / %D)
// =============================================================================
//
//   %K = 100 * (close - lowest_low_n) / (highest_high_n - lowest_low_n)
//   %D = SMA_m(%K)
//
// A window whose highest high equals its lowest low has no defined %K; if any
// of the `m` windows feeding %D is degenerate the whole reading is unavailable.
// =============================================================================

use serde::{Deserialize, Serialize};

use super::backend::IndicatorBackend;

pub const STOCH_K_PERIOD: usize = 14;
pub const STOCH_D_PERIOD: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochasticResult {
    pub k: f64,
    pub d: f64,
}

/// Compute the fast %K series, aligned to closes starting at `period - 1`.
///
/// Degenerate windows yield `None` in place.
pub fn calculate_percent_k(
    backend: &dyn IndicatorBackend,
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    period: usize,
) -> Vec<Option<f64>> {
    let highest = backend.rolling_max(highs, period);
    let lowest = backend.rolling_min(lows, period);
    if highest.is_empty() || highest.len() != lowest.len() {
        return Vec::new();
    }

    highest
        .iter()
        .zip(&lowest)
        .zip(&closes[period - 1..])
        .map(|((&hh, &ll), &close)| {
            let range = hh - ll;
            (range > 0.0).then(|| 100.0 * (close - ll) / range)
        })
        .collect()
}

/// Latest %K and %D readings.
pub fn calculate_stochastic(
    backend: &dyn IndicatorBackend,
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    k_period: usize,
    d_period: usize,
) -> Option<StochasticResult> {
    if k_period == 0 || d_period == 0 || closes.len() < k_period + d_period - 1 {
        return None;
    }

    let k_series = calculate_percent_k(backend, highs, lows, closes, k_period);

    // %D runs over the trailing stretch of defined %K values.
    let defined_from = k_series
        .iter()
        .rposition(Option::is_none)
        .map_or(0, |i| i + 1);
    let recent: Vec<f64> = k_series[defined_from..].iter().flatten().copied().collect();
    let k = *recent.last()?;
    let d = *backend.rolling_mean(&recent, d_period).last()?;

    Some(StochasticResult { k, d })
}
