// =============================================================================
// Average True Range (ATR) — Wilder's Smoothing Method
// =============================================================================
//
// ATR measures market volatility by decomposing the entire range of a bar.
//
// True Range (TR) for each bar:
//   TR = max(H - L, |H - prevClose|, |L - prevClose|)
//
// ATR is then the smoothed average of TR using Wilder's method:
//   ATR_0   = SMA of first `period` TR values
//   ATR_t   = (ATR_{t-1} * (period - 1) + TR_t) / period
//
// Default period: 14
// =============================================================================

use crate::market_data::Bar;

pub const ATR_PERIOD: usize = 14;

/// Compute the most recent ATR value from a slice of bars using Wilder's
/// smoothing method.
///
/// # Returns
/// `None` when:
/// - `period` is zero.
/// - There are fewer than `period + 1` bars (each TR needs a previous close).
/// - Any intermediate value is non-finite.
pub fn calculate_atr(bars: &[Bar], period: usize) -> Option<f64> {
    if period == 0 || bars.len() < period + 1 {
        return None;
    }

    let tr_values: Vec<f64> = bars
        .windows(2)
        .map(|w| w[1].true_range(w[0].close))
        .collect();

    // --- Seed ATR with SMA of first `period` TR values -----------------------
    let seed: f64 = tr_values[..period].iter().sum::<f64>() / period as f64;
    if !seed.is_finite() {
        return None;
    }

    // --- Wilder's smoothing for remaining TR values --------------------------
    let period_f = period as f64;
    tr_values[period..].iter().try_fold(seed, |atr, &tr| {
        let next = (atr * (period_f - 1.0) + tr) / period_f;
        next.is_finite().then_some(next)
    })
}

/// ATR as a percentage of `close`, `None` when the close is zero.
///
/// Useful for comparing volatility across stocks with different price scales.
pub fn atr_pct(atr: f64, close: f64) -> Option<f64> {
    if close == 0.0 {
        return None;
    }
    let pct = atr / close * 100.0;
    pct.is_finite().then_some(pct)
}
