// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
//   alpha = 2 / (period + 1)
//   EMA_t = EMA_{t-1} + alpha * (close_t - EMA_{t-1})
//
// Seeded with the SMA of the first `period` closes, so the series starts at
// index `period - 1`.
// =============================================================================

/// Periods reported in the indicator set.
pub const EMA_PERIODS: [usize; 2] = [12, 26];

/// EMA series aligned to closes from index `period - 1`.
///
/// Empty when `period` is 0, the input is shorter than `period`, or the seed
/// is not finite.  A non-finite step ends the series.
pub fn calculate_ema(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() < period {
        return Vec::new();
    }

    let seed = closes[..period].iter().sum::<f64>() / period as f64;
    if !seed.is_finite() {
        return Vec::new();
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let steps = closes[period..].iter().scan(seed, |ema, &close| {
        *ema += alpha * (close - *ema);
        ema.is_finite().then_some(*ema)
    });

    std::iter::once(seed).chain(steps).collect()
}

/// Latest EMA reading.
pub fn current_ema(closes: &[f64], period: usize) -> Option<f64> {
    calculate_ema(closes, period).last().copied()
}
