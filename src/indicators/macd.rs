// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   MACD      = EMA(fast) - EMA(slow)
//   Signal    = EMA(signal_period) of the MACD line
//   Histogram = MACD - Signal
//
// The MACD line starts once the slow EMA exists (index slow - 1), so the
// signal line needs slow + signal - 1 closes (34 for 12/26/9).
// =============================================================================

use serde::{Deserialize, Serialize};

use super::ema::calculate_ema;

pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;

/// Latest MACD reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdResult {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Compute the MACD line, aligned to closes starting at index `slow - 1`.
pub fn calculate_macd_line(closes: &[f64], fast: usize, slow: usize) -> Vec<f64> {
    if fast == 0 || fast >= slow {
        return Vec::new();
    }

    let fast_ema = calculate_ema(closes, fast);
    let slow_ema = calculate_ema(closes, slow);
    if slow_ema.is_empty() {
        return Vec::new();
    }

    // fast_ema[0] sits at close index fast-1, slow_ema[0] at slow-1.
    let offset = slow - fast;
    slow_ema
        .iter()
        .zip(fast_ema.iter().skip(offset))
        .map(|(s, f)| f - s)
        .collect()
}

/// Compute the latest MACD, signal line and histogram.
///
/// Returns `None` when there is not enough history for the signal line.
pub fn calculate_macd(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> Option<MacdResult> {
    let line = calculate_macd_line(closes, fast, slow);
    let signal_series = calculate_ema(&line, signal_period);

    let macd = *line.last()?;
    let signal = *signal_series.last()?;
    // Both series must end on the same close.
    if signal_series.len() + signal_period - 1 != line.len() {
        return None;
    }

    Some(MacdResult {
        macd,
        signal,
        histogram: macd - signal,
    })
}

/// MACD with the standard 12/26/9 parameters.
pub fn current_macd(closes: &[f64]) -> Option<MacdResult> {
    calculate_macd(closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macd_needs_slow_plus_signal_history() {
        let closes: Vec<f64> = (1..=33).map(|x| x as f64).collect();
        assert!(current_macd(&closes).is_none());

        let closes: Vec<f64> = (1..=34).map(|x| x as f64).collect();
        assert!(current_macd(&closes).is_some());
    }

    #[test]
    fn macd_line_length() {
        let closes: Vec<f64> = (1..=40).map(|x| x as f64).collect();
        assert_eq!(calculate_macd_line(&closes, 12, 26).len(), 15);
    }

    #[test]
    fn macd_flat_series_is_zero() {
        let m = current_macd(&[250.0; 60]).unwrap();
        assert!(m.macd.abs() < 1e-10);
        assert!(m.signal.abs() < 1e-10);
        assert!(m.histogram.abs() < 1e-10);
    }

    #[test]
    fn macd_uptrend_above_signal() {
        // Accelerating growth keeps the fast EMA pulling away from the slow.
        let closes: Vec<f64> = (0..80).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
        let m = current_macd(&closes).unwrap();
        assert!(m.macd > 0.0);
        assert!(m.macd > m.signal, "macd {} signal {}", m.macd, m.signal);
        assert!((m.histogram - (m.macd - m.signal)).abs() < 1e-12);
    }

    #[test]
    fn macd_invalid_periods() {
        let closes = vec![1.0; 100];
        assert!(calculate_macd(&closes, 26, 12, 9).is_none());
        assert!(calculate_macd(&closes, 0, 26, 9).is_none());
    }
}
