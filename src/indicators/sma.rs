// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
// SMA_t = (close_{t-n+1} + ... + close_t) / n
//
// The engine tracks the 5/20/60/120/200-day averages.
// =============================================================================

use super::backend::IndicatorBackend;

/// Look-back windows reported in the indicator set.
pub const SMA_PERIODS: [usize; 5] = [5, 20, 60, 120, 200];

/// Compute the SMA series; one value per close starting at index `period - 1`.
///
/// Empty when `period == 0` or `closes.len() < period`.
pub fn calculate_sma(backend: &dyn IndicatorBackend, closes: &[f64], period: usize) -> Vec<f64> {
    backend.rolling_mean(closes, period)
}

/// Most recent SMA value, or `None` with insufficient history.
pub fn current_sma(backend: &dyn IndicatorBackend, closes: &[f64], period: usize) -> Option<f64> {
    calculate_sma(backend, closes, period).last().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::backend::{backend_for, BackendKind};

    fn reference() -> &'static dyn IndicatorBackend {
        backend_for(BackendKind::Reference)
    }

    #[test]
    fn sma_constant_series_equals_constant() {
        let closes = vec![42.5; 250];
        for period in SMA_PERIODS {
            let v = current_sma(reference(), &closes, period).unwrap();
            assert!((v - 42.5).abs() < 1e-12);
        }
    }

    #[test]
    fn sma_known_values() {
        let closes: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        let series = calculate_sma(reference(), &closes, 5);
        assert_eq!(series.len(), 6);
        assert!((series[0] - 3.0).abs() < 1e-12);
        assert!((series[5] - 8.0).abs() < 1e-12);
        assert_eq!(current_sma(reference(), &closes, 5), Some(8.0));
    }

    #[test]
    fn sma_insufficient_data() {
        let closes = vec![1.0; 59];
        assert!(current_sma(reference(), &closes, 60).is_none());
        assert!(current_sma(reference(), &closes, 0).is_none());
    }

    #[test]
    fn backends_slide_over_the_whole_history() {
        let closes: Vec<f64> = (0..300).map(|i| 1_000.0 + (i as f64 * 0.7).sin() * 50.0).collect();
        let accelerated = backend_for(BackendKind::Accelerated);
        for period in SMA_PERIODS {
            let full = calculate_sma(accelerated, &closes, period);
            assert_eq!(full.len(), closes.len() - period + 1);

            let expected = closes[closes.len() - period..].iter().sum::<f64>() / period as f64;
            let got = current_sma(accelerated, &closes, period).unwrap();
            assert!((got - expected).abs() < 1e-9 * expected, "period {period}");
            assert!((current_sma(reference(), &closes, period).unwrap() - expected).abs() < 1e-9);
        }
    }
}
