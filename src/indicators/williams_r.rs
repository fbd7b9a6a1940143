// =============================================================================
// Williams %R
// =============================================================================
//
//   %R = -100 * (highest_high_n - close) / (highest_high_n - lowest_low_n)
//
// Ranges from -100 (close at the low) to 0 (close at the high).

use super::backend::IndicatorBackend;

pub const WILLIAMS_PERIOD: usize = 14;

/// Latest Williams %R value; `None` on short history or a zero-range window.
pub fn calculate_williams_r(
    backend: &dyn IndicatorBackend,
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    period: usize,
) -> Option<f64> {
    if period == 0 || closes.len() < period {
        return None;
    }

    let hh = *backend.rolling_max(highs, period).last()?;
    let ll = *backend.rolling_min(lows, period).last()?;
    let close = *closes.last()?;

    let range = hh - ll;
    if range == 0.0 {
        return None;
    }
    Some(-100.0 * (hh - close) / range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::backend::{backend_for, BackendKind};

    #[test]
    fn williams_bounds() {
        let b = backend_for(BackendKind::Reference);
        let highs: Vec<f64> = (0..14).map(|i| 11.0 + i as f64).collect();
        let lows: Vec<f64> = (0..14).map(|i| 9.0 + i as f64).collect();

        let mut closes: Vec<f64> = (0..14).map(|i| 10.0 + i as f64).collect();
        *closes.last_mut().unwrap() = 24.0; // at the highest high
        assert!(calculate_williams_r(b, &highs, &lows, &closes, 14).unwrap().abs() < 1e-10);

        *closes.last_mut().unwrap() = 9.0; // at the lowest low
        let v = calculate_williams_r(b, &highs, &lows, &closes, 14).unwrap();
        assert!((v + 100.0).abs() < 1e-10);
    }

    #[test]
    fn williams_unavailable_cases() {
        let b = backend_for(BackendKind::Reference);
        let flat = vec![5.0; 20];
        assert!(calculate_williams_r(b, &flat, &flat, &flat, 14).is_none());
        assert!(calculate_williams_r(b, &flat[..5], &flat[..5], &flat[..5], 14).is_none());
    }
}
