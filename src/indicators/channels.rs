// =============================================================================
// Price Channels — Keltner and Donchian
// =============================================================================
//
// Keltner(20, 2):  middle = EMA20(close), upper/lower = middle ± 2 * ATR20
// Donchian(20):    upper = highest high, lower = lowest low, middle = midpoint
//
// Both are reported for context; neither feeds the composite score.
// =============================================================================

use serde::{Deserialize, Serialize};

use super::atr::calculate_atr;
use super::backend::IndicatorBackend;
use super::ema::current_ema;
use crate::market_data::Bar;

pub const CHANNEL_PERIOD: usize = 20;
pub const KELTNER_MULTIPLIER: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Keltner channel around the EMA of closes, `None` until both the EMA and
/// the ATR have enough history.
pub fn calculate_keltner(
    bars: &[Bar],
    closes: &[f64],
    period: usize,
    multiplier: f64,
) -> Option<Channel> {
    let middle = current_ema(closes, period)?;
    let atr = calculate_atr(bars, period)?;
    Some(Channel {
        upper: middle + multiplier * atr,
        middle,
        lower: middle - multiplier * atr,
    })
}

/// Donchian channel over the last `period` highs and lows.
pub fn calculate_donchian(
    backend: &dyn IndicatorBackend,
    highs: &[f64],
    lows: &[f64],
    period: usize,
) -> Option<Channel> {
    if period == 0 || highs.len() < period || highs.len() != lows.len() {
        return None;
    }

    let upper = *backend.rolling_max(highs, period).last()?;
    let lower = *backend.rolling_min(lows, period).last()?;
    Some(Channel {
        upper,
        middle: (upper + lower) / 2.0,
        lower,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::backend::{backend_for, BackendKind};
    use crate::market_data::bar::fixtures::{bar, flat};
    use crate::market_data::Columns;

    #[test]
    fn keltner_brackets_ema() {
        let bars: Vec<Bar> = (0..40)
            .map(|i| {
                let base = 100.0 + (i as f64 * 0.4).sin() * 3.0;
                bar(i, base, base + 2.0, base - 2.0, base, 1.0)
            })
            .collect();
        let cols = Columns::from_bars(&bars);
        let k = calculate_keltner(&bars, &cols.close, 20, 2.0).unwrap();
        assert!(k.lower < k.middle && k.middle < k.upper);
    }

    #[test]
    fn keltner_needs_atr_history() {
        let bars = flat(20, 10.0);
        let cols = Columns::from_bars(&bars);
        // EMA20 exists with 20 bars but ATR20 needs 21.
        assert!(calculate_keltner(&bars, &cols.close, 20, 2.0).is_none());
    }

    #[test]
    fn donchian_tracks_extremes() {
        let b = backend_for(BackendKind::Reference);
        let highs: Vec<f64> = (0..25).map(|i| 10.0 + i as f64).collect();
        let lows: Vec<f64> = (0..25).map(|i| 5.0 + i as f64).collect();
        let d = calculate_donchian(b, &highs, &lows, 20).unwrap();
        assert_eq!(d.upper, 34.0);
        assert_eq!(d.lower, 10.0);
        assert_eq!(d.middle, 22.0);
    }
}
