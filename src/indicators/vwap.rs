// =============================================================================
// Volume-Weighted Average Price (VWAP) — trailing window
// =============================================================================
//
//   VWAP_n = sum(typical_price * volume) / sum(volume)   over the last n bars
//
// Computed as the ratio of two rolling means so that it runs on the selected
// backend.  A window with zero total volume has no VWAP.

use super::backend::IndicatorBackend;

pub const VWAP_PERIOD: usize = 20;

/// Latest trailing VWAP.
pub fn calculate_vwap(
    backend: &dyn IndicatorBackend,
    typical: &[f64],
    volumes: &[f64],
    period: usize,
) -> Option<f64> {
    if period == 0 || typical.len() < period || typical.len() != volumes.len() {
        return None;
    }

    if volumes[volumes.len() - period..].iter().all(|&v| v == 0.0) {
        return None;
    }

    let weighted: Vec<f64> = typical.iter().zip(volumes).map(|(tp, v)| tp * v).collect();

    let mean_weighted = *backend.rolling_mean(&weighted, period).last()?;
    let mean_volume = *backend.rolling_mean(volumes, period).last()?;

    let vwap = mean_weighted / mean_volume;
    vwap.is_finite().then_some(vwap)
}
