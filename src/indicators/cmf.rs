// =============================================================================
// Chaikin Money Flow (CMF)
// =============================================================================
//
//   MFM = ((close - low) - (high - close)) / (high - low)
//   CMF = sum(MFM * volume) / sum(volume)        over the last n bars
//
// Bars with high == low carry no money-flow information and are left out of
// both sums.  If no volume remains the value is unavailable.

use super::backend::IndicatorBackend;
use crate::market_data::Bar;

pub const CMF_PERIOD: usize = 20;

/// Latest CMF value in [-1, 1].
pub fn calculate_cmf(backend: &dyn IndicatorBackend, bars: &[Bar], period: usize) -> Option<f64> {
    if period == 0 || bars.len() < period {
        return None;
    }

    let (flows, volumes): (Vec<f64>, Vec<f64>) = bars
        .iter()
        .map(|b| {
            let range = b.high - b.low;
            if range == 0.0 {
                (0.0, 0.0)
            } else {
                let mfm = ((b.close - b.low) - (b.high - b.close)) / range;
                (mfm * b.volume, b.volume)
            }
        })
        .unzip();

    // Checked on the raw window: a running sum need not return to exactly 0.
    if volumes[volumes.len() - period..].iter().all(|&v| v == 0.0) {
        return None;
    }
    let mean_flow = *backend.rolling_mean(&flows, period).last()?;
    let mean_volume = *backend.rolling_mean(&volumes, period).last()?;

    let cmf = mean_flow / mean_volume;
    cmf.is_finite().then_some(cmf)
}
