// =============================================================================
// Commodity Channel Index (CCI)
// =============================================================================
//
//   TP  = (high + low + close) / 3
//   CCI = (TP - SMA_n(TP)) / (0.015 * mean_abs_deviation_n(TP))
//
// Above +100 is conventionally overbought, below -100 oversold.

use super::backend::IndicatorBackend;

pub const CCI_PERIOD: usize = 14;
const CCI_CONSTANT: f64 = 0.015;

/// Latest CCI value; `None` on short history or a zero mean deviation.
pub fn calculate_cci(
    backend: &dyn IndicatorBackend,
    typical: &[f64],
    period: usize,
) -> Option<f64> {
    if period == 0 || typical.len() < period {
        return None;
    }

    let mean = *backend.rolling_mean(typical, period).last()?;
    let window = &typical[typical.len() - period..];
    let mean_dev = window.iter().map(|tp| (tp - mean).abs()).sum::<f64>() / period as f64;

    if mean_dev == 0.0 {
        return None;
    }

    let cci = (window[period - 1] - mean) / (CCI_CONSTANT * mean_dev);
    cci.is_finite().then_some(cci)
}
