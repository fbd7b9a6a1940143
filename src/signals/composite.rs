// =============================================================================
// Composite Scorer — equal-weight signal fusion on a 0..100 scale
// =============================================================================
//
//   raw       = sum of signal levels over the k present signals
//   composite = 100 * (raw + 2k) / (4k)         (k = 0 => 50)
//
// Each signal contributes -2..=2, so raw lies in [-2k, 2k] and the composite
// in [0, 100].  The recommendation is a band lookup on the composite.
// =============================================================================

use serde::{Deserialize, Serialize};

use super::classifier::Signal;
use crate::types::{Recommendation, SignalStrength};

/// Distance from 50 beyond which the verdict counts as strong.
pub const STRONG_DEVIATION: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeScore {
    pub score: f64,
    pub raw: i32,
    pub signal_count: usize,
    pub recommendation: Recommendation,
    pub strength: SignalStrength,
    pub buy_signals: usize,
    pub sell_signals: usize,
    pub neutral_signals: usize,
}

/// Fuse `signals` into a composite score.
pub fn score_signals(signals: &[Signal]) -> CompositeScore {
    let k = signals.len();
    let raw: i32 = signals.iter().map(|s| i32::from(s.level)).sum();

    let score = if k == 0 {
        50.0
    } else {
        let k = k as f64;
        100.0 * (f64::from(raw) + 2.0 * k) / (4.0 * k)
    };

    let strength = if (score - 50.0).abs() > STRONG_DEVIATION {
        SignalStrength::Strong
    } else {
        SignalStrength::Weak
    };

    CompositeScore {
        score,
        raw,
        signal_count: k,
        recommendation: Recommendation::from_score(score),
        strength,
        buy_signals: signals.iter().filter(|s| s.level > 0).count(),
        sell_signals: signals.iter().filter(|s| s.level < 0).count(),
        neutral_signals: signals.iter().filter(|s| s.level == 0).count(),
    }
}
