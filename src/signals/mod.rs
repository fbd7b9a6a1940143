// =============================================================================
// Signals Module
// =============================================================================
//
// Turns an `IndicatorSet` into a verdict:
// - Per-indicator categorical classification (plus the ADX trend tag)
// - Equal-weight composite score and recommendation

pub mod classifier;
pub mod composite;

pub use classifier::{classify, trend_tag, Signal, SignalSource};
pub use composite::{score_signals, CompositeScore};
