// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the daily-bar indicators used by
// the verdict engine.  Every public function returns `Option<T>` (or an empty
// series) so callers are forced to handle insufficient-data and
// numerical-edge-case scenarios.  Rolling-window kernels are pluggable through
// `backend::IndicatorBackend`.

pub mod backend;

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod cci;
pub mod channels;
pub mod cmf;
pub mod ema;
pub mod macd;
pub mod obv;
pub mod parabolic_sar;
pub mod range_52w;
pub mod rsi;
pub mod sma;
pub mod stochastic;
pub mod vwap;
pub mod williams_r;

pub mod set;

pub use backend::{backend_for, BackendKind, IndicatorBackend};
pub use set::{compute_indicators, IndicatorName, IndicatorSet};
