// =============================================================================
// Verdict Engine — technical-analysis verdicts for daily OHLCV series
// =============================================================================
//
// Numeric core (pure, synchronous, no I/O):
//   validation -> indicators -> signals -> risk -> analysis
//
// Service layer (I/O, logging, concurrency):
//   market_data::loader, runtime_config, app_state, batch, api
// =============================================================================

pub mod analysis;
pub mod api;
pub mod app_state;
pub mod batch;
pub mod indicators;
pub mod market_data;
pub mod risk;
pub mod runtime_config;
pub mod signals;
pub mod types;
pub mod validation;

pub use analysis::{AnalysisOrchestrator, AnalysisResult};
pub use indicators::{BackendKind, IndicatorSet};
pub use market_data::Bar;
pub use validation::ValidationError;
