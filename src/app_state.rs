// =============================================================================
// Central Application State — Verdict Engine service
// =============================================================================
//
// Ties the runtime configuration to the latest analysis per stock and a short
// error log.  The numeric core holds no state of its own; everything mutable
// in the service lives here.
//
// Thread safety:
//   - Atomic counter for lock-free version tracking.
//   - parking_lot::RwLock for all mutable shared collections.
// =============================================================================

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::{AnalysisOrchestrator, AnalysisResult};
use crate::market_data::BarLoader;
use crate::runtime_config::RuntimeConfig;

// =============================================================================
// Records
// =============================================================================

/// One stored analysis: the pure result plus when and under which run id it
/// was produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredAnalysis {
    pub run_id: Uuid,
    /// State version at the time of storing; orders entries for eviction.
    pub sequence: u64,
    /// RFC 3339 timestamp.
    pub analyzed_at: String,
    pub result: AnalysisResult,
}

/// A recorded error event.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    pub stock_id: Option<String>,
    pub message: String,
    /// RFC 3339 timestamp.
    pub at: String,
}

// =============================================================================
// AppState
// =============================================================================

/// Maximum number of recent errors to retain.
const MAX_RECENT_ERRORS: usize = 50;

/// Shared across all async tasks via `Arc<AppState>`.
pub struct AppState {
    /// Incremented on every stored result or recorded error.
    pub state_version: AtomicU64,

    pub runtime_config: Arc<RwLock<RuntimeConfig>>,

    /// Latest analysis per stock id, at most `max_stored_results` entries.
    pub results: RwLock<HashMap<String, StoredAnalysis>>,

    pub recent_errors: RwLock<Vec<ErrorRecord>>,

    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            state_version: AtomicU64::new(0),
            runtime_config: Arc::new(RwLock::new(config)),
            results: RwLock::new(HashMap::new()),
            recent_errors: RwLock::new(Vec::new()),
            start_time: std::time::Instant::now(),
        }
    }

    /// Orchestrator configured with the current backend selection.
    pub fn orchestrator(&self) -> AnalysisOrchestrator {
        AnalysisOrchestrator::new(self.runtime_config.read().indicator_backend)
    }

    /// Loader over the configured data directory.
    pub fn loader(&self) -> BarLoader {
        BarLoader::new(self.runtime_config.read().data_dir.clone())
    }

    // ── Version Management ──────────────────────────────────────────────

    pub fn increment_version(&self) -> u64 {
        self.state_version.fetch_add(1, Ordering::SeqCst)
    }

    pub fn current_state_version(&self) -> u64 {
        self.state_version.load(Ordering::SeqCst)
    }

    // ── Result Store ────────────────────────────────────────────────────

    /// Stamp `result` with a run id and the current time, and make it the
    /// latest analysis for its stock.  A new stock arriving at a full store
    /// evicts the least recently stored one.
    pub fn store_result(&self, run_id: Uuid, result: AnalysisResult) -> StoredAnalysis {
        let capacity = self.runtime_config.read().result_capacity();
        let stored = StoredAnalysis {
            run_id,
            sequence: self.increment_version(),
            analyzed_at: Utc::now().to_rfc3339(),
            result,
        };

        let mut results = self.results.write();
        if !results.contains_key(&stored.result.stock_id) {
            while results.len() >= capacity {
                let Some(oldest) = results
                    .values()
                    .min_by_key(|s| s.sequence)
                    .map(|s| s.result.stock_id.clone())
                else {
                    break;
                };
                results.remove(&oldest);
            }
        }
        results.insert(stored.result.stock_id.clone(), stored.clone());
        stored
    }

    pub fn latest(&self, stock_id: &str) -> Option<StoredAnalysis> {
        self.results.read().get(stock_id).cloned()
    }

    /// Every stored analysis, ordered by stock id.
    pub fn all_results(&self) -> Vec<StoredAnalysis> {
        let mut all: Vec<StoredAnalysis> = self.results.read().values().cloned().collect();
        all.sort_by(|a, b| a.result.stock_id.cmp(&b.result.stock_id));
        all
    }

    pub fn results_cached(&self) -> usize {
        self.results.read().len()
    }

    // ── Error Logging ───────────────────────────────────────────────────

    /// Record an error.  The buffer is capped at [`MAX_RECENT_ERRORS`];
    /// oldest entries are evicted first.
    pub fn push_error(&self, stock_id: Option<String>, message: String) {
        let record = ErrorRecord {
            stock_id,
            message,
            at: Utc::now().to_rfc3339(),
        };

        let mut errors = self.recent_errors.write();
        errors.push(record);
        while errors.len() > MAX_RECENT_ERRORS {
            errors.remove(0);
        }
        drop(errors);

        self.increment_version();
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::BackendKind;
    use crate::market_data::bar::fixtures::random_walk;

    fn analysed(stock_id: &str) -> AnalysisResult {
        AnalysisOrchestrator::default()
            .analyze(stock_id, &random_walk(40, 3))
            .unwrap()
    }

    #[test]
    fn store_replaces_previous_result() {
        let state = AppState::new(RuntimeConfig::default());
        let first = state.store_result(Uuid::new_v4(), analysed("005930"));
        let second = state.store_result(Uuid::new_v4(), analysed("005930"));

        assert_eq!(state.results_cached(), 1);
        let latest = state.latest("005930").unwrap();
        assert_eq!(latest.run_id, second.run_id);
        assert_ne!(latest.run_id, first.run_id);
        assert_eq!(state.current_state_version(), 2);
    }

    #[test]
    fn all_results_sorted_by_stock() {
        let state = AppState::new(RuntimeConfig::default());
        state.store_result(Uuid::new_v4(), analysed("B"));
        state.store_result(Uuid::new_v4(), analysed("A"));
        let ids: Vec<String> = state
            .all_results()
            .into_iter()
            .map(|s| s.result.stock_id)
            .collect();
        assert_eq!(ids, vec!["A", "B"]);
        assert!(state.latest("C").is_none());
    }

    #[test]
    fn error_log_is_capped() {
        let state = AppState::new(RuntimeConfig::default());
        for i in 0..(MAX_RECENT_ERRORS + 5) {
            state.push_error(None, format!("err {i}"));
        }
        let errors = state.recent_errors.read();
        assert_eq!(errors.len(), MAX_RECENT_ERRORS);
        assert_eq!(errors[0].message, "err 5");
    }

    #[test]
    fn orchestrator_follows_config() {
        let config = RuntimeConfig {
            indicator_backend: BackendKind::Accelerated,
            ..Default::default()
        };
        let state = AppState::new(config);
        assert_eq!(state.orchestrator().backend(), BackendKind::Accelerated);

        state.runtime_config.write().indicator_backend = BackendKind::Reference;
        assert_eq!(state.orchestrator().backend(), BackendKind::Reference);
    }

    #[test]
    fn result_store_evicts_least_recent_stock() {
        let state = AppState::new(RuntimeConfig {
            max_stored_results: 2,
            ..Default::default()
        });
        state.store_result(Uuid::new_v4(), analysed("A"));
        state.store_result(Uuid::new_v4(), analysed("B"));
        // Refreshing A makes B the oldest.
        state.store_result(Uuid::new_v4(), analysed("A"));
        state.store_result(Uuid::new_v4(), analysed("C"));

        assert_eq!(state.results_cached(), 2);
        assert!(state.latest("A").is_some());
        assert!(state.latest("B").is_none());
        assert!(state.latest("C").is_some());
    }
}
