// =============================================================================
// Batch Runner — analyse many stocks concurrently
// =============================================================================
//
// Each stock is loaded and analysed on the blocking pool
// (`spawn_blocking`), with at most `max_concurrent_analyses` in flight at
// once (semaphore permits).  Successes go to the shared result store under a
// single run id; failures are logged, recorded and reported, and never abort
// the rest of the batch.
// =============================================================================

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::AnalysisResult;
use crate::app_state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchFailure {
    pub stock_id: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub run_id: Uuid,
    /// RFC 3339 timestamp.
    pub started_at: String,
    pub requested: usize,
    pub succeeded: Vec<String>,
    pub failed: Vec<BatchFailure>,
    pub elapsed_ms: u64,
}

/// Analyse `symbols`, or the configured symbol list when `None` or empty.
/// An empty configured list means every bar file in the data directory.
pub async fn run_batch(state: Arc<AppState>, symbols: Option<Vec<String>>) -> Result<BatchReport> {
    let started = Instant::now();
    let run_id = Uuid::new_v4();
    let started_at = Utc::now().to_rfc3339();

    let symbols = resolve_symbols(&state, symbols).await?;
    let concurrency = state.runtime_config.read().concurrency();
    let orchestrator = state.orchestrator();
    let loader = Arc::new(state.loader());

    info!(
        %run_id,
        stocks = symbols.len(),
        concurrency,
        backend = %orchestrator.backend(),
        "batch analysis started"
    );

    let semaphore = Arc::new(Semaphore::new(concurrency));
    let mut tasks: JoinSet<(String, Result<AnalysisResult>)> = JoinSet::new();

    for stock_id in &symbols {
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .context("batch semaphore closed")?;
        let loader = Arc::clone(&loader);
        let stock_id = stock_id.clone();

        tasks.spawn(async move {
            let id = stock_id.clone();
            let outcome = tokio::task::spawn_blocking(move || -> Result<AnalysisResult> {
                let bars = loader.load(&id)?;
                let result = orchestrator
                    .analyze(&id, &bars)
                    .with_context(|| format!("analysis of {id} rejected"))?;
                Ok(result)
            })
            .await
            .context("analysis task panicked")
            .and_then(|r| r);
            drop(permit);
            (stock_id, outcome)
        });
    }

    let mut succeeded = Vec::new();
    let mut failed = Vec::new();

    while let Some(joined) = tasks.join_next().await {
        let (stock_id, outcome) = joined.context("batch task failed to join")?;
        match outcome {
            Ok(result) => {
                state.store_result(run_id, result);
                succeeded.push(stock_id);
            }
            Err(e) => {
                let error = format!("{e:#}");
                warn!(%run_id, stock_id = %stock_id, error = %error, "stock analysis failed");
                state.push_error(Some(stock_id.clone()), error.clone());
                failed.push(BatchFailure { stock_id, error });
            }
        }
    }

    succeeded.sort();
    failed.sort_by(|a, b| a.stock_id.cmp(&b.stock_id));

    let report = BatchReport {
        run_id,
        started_at,
        requested: symbols.len(),
        succeeded,
        failed,
        elapsed_ms: started.elapsed().as_millis() as u64,
    };

    info!(
        %run_id,
        succeeded = report.succeeded.len(),
        failed = report.failed.len(),
        elapsed_ms = report.elapsed_ms,
        "batch analysis finished"
    );

    Ok(report)
}

async fn resolve_symbols(state: &AppState, requested: Option<Vec<String>>) -> Result<Vec<String>> {
    if let Some(symbols) = requested.filter(|s| !s.is_empty()) {
        return Ok(symbols);
    }

    let configured = state.runtime_config.read().symbols.clone();
    if !configured.is_empty() {
        return Ok(configured);
    }

    let loader = state.loader();
    tokio::task::spawn_blocking(move || loader.discover())
        .await
        .context("symbol discovery task panicked")?
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::bar::fixtures::random_walk;
    use crate::runtime_config::RuntimeConfig;

    fn write_bars(dir: &std::path::Path, stock_id: &str, n: usize) {
        let bars = random_walk(n, n as u64);
        let json = serde_json::to_string(&bars).unwrap();
        std::fs::write(dir.join(format!("{stock_id}.json")), json).unwrap();
    }

    fn state_for(dir: &std::path::Path, symbols: Vec<String>) -> Arc<AppState> {
        Arc::new(AppState::new(RuntimeConfig {
            data_dir: dir.to_path_buf(),
            symbols,
            max_concurrent_analyses: 2,
            ..Default::default()
        }))
    }

    #[tokio::test]
    async fn failures_do_not_abort_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        write_bars(dir.path(), "AAA", 60);
        write_bars(dir.path(), "BBB", 300);
        write_bars(dir.path(), "SHORT", 10);

        let symbols = vec!["AAA".into(), "BBB".into(), "SHORT".into(), "MISSING".into()];
        let state = state_for(dir.path(), symbols);

        let report = run_batch(state.clone(), None).await.unwrap();
        assert_eq!(report.requested, 4);
        assert_eq!(report.succeeded, vec!["AAA", "BBB"]);

        let failed: Vec<&str> = report.failed.iter().map(|f| f.stock_id.as_str()).collect();
        assert_eq!(failed, vec!["MISSING", "SHORT"]);
        assert!(report.failed[1].error.contains("too short"));

        assert_eq!(state.results_cached(), 2);
        assert_eq!(state.latest("AAA").unwrap().run_id, report.run_id);
        assert_eq!(state.recent_errors.read().len(), 2);
    }

    #[tokio::test]
    async fn explicit_symbols_override_config() {
        let dir = tempfile::tempdir().unwrap();
        write_bars(dir.path(), "AAA", 40);
        write_bars(dir.path(), "BBB", 40);
        let state = state_for(dir.path(), vec!["AAA".into(), "BBB".into()]);

        let report = run_batch(state.clone(), Some(vec!["BBB".into()])).await.unwrap();
        assert_eq!(report.succeeded, vec!["BBB"]);
        assert!(state.latest("AAA").is_none());
    }

    #[tokio::test]
    async fn empty_config_discovers_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        write_bars(dir.path(), "ZZZ", 30);
        write_bars(dir.path(), "AAA", 30);
        let state = state_for(dir.path(), Vec::new());

        let report = run_batch(state, Some(Vec::new())).await.unwrap();
        assert_eq!(report.succeeded, vec!["AAA", "ZZZ"]);
        assert!(report.failed.is_empty());
    }

    #[tokio::test]
    async fn ids_escaping_the_data_dir_fail() {
        let root = tempfile::tempdir().unwrap();
        let data = root.path().join("data");
        let secret = root.path().join("secret");
        std::fs::create_dir_all(&data).unwrap();
        std::fs::create_dir_all(&secret).unwrap();
        write_bars(&secret, "PRIVATE", 40);

        let absolute = secret.join("PRIVATE").display().to_string();
        let state = state_for(&data, Vec::new());
        let report = run_batch(
            state.clone(),
            Some(vec!["../secret/PRIVATE".into(), absolute]),
        )
        .await
        .unwrap();

        assert!(report.succeeded.is_empty());
        assert_eq!(report.failed.len(), 2);
        assert!(report
            .failed
            .iter()
            .all(|f| f.error.contains("invalid stock id")));
        assert_eq!(state.results_cached(), 0);
    }
}
