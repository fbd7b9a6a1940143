// =============================================================================
// Verdict Engine — Main Entry Point
// =============================================================================
//
// Loads the runtime config, optionally analyses every configured stock once,
// then serves the REST API until Ctrl+C.
// =============================================================================

use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use verdict_engine::api;
use verdict_engine::app_state::AppState;
use verdict_engine::batch::run_batch;
use verdict_engine::runtime_config::RuntimeConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Verdict Engine starting up");

    let config_path =
        std::env::var("VERDICT_CONFIG").unwrap_or_else(|_| "runtime_config.json".into());

    // A file that fails to parse is left as is; this run uses defaults.
    let mut config = RuntimeConfig::load_or_init(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults for this run");
        RuntimeConfig::default()
    });

    // Env overrides apply to this process only and are never persisted.
    if let Ok(dir) = std::env::var("VERDICT_DATA_DIR") {
        config.data_dir = dir.into();
    }
    if let Ok(syms) = std::env::var("VERDICT_SYMBOLS") {
        config.symbols = syms
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
    }

    info!(
        data_dir = %config.data_dir.display(),
        symbols = ?config.symbols,
        backend = %config.indicator_backend,
        max_concurrent = config.concurrency(),
        "Configuration resolved"
    );

    // ── 2. Build shared state ────────────────────────────────────────────
    let run_on_startup = config.run_batch_on_startup;
    let state = Arc::new(AppState::new(config));

    // ── 3. Startup batch ─────────────────────────────────────────────────
    if run_on_startup {
        let batch_state = state.clone();
        tokio::spawn(async move {
            if let Err(e) = run_batch(batch_state, None).await {
                error!(error = %e, "Startup batch failed");
            }
        });
    }

    // ── 4. API server ────────────────────────────────────────────────────
    let bind_addr =
        std::env::var("VERDICT_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".into());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server on {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    let app = api::rest::router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
            warn!("Shutdown signal received — stopping gracefully");
        })
        .await
        .context("API server failed")?;

    info!("Verdict Engine shut down complete.");
    Ok(())
}
