// =============================================================================
// Runtime Configuration — engine settings with atomic save
// =============================================================================
//
// Where bar files live, which stocks the batch runner covers, which indicator
// backend to use and how many analyses may run at once.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash.  All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
//
// =============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::indicators::BackendKind;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_true() -> bool {
    true
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_symbols() -> Vec<String> {
    vec![
        "005930".to_string(),
        "000660".to_string(),
        "035420".to_string(),
        "051910".to_string(),
        "090430".to_string(),
    ]
}

fn default_max_concurrent_analyses() -> usize {
    4
}

fn default_max_stored_results() -> usize {
    1_000
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level runtime configuration.
///
/// Every field has a serde default so that older JSON files missing new fields
/// will still deserialise correctly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Directory holding one `<stock_id>.json` bar file per stock.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Stocks analysed by a batch run.  Empty means every file in `data_dir`.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,

    /// Rolling-window kernel implementation: "reference" or "accelerated".
    #[serde(default)]
    pub indicator_backend: BackendKind,

    /// Upper bound on analyses running at the same time in a batch.
    #[serde(default = "default_max_concurrent_analyses")]
    pub max_concurrent_analyses: usize,

    /// Upper bound on stocks kept in the result store; the least recently
    /// stored analysis is evicted first.
    #[serde(default = "default_max_stored_results")]
    pub max_stored_results: usize,

    /// Analyse every configured stock once before the API starts serving.
    #[serde(default = "default_true")]
    pub run_batch_on_startup: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            symbols: default_symbols(),
            indicator_backend: BackendKind::default(),
            max_concurrent_analyses: default_max_concurrent_analyses(),
            max_stored_results: default_max_stored_results(),
            run_batch_on_startup: true,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            symbols = ?config.symbols,
            backend = %config.indicator_backend,
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Load `path`, or write the defaults there when no file exists yet.
    ///
    /// An existing file that fails to read or parse is an error and is left
    /// untouched.
    pub fn load_or_init(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }

        let config = Self::default();
        config.save(path)?;
        info!(path = %path.display(), "default runtime config written");
        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise runtime config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "runtime config saved (atomic)");
        Ok(())
    }

    /// Concurrency limit, never below one.
    pub fn concurrency(&self) -> usize {
        self.max_concurrent_analyses.max(1)
    }

    /// Result store capacity, never below one.
    pub fn result_capacity(&self) -> usize {
        self.max_stored_results.max(1)
    }
}
