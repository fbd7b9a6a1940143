// =============================================================================
// Bar Loader — reads one JSON bar file per stock from the data directory
// =============================================================================
//
// File layout:  <data_dir>/<STOCK_ID>.json
// File content: [{"date": "2024-01-02", "open": .., "high": .., "low": ..,
//                 "close": .., "volume": ..}, ...]
//
// Numeric fields that are absent or null load as NaN so that the validator
// reports them as a missing column instead of the loader guessing a value.
// Bars are sorted by date; no other repair is performed.
// =============================================================================

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use super::bar::Bar;

/// A bar as it appears on disk, before missing fields are resolved.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBar {
    pub date: NaiveDate,
    #[serde(default)]
    pub open: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub close: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,
}

impl From<RawBar> for Bar {
    fn from(raw: RawBar) -> Self {
        Bar {
            date: raw.date,
            open: raw.open.unwrap_or(f64::NAN),
            high: raw.high.unwrap_or(f64::NAN),
            low: raw.low.unwrap_or(f64::NAN),
            close: raw.close.unwrap_or(f64::NAN),
            volume: raw.volume.unwrap_or(f64::NAN),
        }
    }
}

/// Convert raw records into date-ordered bars.
pub fn into_bars(raw: Vec<RawBar>) -> Vec<Bar> {
    let mut bars: Vec<Bar> = raw.into_iter().map(Bar::from).collect();
    bars.sort_by_key(|b| b.date);
    bars
}

/// Parse a JSON array of raw bars.
pub fn parse_bars(content: &str) -> Result<Vec<Bar>> {
    let raw: Vec<RawBar> =
        serde_json::from_str(content).context("failed to parse bar JSON array")?;
    Ok(into_bars(raw))
}

/// True for ids that name a file directly inside the data directory:
/// ASCII alphanumerics plus `.`, `_` and `-`, never `..` or a leading dot.
pub fn is_valid_stock_id(stock_id: &str) -> bool {
    !stock_id.is_empty()
        && !stock_id.starts_with('.')
        && !stock_id.contains("..")
        && stock_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

/// Filesystem-backed bar source.
#[derive(Debug, Clone)]
pub struct BarLoader {
    data_dir: PathBuf,
}

impl BarLoader {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Path of the bar file for `stock_id`.  Rejects ids that could resolve
    /// outside the data directory.
    pub fn path_for(&self, stock_id: &str) -> Result<PathBuf> {
        if !is_valid_stock_id(stock_id) {
            bail!("invalid stock id {stock_id:?}");
        }
        Ok(self.data_dir.join(format!("{stock_id}.json")))
    }

    /// Load and date-sort the bars of one stock.
    pub fn load(&self, stock_id: &str) -> Result<Vec<Bar>> {
        let path = self.path_for(stock_id)?;
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read bars from {}", path.display()))?;
        let bars = parse_bars(&content)
            .with_context(|| format!("invalid bar file {}", path.display()))?;

        debug!(stock_id, bars = bars.len(), path = %path.display(), "bars loaded");
        Ok(bars)
    }

    /// Stock ids with a bar file in the data directory, sorted.
    pub fn discover(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.data_dir).with_context(|| {
            format!("failed to list data directory {}", self.data_dir.display())
        })?;

        let mut ids = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .filter(|s| is_valid_stock_id(s))
            {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}
