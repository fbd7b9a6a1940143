use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// One trading day of OHLCV data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Typical price: (high + low + close) / 3.
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// True range against the previous bar's close.
    pub fn true_range(&self, prev_close: f64) -> f64 {
        (self.high - self.low)
            .max((self.high - prev_close).abs())
            .max((self.low - prev_close).abs())
    }
}

// ---------------------------------------------------------------------------
// Columns -- column-major view over a bar slice
// ---------------------------------------------------------------------------

/// Column-major copy of a bar series. Most indicators operate on a single
/// column, so the split is done once per analysis.
#[derive(Debug, Clone, Default)]
pub struct Columns {
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    pub volume: Vec<f64>,
    pub typical: Vec<f64>,
}

impl Columns {
    pub fn from_bars(bars: &[Bar]) -> Self {
        let mut cols = Self {
            high: Vec::with_capacity(bars.len()),
            low: Vec::with_capacity(bars.len()),
            close: Vec::with_capacity(bars.len()),
            volume: Vec::with_capacity(bars.len()),
            typical: Vec::with_capacity(bars.len()),
        };
        for bar in bars {
            cols.high.push(bar.high);
            cols.low.push(bar.low);
            cols.close.push(bar.close);
            cols.volume.push(bar.volume);
            cols.typical.push(bar.typical_price());
        }
        cols
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::bar;
    use super::*;

    #[test]
    fn typical_price_is_hlc_mean() {
        let b = bar(0, 10.0, 12.0, 9.0, 11.0, 1.0);
        assert!((b.typical_price() - 32.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn true_range_uses_gap() {
        let b = bar(1, 110.0, 115.0, 108.0, 112.0, 1.0);
        assert_eq!(b.true_range(95.0), 20.0);
        assert_eq!(b.true_range(110.0), 7.0);
    }

    #[test]
    fn columns_split_preserves_order() {
        let bars = vec![bar(0, 1.0, 2.0, 0.5, 1.5, 10.0), bar(1, 1.5, 3.0, 1.0, 2.5, 20.0)];
        let cols = Columns::from_bars(&bars);
        assert_eq!(cols.close, vec![1.5, 2.5]);
        assert_eq!(cols.volume, vec![10.0, 20.0]);
        assert_eq!(cols.high, vec![2.0, 3.0]);
    }
}
