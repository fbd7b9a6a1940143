// =============================================================================
// Indicator Backends — rolling-window kernels
// =============================================================================
//
// Every windowed indicator (SMA, Stochastic, Williams %R, CCI, VWAP, CMF,
// Donchian, 52-week range) reduces to three kernels over a trailing window:
// mean, max and min.  The kernels are provided by an `IndicatorBackend`:
//
//   reference    — recomputes every window from scratch, O(n * w).  Ground
//                  truth for tests.
//   accelerated  — running sum for the mean and monotonic deques for max/min,
//                  O(n).  Must agree with the reference within floating-point
//                  tolerance.
//
// Output convention for all kernels: one value per full window, so
// `out[i]` covers `values[i ..= i + period - 1]` and
// `out.len() == values.len() - period + 1`.  Empty when `period == 0` or the
// input is shorter than `period`.
// =============================================================================

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Which kernel implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Reference,
    Accelerated,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reference => write!(f, "reference"),
            Self::Accelerated => write!(f, "accelerated"),
        }
    }
}

/// Rolling-window kernels shared by the windowed indicators.
pub trait IndicatorBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Arithmetic mean of each full trailing window.
    fn rolling_mean(&self, values: &[f64], period: usize) -> Vec<f64>;

    /// Maximum of each full trailing window.
    fn rolling_max(&self, values: &[f64], period: usize) -> Vec<f64>;

    /// Minimum of each full trailing window.
    fn rolling_min(&self, values: &[f64], period: usize) -> Vec<f64>;
}

/// Resolve a backend instance for `kind`.
pub fn backend_for(kind: BackendKind) -> &'static dyn IndicatorBackend {
    static REFERENCE: ReferenceBackend = ReferenceBackend;
    static ACCELERATED: AcceleratedBackend = AcceleratedBackend;

    match kind {
        BackendKind::Reference => &REFERENCE,
        BackendKind::Accelerated => &ACCELERATED,
    }
}

fn has_full_window(values: &[f64], period: usize) -> bool {
    period != 0 && values.len() >= period
}

// =============================================================================
// Reference
// =============================================================================

/// Straightforward per-window recomputation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceBackend;

impl IndicatorBackend for ReferenceBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Reference
    }

    fn rolling_mean(&self, values: &[f64], period: usize) -> Vec<f64> {
        if !has_full_window(values, period) {
            return Vec::new();
        }
        values
            .windows(period)
            .map(|w| w.iter().sum::<f64>() / period as f64)
            .collect()
    }

    fn rolling_max(&self, values: &[f64], period: usize) -> Vec<f64> {
        if !has_full_window(values, period) {
            return Vec::new();
        }
        values
            .windows(period)
            .map(|w| w.iter().copied().fold(f64::NEG_INFINITY, f64::max))
            .collect()
    }

    fn rolling_min(&self, values: &[f64], period: usize) -> Vec<f64> {
        if !has_full_window(values, period) {
            return Vec::new();
        }
        values
            .windows(period)
            .map(|w| w.iter().copied().fold(f64::INFINITY, f64::min))
            .collect()
    }
}

// =============================================================================
// Accelerated
// =============================================================================

/// Single-pass kernels.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceleratedBackend;

impl AcceleratedBackend {
    /// Sliding extreme via a monotonic deque of indices.  `keep(a, b)` is true
    /// when a value `a` already in the deque should survive the arrival of `b`.
    fn rolling_extreme(values: &[f64], period: usize, keep: fn(f64, f64) -> bool) -> Vec<f64> {
        if !has_full_window(values, period) {
            return Vec::new();
        }

        let mut out = Vec::with_capacity(values.len() - period + 1);
        let mut deque: VecDeque<usize> = VecDeque::with_capacity(period);

        for (i, &v) in values.iter().enumerate() {
            while let Some(&back) = deque.back() {
                if keep(values[back], v) {
                    break;
                }
                deque.pop_back();
            }
            deque.push_back(i);

            if let Some(&front) = deque.front() {
                if front + period <= i {
                    deque.pop_front();
                }
            }

            if i + 1 >= period {
                if let Some(&front) = deque.front() {
                    out.push(values[front]);
                }
            }
        }
        out
    }
}

impl IndicatorBackend for AcceleratedBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Accelerated
    }

    fn rolling_mean(&self, values: &[f64], period: usize) -> Vec<f64> {
        if !has_full_window(values, period) {
            return Vec::new();
        }

        let period_f = period as f64;
        let mut sum: f64 = values[..period].iter().sum();
        let mut out = Vec::with_capacity(values.len() - period + 1);
        out.push(sum / period_f);

        for i in period..values.len() {
            sum += values[i] - values[i - period];
            out.push(sum / period_f);
        }
        out
    }

    fn rolling_max(&self, values: &[f64], period: usize) -> Vec<f64> {
        Self::rolling_extreme(values, period, |kept, incoming| kept > incoming)
    }

    fn rolling_min(&self, values: &[f64], period: usize) -> Vec<f64> {
        Self::rolling_extreme(values, period, |kept, incoming| kept < incoming)
    }
}
