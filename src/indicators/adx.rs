// =============================================================================
// Average Directional Index (ADX) with +DI / -DI
// =============================================================================
//
// ADX quantifies trend **strength** regardless of direction.
//
// Calculation pipeline:
//   1. Compute +DM (positive directional movement) and -DM per bar.
//   2. Compute True Range (TR) per bar.
//   3. Apply Wilder's smoothing (period) to +DM, -DM, and TR.
//   4. Derive +DI = smoothed(+DM) / smoothed(TR) * 100
//            -DI = smoothed(-DM) / smoothed(TR) * 100
//   5. DX  = |+DI - -DI| / (+DI + -DI) * 100
//   6. ADX = Wilder's smoothed average of DX over `period` bars.
//
// All running totals live in `DirectionalState`, which is folded over the
// per-bar movements.  Nothing is carried outside one call.
//
// Interpretation:
//   ADX > 25  => trending market
//   ADX < 20  => ranging / choppy market
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::market_data::Bar;

pub const ADX_PERIOD: usize = 14;

/// Latest ADX reading with its directional indicators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdxResult {
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
}

/// Raw movement between two consecutive bars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalMove {
    pub plus_dm: f64,
    pub minus_dm: f64,
    pub tr: f64,
}

impl DirectionalMove {
    pub fn between(prev: &Bar, bar: &Bar) -> Self {
        let up_move = bar.high - prev.high;
        let down_move = prev.low - bar.low;

        let plus_dm = if up_move > down_move && up_move > 0.0 {
            up_move
        } else {
            0.0
        };
        let minus_dm = if down_move > up_move && down_move > 0.0 {
            down_move
        } else {
            0.0
        };

        Self {
            plus_dm,
            minus_dm,
            tr: bar.true_range(prev.close),
        }
    }
}

/// Accumulator threaded through the fold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalState {
    period: usize,
    /// Movements consumed so far.
    moves: usize,
    smooth_plus_dm: f64,
    smooth_minus_dm: f64,
    smooth_tr: f64,
    /// DX values consumed so far.
    dx_count: usize,
    dx_sum: f64,
    plus_di: Option<f64>,
    minus_di: Option<f64>,
    adx: Option<f64>,
    /// Set once a smoothed TR of zero (or a non-finite value) is seen.
    undefined: bool,
}

impl DirectionalState {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            moves: 0,
            smooth_plus_dm: 0.0,
            smooth_minus_dm: 0.0,
            smooth_tr: 0.0,
            dx_count: 0,
            dx_sum: 0.0,
            plus_di: None,
            minus_di: None,
            adx: None,
            undefined: false,
        }
    }

    /// Consume one bar-to-bar movement.
    pub fn step(mut self, mv: &DirectionalMove) -> Self {
        if self.undefined || self.period == 0 {
            return self;
        }
        let period_f = self.period as f64;
        self.moves += 1;

        // Step 3: plain sum for the first `period` movements, Wilder after.
        if self.moves <= self.period {
            self.smooth_plus_dm += mv.plus_dm;
            self.smooth_minus_dm += mv.minus_dm;
            self.smooth_tr += mv.tr;
            if self.moves < self.period {
                return self;
            }
        } else {
            self.smooth_plus_dm += mv.plus_dm - self.smooth_plus_dm / period_f;
            self.smooth_minus_dm += mv.minus_dm - self.smooth_minus_dm / period_f;
            self.smooth_tr += mv.tr - self.smooth_tr / period_f;
        }

        // Steps 4-5.
        let Some((plus_di, minus_di, dx)) =
            directional_index(self.smooth_plus_dm, self.smooth_minus_dm, self.smooth_tr)
        else {
            self.undefined = true;
            return self;
        };
        self.plus_di = Some(plus_di);
        self.minus_di = Some(minus_di);

        // Step 6: seed with the mean of the first `period` DX values.
        self.dx_count += 1;
        if self.dx_count <= self.period {
            self.dx_sum += dx;
            if self.dx_count == self.period {
                self.adx = Some(self.dx_sum / period_f);
            }
        } else if let Some(prev) = self.adx {
            let adx = (prev * (period_f - 1.0) + dx) / period_f;
            if !adx.is_finite() {
                self.undefined = true;
                return self;
            }
            self.adx = Some(adx);
        }

        self
    }

    /// Reading after the movements consumed so far.
    pub fn result(&self) -> Option<AdxResult> {
        if self.undefined {
            return None;
        }
        Some(AdxResult {
            adx: self.adx?,
            plus_di: self.plus_di?,
            minus_di: self.minus_di?,
        })
    }
}

/// Compute the most recent ADX, +DI and -DI from a slice of bars.
///
/// Returns `None` when:
/// - `period` is zero.
/// - There are fewer than `2 * period` bars (`2 * period - 1` movements).
/// - The smoothed true range is zero or any value is non-finite.
pub fn calculate_adx(bars: &[Bar], period: usize) -> Option<AdxResult> {
    if period == 0 || bars.len() < 2 * period {
        return None;
    }

    bars.windows(2)
        .map(|w| DirectionalMove::between(&w[0], &w[1]))
        .fold(DirectionalState::new(period), |state, mv| state.step(&mv))
        .result()
}

// =============================================================================
// Internal helpers
// =============================================================================

/// +DI, -DI and DX from smoothed +DM, -DM and TR.
///
/// Returns `None` if the smoothed TR is zero or a result is non-finite.  DX is
/// zero when neither direction moved.
fn directional_index(
    smooth_plus_dm: f64,
    smooth_minus_dm: f64,
    smooth_tr: f64,
) -> Option<(f64, f64, f64)> {
    if smooth_tr == 0.0 {
        return None;
    }

    let plus_di = (smooth_plus_dm / smooth_tr) * 100.0;
    let minus_di = (smooth_minus_dm / smooth_tr) * 100.0;

    let di_sum = plus_di + minus_di;
    let dx = if di_sum == 0.0 {
        0.0
    } else {
        ((plus_di - minus_di).abs() / di_sum) * 100.0
    };

    (plus_di.is_finite() && minus_di.is_finite() && dx.is_finite())
        .then_some((plus_di, minus_di, dx))
}
