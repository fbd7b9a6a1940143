// =============================================================================
// Parabolic SAR (Stop and Reverse)
// =============================================================================
//
// Two-state machine {Up, Down} carried bar to bar in `SarState`:
//
//   sar_next = sar + af * (extreme_point - sar)
//
//   Up:   sar is capped at the lows of the two previous bars.  A low below
//         the sar flips to Down; otherwise a new high becomes the extreme
//         point and af grows by `step` up to `max`.
//   Down: mirror image using highs.
//
// On a flip the new sar is the old extreme point, clamped so that it stays
// outside the current bar (never above the low in a new uptrend, never below
// the high in a new downtrend), and af resets to `start`.
//
// The initial trend is Up when the second bar makes a higher high than the
// first, Down otherwise.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::market_data::Bar;

pub const SAR_AF_START: f64 = 0.02;
pub const SAR_AF_STEP: f64 = 0.02;
pub const SAR_AF_MAX: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SarTrend {
    Up,
    Down,
}

/// Acceleration factor schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SarParams {
    pub start: f64,
    pub step: f64,
    pub max: f64,
}

impl Default for SarParams {
    fn default() -> Self {
        Self {
            start: SAR_AF_START,
            step: SAR_AF_STEP,
            max: SAR_AF_MAX,
        }
    }
}

/// Everything the algorithm carries from one bar to the next.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SarState {
    pub trend: SarTrend,
    pub af: f64,
    pub extreme_point: f64,
    pub sar: f64,
}

impl SarState {
    /// State on the first bar, using the second bar to pick a direction.
    pub fn initial(first: &Bar, second: &Bar, params: &SarParams) -> Self {
        if second.high > first.high {
            Self {
                trend: SarTrend::Up,
                af: params.start,
                extreme_point: first.high,
                sar: first.low,
            }
        } else {
            Self {
                trend: SarTrend::Down,
                af: params.start,
                extreme_point: first.low,
                sar: first.high,
            }
        }
    }

    /// Advance to `bar`.  `prev` is the bar before it, `prev2` the one before
    /// that (absent on the second bar of the series).
    pub fn step(self, params: &SarParams, prev2: Option<&Bar>, prev: &Bar, bar: &Bar) -> Self {
        let projected = self.sar + self.af * (self.extreme_point - self.sar);

        match self.trend {
            SarTrend::Up => {
                let capped = prev2.map_or(prev.low, |p| p.low.min(prev.low));
                let sar = projected.min(capped);

                if bar.low < sar {
                    return Self {
                        trend: SarTrend::Down,
                        af: params.start,
                        extreme_point: bar.low,
                        sar: self.extreme_point.max(bar.high),
                    };
                }

                let (extreme_point, af) = if bar.high > self.extreme_point {
                    (bar.high, (self.af + params.step).min(params.max))
                } else {
                    (self.extreme_point, self.af)
                };
                Self {
                    trend: SarTrend::Up,
                    af,
                    extreme_point,
                    sar,
                }
            }
            SarTrend::Down => {
                let capped = prev2.map_or(prev.high, |p| p.high.max(prev.high));
                let sar = projected.max(capped);

                if bar.high > sar {
                    return Self {
                        trend: SarTrend::Up,
                        af: params.start,
                        extreme_point: bar.high,
                        sar: self.extreme_point.min(bar.low),
                    };
                }

                let (extreme_point, af) = if bar.low < self.extreme_point {
                    (bar.low, (self.af + params.step).min(params.max))
                } else {
                    (self.extreme_point, self.af)
                };
                Self {
                    trend: SarTrend::Down,
                    af,
                    extreme_point,
                    sar,
                }
            }
        }
    }
}

/// Full SAR state series, one entry per bar.  Empty with fewer than two bars.
pub fn calculate_sar(bars: &[Bar], params: &SarParams) -> Vec<SarState> {
    if bars.len() < 2 {
        return Vec::new();
    }

    let initial = SarState::initial(&bars[0], &bars[1], params);

    // A fold that keeps every intermediate state.
    let rest = (1..bars.len()).scan(initial, |state, i| {
        let prev2 = i.checked_sub(2).map(|j| &bars[j]);
        *state = state.step(params, prev2, &bars[i - 1], &bars[i]);
        Some(*state)
    });

    std::iter::once(initial).chain(rest).collect()
}

/// Latest SAR state with the default 0.02 / 0.02 / 0.2 schedule.
pub fn current_sar(bars: &[Bar]) -> Option<SarState> {
    calculate_sar(bars, &SarParams::default()).last().copied()
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::bar::fixtures::{bar, falling, random_walk, rising};

    #[test]
    fn sar_needs_two_bars() {
        assert!(calculate_sar(&rising(1), &SarParams::default()).is_empty());
        assert!(current_sar(&[]).is_none());
    }

    #[test]
    fn uptrend_stays_up_and_below_lows() {
        let bars = rising(40);
        let states = calculate_sar(&bars, &SarParams::default());
        assert_eq!(states.len(), bars.len());
        for (state, b) in states.iter().zip(&bars) {
            assert_eq!(state.trend, SarTrend::Up);
            assert!(state.sar <= b.low, "sar {} above low {}", state.sar, b.low);
        }
    }

    #[test]
    fn af_grows_to_cap() {
        let state = current_sar(&rising(40)).unwrap();
        assert!((state.af - SAR_AF_MAX).abs() < 1e-12);
    }

    #[test]
    fn downtrend_stays_above_highs() {
        let bars = falling(40);
        let states = calculate_sar(&bars, &SarParams::default());
        for (state, b) in states.iter().zip(&bars).skip(1) {
            assert_eq!(state.trend, SarTrend::Down);
            assert!(state.sar >= b.high);
        }
    }

    #[test]
    fn reversal_flips_trend_and_resets_af() {
        let mut bars = rising(20);
        // Crash through the SAR.
        let last = bars[19];
        bars.push(bar(20, last.close, last.close, last.close * 0.5, last.close * 0.6, 1.0));
        let states = calculate_sar(&bars, &SarParams::default());
        let flipped = states[20];
        assert_eq!(flipped.trend, SarTrend::Down);
        assert_eq!(flipped.af, SAR_AF_START);
        assert_eq!(flipped.extreme_point, bars[20].low);
        assert!(flipped.sar >= bars[20].high);
    }

    #[test]
    fn sar_is_outside_every_bar_of_its_trend() {
        let bars = random_walk(300, 7);
        let states = calculate_sar(&bars, &SarParams::default());
        for (state, b) in states.iter().zip(&bars).skip(1) {
            match state.trend {
                SarTrend::Up => assert!(state.sar <= b.low + 1e-9),
                SarTrend::Down => assert!(state.sar >= b.high - 1e-9),
            }
            assert!(state.af >= SAR_AF_START && state.af <= SAR_AF_MAX + 1e-12);
        }
    }
}
