// =============================================================================
// Relative Strength Index (RSI) — Wilder's Smoothing
// =============================================================================
//
// Each close-to-close change splits into a gain and a loss (one of them 0).
// The first `period` moves seed the averages with a plain mean, after which
// Wilder smoothing (alpha = 1 / period) carries them forward:
//
//   avg = avg + (move - avg) / period
//   RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//
// Degenerate averages: no losses => 100, no movement at all => 50.
// =============================================================================

pub const RSI_PERIOD: usize = 14;

/// Average upward and downward movement.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Movement {
    gain: f64,
    loss: f64,
}

impl Movement {
    fn between(prev: f64, close: f64) -> Self {
        let delta = close - prev;
        Self {
            gain: delta.max(0.0),
            loss: (-delta).max(0.0),
        }
    }

    fn smooth(self, next: Movement, period: f64) -> Self {
        Self {
            gain: self.gain + (next.gain - self.gain) / period,
            loss: self.loss + (next.loss - self.loss) / period,
        }
    }

    fn rsi(self) -> Option<f64> {
        let rsi = match (self.gain == 0.0, self.loss == 0.0) {
            (true, true) => 50.0,
            (_, true) => 100.0,
            _ => 100.0 - 100.0 / (1.0 + self.gain / self.loss),
        };
        rsi.is_finite().then_some(rsi)
    }
}

/// RSI series, one value per close from index `period` onward.
///
/// Empty when `period` is 0 or fewer than `period + 1` closes are given.
/// A non-finite reading ends the series.
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() <= period {
        return Vec::new();
    }

    let period_f = period as f64;
    let mut moves = closes.windows(2).map(|w| Movement::between(w[0], w[1]));

    let seed = moves
        .by_ref()
        .take(period)
        .fold(Movement::default(), |acc, m| Movement {
            gain: acc.gain + m.gain / period_f,
            loss: acc.loss + m.loss / period_f,
        });

    std::iter::once(seed)
        .chain(moves.scan(seed, |avg, m| {
            *avg = avg.smooth(m, period_f);
            Some(*avg)
        }))
        .map_while(Movement::rsi)
        .collect()
}

/// Latest RSI reading.
pub fn current_rsi(closes: &[f64], period: usize) -> Option<f64> {
    calculate_rsi(closes, period).last().copied()
}
