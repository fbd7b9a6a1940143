// =============================================================================
// On-Balance Volume (OBV)
// =============================================================================
//
// Running total of volume signed by the close-to-close direction:
//   close up   => +volume
//   close down => -volume
//   unchanged  => 0
// The first bar contributes nothing.

/// Full OBV series, one value per close.  Empty when the input is empty.
pub fn calculate_obv(closes: &[f64], volumes: &[f64]) -> Vec<f64> {
    if closes.is_empty() || closes.len() != volumes.len() {
        return Vec::new();
    }

    let steps = closes.windows(2).zip(&volumes[1..]).scan(0.0_f64, |obv, (w, &vol)| {
        if w[1] > w[0] {
            *obv += vol;
        } else if w[1] < w[0] {
            *obv -= vol;
        }
        Some(*obv)
    });

    std::iter::once(0.0).chain(steps).collect()
}

/// Latest OBV value.
pub fn current_obv(closes: &[f64], volumes: &[f64]) -> Option<f64> {
    calculate_obv(closes, volumes).last().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obv_signs_follow_direction() {
        let closes = [10.0, 11.0, 11.0, 10.5, 12.0];
        let volumes = [100.0, 200.0, 300.0, 400.0, 500.0];
        assert_eq!(calculate_obv(&closes, &volumes), vec![0.0, 200.0, 200.0, -200.0, 300.0]);
    }

    #[test]
    fn obv_flat_is_zero() {
        assert_eq!(current_obv(&[5.0; 25], &[1_000.0; 25]), Some(0.0));
    }

    #[test]
    fn obv_mismatched_input() {
        assert!(current_obv(&[1.0, 2.0], &[1.0]).is_none());
        assert!(current_obv(&[], &[]).is_none());
    }
}
