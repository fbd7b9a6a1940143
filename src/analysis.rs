// =============================================================================
// Analysis Orchestrator — validated bars to a complete verdict
// =============================================================================
//
// Pipeline (strictly sequential, no shared state):
//   validate -> indicators -> classify -> score -> risk -> summary
//
// The orchestrator is pure: it does no I/O, keeps nothing between calls and
// stamps no wall-clock time, so analysing the same bars twice yields equal
// results.  Callers own timing, storage and logging.
// =============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::indicators::{backend_for, compute_indicators, BackendKind, IndicatorName, IndicatorSet};
use crate::market_data::Bar;
use crate::risk::{assess_risk, RiskAssessment};
use crate::signals::{classify, score_signals, trend_tag, CompositeScore, Signal};
use crate::types::{MomentumStatus, TrendStrength, TrendTag, VolatilityLevel, VolumeTrend};
use crate::validation::{validate_series, ValidationError, MIN_BARS};

const VOLUME_SHORT_WINDOW: usize = 5;
const VOLUME_LONG_WINDOW: usize = 20;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Number of bars analysed.
    pub total_days: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub trend_strength: TrendStrength,
    pub momentum_status: MomentumStatus,
    pub volatility_level: VolatilityLevel,
    pub volume_trend: VolumeTrend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    pub backend: BackendKind,
    pub indicators_calculated: usize,
    pub indicators_total: usize,
    pub signals_generated: usize,
}

/// Complete verdict for one stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub stock_id: String,
    pub current_price: f64,
    pub data_period: DataPeriod,
    pub indicators: IndicatorSet,
    pub signals: Vec<Signal>,
    pub trend_tag: TrendTag,
    pub composite: CompositeScore,
    pub risk: RiskAssessment,
    pub summary: AnalysisSummary,
    pub metadata: AnalysisMetadata,
}

// ---------------------------------------------------------------------------
// AnalysisOrchestrator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct AnalysisOrchestrator {
    backend: BackendKind,
}

impl AnalysisOrchestrator {
    pub fn new(backend: BackendKind) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    /// Run the full pipeline over `bars`.
    pub fn analyze(&self, stock_id: &str, bars: &[Bar]) -> Result<AnalysisResult, ValidationError> {
        validate_series(bars)?;

        let (Some(first), Some(last)) = (bars.first(), bars.last()) else {
            return Err(ValidationError::TooShort {
                required: MIN_BARS,
                actual: bars.len(),
            });
        };

        let backend = backend_for(self.backend);
        let indicators = compute_indicators(bars, backend);
        let signals = classify(&indicators);
        let composite = score_signals(&signals);
        let risk = assess_risk(&indicators);

        let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();
        let summary = AnalysisSummary {
            trend_strength: trend_strength(&indicators),
            momentum_status: momentum_status(&indicators),
            volatility_level: volatility_level(&indicators),
            volume_trend: volume_trend(&volumes),
        };

        let metadata = AnalysisMetadata {
            backend: self.backend,
            indicators_calculated: indicators.available_count(),
            indicators_total: IndicatorName::ALL.len(),
            signals_generated: signals.len(),
        };

        Ok(AnalysisResult {
            stock_id: stock_id.to_string(),
            current_price: last.close,
            data_period: DataPeriod {
                start: first.date,
                end: last.date,
                total_days: bars.len(),
            },
            trend_tag: trend_tag(&indicators),
            indicators,
            signals,
            composite,
            risk,
            summary,
            metadata,
        })
    }
}

// ---------------------------------------------------------------------------
// Summary labels
// ---------------------------------------------------------------------------

fn trend_strength(set: &IndicatorSet) -> TrendStrength {
    match set.adx.map(|a| a.adx) {
        Some(adx) if adx > 25.0 => TrendStrength::Strong,
        Some(adx) if adx > 20.0 => TrendStrength::Moderate,
        Some(_) => TrendStrength::Weak,
        None => TrendStrength::Unknown,
    }
}

fn momentum_status(set: &IndicatorSet) -> MomentumStatus {
    match set.rsi {
        Some(rsi) if rsi > 70.0 => MomentumStatus::Overbought,
        Some(rsi) if rsi < 30.0 => MomentumStatus::Oversold,
        Some(rsi) if rsi > 50.0 => MomentumStatus::Bullish,
        Some(_) => MomentumStatus::Bearish,
        None => MomentumStatus::Unknown,
    }
}

fn volatility_level(set: &IndicatorSet) -> VolatilityLevel {
    match set.atr_pct {
        Some(pct) if pct > 5.0 => VolatilityLevel::High,
        Some(pct) if pct > 2.0 => VolatilityLevel::Medium,
        Some(_) => VolatilityLevel::Low,
        None => VolatilityLevel::Unknown,
    }
}

/// Recent (5-bar) against longer (20-bar) average volume.
fn volume_trend(volumes: &[f64]) -> VolumeTrend {
    let mean_tail = |n: usize| -> Option<f64> {
        (volumes.len() >= n).then(|| volumes[volumes.len() - n..].iter().sum::<f64>() / n as f64)
    };

    let (Some(short), Some(long)) = (mean_tail(VOLUME_SHORT_WINDOW), mean_tail(VOLUME_LONG_WINDOW))
    else {
        return VolumeTrend::Normal;
    };
    if long == 0.0 {
        return VolumeTrend::Normal;
    }

    let ratio = short / long;
    if ratio > 1.2 {
        VolumeTrend::Increasing
    } else if ratio < 0.8 {
        VolumeTrend::Decreasing
    } else {
        VolumeTrend::Normal
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::bar::fixtures::{bar, falling, flat, random_walk, rising};
    use crate::signals::SignalSource;
    use crate::types::{Recommendation, RiskLevel, SignalKind, SignalStrength};

    fn orchestrator() -> AnalysisOrchestrator {
        AnalysisOrchestrator::new(BackendKind::Reference)
    }

    #[test]
    fn repeated_analysis_is_identical() {
        let bars = random_walk(300, 11);
        let a = orchestrator().analyze("005930", &bars).unwrap();
        let b = orchestrator().analyze("005930", &bars).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn too_short_series_is_rejected() {
        let err = orchestrator().analyze("X", &flat(19, 10.0)).unwrap_err();
        assert_eq!(err, ValidationError::TooShort { required: 20, actual: 19 });
    }

    #[test]
    fn invalid_bar_is_rejected() {
        let mut bars = flat(30, 10.0);
        bars[7] = bar(7, 10.0, 9.0, 11.0, 10.0, 100.0);
        let err = orchestrator().analyze("X", &bars).unwrap_err();
        assert_eq!(err, ValidationError::InvalidHighLowOrder { index: 7 });
    }

    #[test]
    fn flat_series_is_neutral() {
        let r = orchestrator().analyze("FLAT", &flat(25, 50.0)).unwrap();

        assert_eq!(r.indicators.rsi, Some(50.0));
        assert_eq!(r.signals, vec![Signal::new(SignalSource::Rsi, SignalKind::Neutral)]);
        assert_eq!(r.composite.score, 50.0);
        assert_eq!(r.composite.recommendation, Recommendation::Neutral);
        assert_eq!(r.indicators.atr, Some(0.0));
        assert_eq!(r.trend_tag, TrendTag::Unknown);
        assert_eq!(r.summary.trend_strength, TrendStrength::Unknown);
        assert_eq!(r.summary.volatility_level, VolatilityLevel::Low);
        assert_eq!(r.summary.volume_trend, VolumeTrend::Normal);
        // Close sits at the 52-week high.
        assert_eq!(r.risk.level, RiskLevel::Medium);
    }

    #[test]
    fn steady_rise_reads_overbought_with_bullish_macd() {
        let r = orchestrator().analyze("UP", &rising(40)).unwrap();

        assert_eq!(r.indicators.rsi, Some(100.0));
        assert_eq!(r.signals[0], Signal::new(SignalSource::Rsi, SignalKind::StrongSell));
        assert_eq!(r.signals[1], Signal::new(SignalSource::Macd, SignalKind::Buy));
        assert_eq!(r.summary.momentum_status, MomentumStatus::Overbought);
        assert_eq!(r.trend_tag, TrendTag::Strong);
        assert_eq!(r.summary.trend_strength, TrendStrength::Strong);
        // SMA60 needs 60 bars.
        assert!(r.signals.iter().all(|s| s.source != SignalSource::MovingAverage));
        // %B ~94 and %K/%D ~98: both bands read overextended.
        assert_eq!(r.signals[2], Signal::new(SignalSource::Bollinger, SignalKind::Sell));
        assert_eq!(r.signals[3], Signal::new(SignalSource::Stochastic, SignalKind::Sell));
        assert_eq!(r.signals.len(), 4);

        // raw = -2 + 1 - 1 - 1 = -3 over k = 4 => 100 * 5 / 16
        assert_eq!(r.composite.raw, -3);
        assert_eq!(r.composite.score, 31.25);
        assert_eq!(r.composite.recommendation, Recommendation::Sell);
        assert_eq!(r.composite.strength, SignalStrength::Weak);
    }

    #[test]
    fn steady_decline_has_sell_alignment() {
        let r = orchestrator().analyze("DOWN", &falling(80)).unwrap();
        let ma = r
            .signals
            .iter()
            .find(|s| s.source == SignalSource::MovingAverage)
            .unwrap();
        assert_eq!(ma.kind, SignalKind::Sell);
        assert_eq!(r.summary.momentum_status, MomentumStatus::Oversold);
    }

    #[test]
    fn partial_availability_is_reported() {
        let r = orchestrator().analyze("SHORT", &random_walk(25, 8)).unwrap();
        assert!(r.metadata.indicators_calculated < r.metadata.indicators_total);
        assert!(r.indicators.sma_200.is_none());
        assert_eq!(r.metadata.signals_generated, r.signals.len());
        assert_eq!(r.composite.signal_count, r.signals.len());
        assert_eq!(r.data_period.total_days, 25);
        assert!(r.data_period.start < r.data_period.end);
    }

    #[test]
    fn composite_stays_in_bounds() {
        for seed in 0..20 {
            let r = orchestrator().analyze("RW", &random_walk(120, seed)).unwrap();
            assert!((0.0..=100.0).contains(&r.composite.score));
            assert!(r.signals.iter().all(|s| (-2..=2).contains(&s.level)));
        }
    }

    #[test]
    fn backend_is_recorded() {
        let r = AnalysisOrchestrator::new(BackendKind::Accelerated)
            .analyze("X", &random_walk(60, 1))
            .unwrap();
        assert_eq!(r.metadata.backend, BackendKind::Accelerated);
    }

    #[test]
    fn volume_trend_thresholds() {
        let mut volumes = vec![100.0; 20];
        assert_eq!(volume_trend(&volumes), VolumeTrend::Normal);
        for v in volumes.iter_mut().skip(15) {
            *v = 200.0;
        }
        assert_eq!(volume_trend(&volumes), VolumeTrend::Increasing);
        for v in volumes.iter_mut().skip(15) {
            *v = 10.0;
        }
        assert_eq!(volume_trend(&volumes), VolumeTrend::Decreasing);
        assert_eq!(volume_trend(&[0.0; 20]), VolumeTrend::Normal);
    }
}
