// =============================================================================
// Signal Classifier — latest indicator readings to categorical signals
// =============================================================================
//
// Rules (boundaries are exact):
//   RSI         <30 STRONG_BUY | [30,50) BUY | ==50 NEUTRAL | (50,70] SELL | >70 STRONG_SELL
//   MACD        macd > signal BUY, otherwise SELL
//   SMA         close > SMA20 > SMA60 BUY | close < SMA20 < SMA60 SELL | else NEUTRAL
//   Bollinger   %B > 80 SELL | %B < 20 BUY | else NEUTRAL
//   Stochastic  %K,%D < 20 BUY | %K,%D > 80 SELL | else NEUTRAL
//
// ADX produces a trend tag only.  It is never part of the signal list.
// A signal is omitted when its inputs are unavailable.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::indicators::IndicatorSet;
use crate::types::{SignalKind, TrendTag};

/// ADX level above which a trend is considered strong.
pub const ADX_STRONG_TREND: f64 = 25.0;

/// Indicator a signal was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSource {
    Rsi,
    Macd,
    MovingAverage,
    Bollinger,
    Stochastic,
}

impl std::fmt::Display for SignalSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rsi => write!(f, "RSI"),
            Self::Macd => write!(f, "MACD"),
            Self::MovingAverage => write!(f, "SMA"),
            Self::Bollinger => write!(f, "Bollinger"),
            Self::Stochastic => write!(f, "Stochastic"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub source: SignalSource,
    pub kind: SignalKind,
    pub level: i8,
}

impl Signal {
    pub fn new(source: SignalSource, kind: SignalKind) -> Self {
        Self {
            source,
            kind,
            level: kind.level(),
        }
    }
}

/// Classify every available indicator, in the fixed order
/// RSI, MACD, SMA, Bollinger, Stochastic.
pub fn classify(set: &IndicatorSet) -> Vec<Signal> {
    [
        (SignalSource::Rsi, set.rsi.map(classify_rsi)),
        (SignalSource::Macd, set.macd.map(|m| classify_macd(m.macd, m.signal))),
        (SignalSource::MovingAverage, classify_moving_average(set)),
        (SignalSource::Bollinger, set.bb_position.map(classify_bollinger)),
        (SignalSource::Stochastic, set.stochastic.map(|s| classify_stochastic(s.k, s.d))),
    ]
    .into_iter()
    .filter_map(|(source, kind)| kind.map(|k| Signal::new(source, k)))
    .collect()
}

pub fn classify_rsi(rsi: f64) -> SignalKind {
    if rsi < 30.0 {
        SignalKind::StrongBuy
    } else if rsi < 50.0 {
        SignalKind::Buy
    } else if rsi == 50.0 {
        SignalKind::Neutral
    } else if rsi <= 70.0 {
        SignalKind::Sell
    } else {
        SignalKind::StrongSell
    }
}

pub fn classify_macd(macd: f64, signal: f64) -> SignalKind {
    if macd > signal {
        SignalKind::Buy
    } else {
        SignalKind::Sell
    }
}

fn classify_moving_average(set: &IndicatorSet) -> Option<SignalKind> {
    let close = set.close?;
    let sma20 = set.sma_20?;
    let sma60 = set.sma_60?;

    Some(if close > sma20 && sma20 > sma60 {
        SignalKind::Buy
    } else if close < sma20 && sma20 < sma60 {
        SignalKind::Sell
    } else {
        SignalKind::Neutral
    })
}

pub fn classify_bollinger(position: f64) -> SignalKind {
    if position > 80.0 {
        SignalKind::Sell
    } else if position < 20.0 {
        SignalKind::Buy
    } else {
        SignalKind::Neutral
    }
}

pub fn classify_stochastic(k: f64, d: f64) -> SignalKind {
    if k < 20.0 && d < 20.0 {
        SignalKind::Buy
    } else if k > 80.0 && d > 80.0 {
        SignalKind::Sell
    } else {
        SignalKind::Neutral
    }
}

/// Trend tag from ADX.
pub fn trend_tag(set: &IndicatorSet) -> TrendTag {
    match set.adx {
        Some(a) if a.adx > ADX_STRONG_TREND => TrendTag::Strong,
        Some(_) => TrendTag::Weak,
        None => TrendTag::Unknown,
    }
}
