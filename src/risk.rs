// =============================================================================
// Risk Assessor — coarse risk label from the latest indicator readings
// =============================================================================
//
// Risk factors:
//   1. High volatility      — ATR exceeds 5% of the close.
//   2. Extreme momentum     — RSI above 80 or below 20.
//   3. Near 52-week high    — close above 95% of the 52-week high.
//   4. Far from 52-week high — close below 60% of the 52-week high.
//
// Level: 3+ factors HIGH, 1–2 MEDIUM, none LOW.  Unavailable inputs simply
// contribute no factor.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::indicators::IndicatorSet;
use crate::types::RiskLevel;

pub const HIGH_VOLATILITY_PCT: f64 = 5.0;
pub const EXTREME_RSI_HIGH: f64 = 80.0;
pub const EXTREME_RSI_LOW: f64 = 20.0;
pub const NEAR_HIGH_RATIO: f64 = 95.0;
pub const FAR_FROM_HIGH_RATIO: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    HighVolatility,
    ExtremeMomentum,
    NearHigh,
    FarFromHigh,
}

impl std::fmt::Display for RiskFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HighVolatility => write!(f, "high_volatility"),
            Self::ExtremeMomentum => write!(f, "extreme_momentum"),
            Self::NearHigh => write!(f, "near_high"),
            Self::FarFromHigh => write!(f, "far_from_high"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub factors: Vec<RiskFactor>,
}

/// Collect the risk factors present in `set` and derive the level.
pub fn assess_risk(set: &IndicatorSet) -> RiskAssessment {
    let mut factors = Vec::new();

    let volatility = set
        .atr
        .zip(set.close)
        .filter(|&(_, close)| close > 0.0)
        .map(|(atr, close)| atr / close * 100.0);
    if volatility.is_some_and(|v| v > HIGH_VOLATILITY_PCT) {
        factors.push(RiskFactor::HighVolatility);
    }

    if set
        .rsi
        .is_some_and(|rsi| rsi > EXTREME_RSI_HIGH || rsi < EXTREME_RSI_LOW)
    {
        factors.push(RiskFactor::ExtremeMomentum);
    }

    if let Some(range) = set.range_52w {
        if range.high_ratio > NEAR_HIGH_RATIO {
            factors.push(RiskFactor::NearHigh);
        } else if range.high_ratio < FAR_FROM_HIGH_RATIO {
            factors.push(RiskFactor::FarFromHigh);
        }
    }

    RiskAssessment {
        level: level_for(factors.len()),
        factors,
    }
}

fn level_for(count: usize) -> RiskLevel {
    match count {
        0 => RiskLevel::Low,
        1 | 2 => RiskLevel::Medium,
        _ => RiskLevel::High,
    }
}
