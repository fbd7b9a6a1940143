// =============================================================================
// Shared types used across the verdict engine
// =============================================================================

use serde::{Deserialize, Serialize};

/// Categorical reading of a single indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalKind {
    StrongBuy,
    Buy,
    Neutral,
    Sell,
    StrongSell,
}

impl SignalKind {
    /// Integer level in -2..=2 used by the composite score.
    pub fn level(self) -> i8 {
        match self {
            Self::StrongBuy => 2,
            Self::Buy => 1,
            Self::Neutral => 0,
            Self::Sell => -1,
            Self::StrongSell => -2,
        }
    }
}

impl Default for SignalKind {
    fn default() -> Self {
        Self::Neutral
    }
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StrongBuy => write!(f, "STRONG_BUY"),
            Self::Buy => write!(f, "BUY"),
            Self::Neutral => write!(f, "NEUTRAL"),
            Self::Sell => write!(f, "SELL"),
            Self::StrongSell => write!(f, "STRONG_SELL"),
        }
    }
}

/// Discrete recommendation derived from the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    StrongBuy,
    Buy,
    Neutral,
    Sell,
    StrongSell,
}

impl Recommendation {
    /// Band lookup: >=80, >=60, >=40, >=20, below.
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::StrongBuy
        } else if score >= 60.0 {
            Self::Buy
        } else if score >= 40.0 {
            Self::Neutral
        } else if score >= 20.0 {
            Self::Sell
        } else {
            Self::StrongSell
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StrongBuy => write!(f, "STRONG_BUY"),
            Self::Buy => write!(f, "BUY"),
            Self::Neutral => write!(f, "NEUTRAL"),
            Self::Sell => write!(f, "SELL"),
            Self::StrongSell => write!(f, "STRONG_SELL"),
        }
    }
}

/// Conviction of the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalStrength {
    Strong,
    Weak,
}

impl std::fmt::Display for SignalStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strong => write!(f, "Strong"),
            Self::Weak => write!(f, "Weak"),
        }
    }
}

/// ADX-based trend tag reported next to the signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendTag {
    Strong,
    Weak,
    Unknown,
}

impl Default for TrendTag {
    fn default() -> Self {
        Self::Unknown
    }
}

impl std::fmt::Display for TrendTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strong => write!(f, "Strong"),
            Self::Weak => write!(f, "Weak"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Coarse risk label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

// ---------------------------------------------------------------------------
// Summary labels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendStrength {
    Strong,
    Moderate,
    Weak,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MomentumStatus {
    Overbought,
    Oversold,
    Bullish,
    Bearish,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolatilityLevel {
    High,
    Medium,
    Low,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeTrend {
    Increasing,
    Decreasing,
    Normal,
}
