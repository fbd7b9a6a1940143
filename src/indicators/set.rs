// =============================================================================
// Indicator Set — latest value of every indicator for one series
// =============================================================================
//
// `compute_indicators` runs the whole library over a validated bar series and
// keeps only the most recent reading of each indicator.  Fields are `None`
// when the series is too short or the value is numerically undefined; one
// unavailable indicator never affects another.
//
// `IndicatorName` gives a flat, enumerable view of the scalar values for
// lookups and availability counting.
// =============================================================================

use serde::{Deserialize, Serialize};

use super::adx::{calculate_adx, AdxResult, ADX_PERIOD};
use super::atr::{atr_pct, calculate_atr, ATR_PERIOD};
use super::backend::IndicatorBackend;
use super::bollinger::{calculate_bollinger, BollingerResult, BOLLINGER_PERIOD, BOLLINGER_STD};
use super::cci::{calculate_cci, CCI_PERIOD};
use super::channels::{
    calculate_donchian, calculate_keltner, Channel, CHANNEL_PERIOD, KELTNER_MULTIPLIER,
};
use super::cmf::{calculate_cmf, CMF_PERIOD};
use super::ema::current_ema;
use super::macd::{current_macd, MacdResult};
use super::obv::current_obv;
use super::parabolic_sar::{current_sar, SarState};
use super::range_52w::{calculate_52w_range, Range52w};
use super::rsi::{current_rsi, RSI_PERIOD};
use super::sma::current_sma;
use super::stochastic::{calculate_stochastic, StochasticResult, STOCH_D_PERIOD, STOCH_K_PERIOD};
use super::vwap::{calculate_vwap, VWAP_PERIOD};
use super::williams_r::{calculate_williams_r, WILLIAMS_PERIOD};
use crate::market_data::{Bar, Columns};

/// Latest readings of the full indicator library.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IndicatorSet {
    /// Close of the final bar; consumers never need the raw series.
    pub close: Option<f64>,

    pub sma_5: Option<f64>,
    pub sma_20: Option<f64>,
    pub sma_60: Option<f64>,
    pub sma_120: Option<f64>,
    pub sma_200: Option<f64>,
    pub ema_12: Option<f64>,
    pub ema_26: Option<f64>,

    pub rsi: Option<f64>,
    pub macd: Option<MacdResult>,
    pub bollinger: Option<BollingerResult>,
    /// %B position of the close inside the bands, 0..100 when inside.
    pub bb_position: Option<f64>,
    pub stochastic: Option<StochasticResult>,
    pub williams_r: Option<f64>,
    pub cci: Option<f64>,

    pub adx: Option<AdxResult>,
    pub parabolic_sar: Option<SarState>,

    pub atr: Option<f64>,
    /// ATR as a percentage of the close.
    pub atr_pct: Option<f64>,

    pub obv: Option<f64>,
    pub vwap: Option<f64>,
    pub cmf: Option<f64>,

    pub keltner: Option<Channel>,
    pub donchian: Option<Channel>,
    pub range_52w: Option<Range52w>,
}

/// Flat name for every scalar reading held by an `IndicatorSet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorName {
    Sma5,
    Sma20,
    Sma60,
    Sma120,
    Sma200,
    Ema12,
    Ema26,
    Rsi,
    Macd,
    MacdSignal,
    MacdHistogram,
    BollingerUpper,
    BollingerMiddle,
    BollingerLower,
    BollingerWidth,
    BollingerPosition,
    StochasticK,
    StochasticD,
    WilliamsR,
    Cci,
    Adx,
    PlusDi,
    MinusDi,
    ParabolicSar,
    Atr,
    AtrPct,
    Obv,
    Vwap,
    Cmf,
    KeltnerUpper,
    KeltnerMiddle,
    KeltnerLower,
    DonchianUpper,
    DonchianMiddle,
    DonchianLower,
    High52w,
    Low52w,
    High52wRatio,
    Low52wRatio,
}

impl IndicatorName {
    pub const ALL: [IndicatorName; 39] = [
        Self::Sma5,
        Self::Sma20,
        Self::Sma60,
        Self::Sma120,
        Self::Sma200,
        Self::Ema12,
        Self::Ema26,
        Self::Rsi,
        Self::Macd,
        Self::MacdSignal,
        Self::MacdHistogram,
        Self::BollingerUpper,
        Self::BollingerMiddle,
        Self::BollingerLower,
        Self::BollingerWidth,
        Self::BollingerPosition,
        Self::StochasticK,
        Self::StochasticD,
        Self::WilliamsR,
        Self::Cci,
        Self::Adx,
        Self::PlusDi,
        Self::MinusDi,
        Self::ParabolicSar,
        Self::Atr,
        Self::AtrPct,
        Self::Obv,
        Self::Vwap,
        Self::Cmf,
        Self::KeltnerUpper,
        Self::KeltnerMiddle,
        Self::KeltnerLower,
        Self::DonchianUpper,
        Self::DonchianMiddle,
        Self::DonchianLower,
        Self::High52w,
        Self::Low52w,
        Self::High52wRatio,
        Self::Low52wRatio,
    ];
}

impl IndicatorSet {
    /// Scalar lookup by name.
    pub fn value(&self, name: IndicatorName) -> Option<f64> {
        use IndicatorName::*;
        match name {
            Sma5 => self.sma_5,
            Sma20 => self.sma_20,
            Sma60 => self.sma_60,
            Sma120 => self.sma_120,
            Sma200 => self.sma_200,
            Ema12 => self.ema_12,
            Ema26 => self.ema_26,
            Rsi => self.rsi,
            Macd => self.macd.map(|m| m.macd),
            MacdSignal => self.macd.map(|m| m.signal),
            MacdHistogram => self.macd.map(|m| m.histogram),
            BollingerUpper => self.bollinger.map(|b| b.upper),
            BollingerMiddle => self.bollinger.map(|b| b.middle),
            BollingerLower => self.bollinger.map(|b| b.lower),
            BollingerWidth => self.bollinger.map(|b| b.width),
            BollingerPosition => self.bb_position,
            StochasticK => self.stochastic.map(|s| s.k),
            StochasticD => self.stochastic.map(|s| s.d),
            WilliamsR => self.williams_r,
            Cci => self.cci,
            Adx => self.adx.map(|a| a.adx),
            PlusDi => self.adx.map(|a| a.plus_di),
            MinusDi => self.adx.map(|a| a.minus_di),
            ParabolicSar => self.parabolic_sar.map(|s| s.sar),
            Atr => self.atr,
            AtrPct => self.atr_pct,
            Obv => self.obv,
            Vwap => self.vwap,
            Cmf => self.cmf,
            KeltnerUpper => self.keltner.map(|c| c.upper),
            KeltnerMiddle => self.keltner.map(|c| c.middle),
            KeltnerLower => self.keltner.map(|c| c.lower),
            DonchianUpper => self.donchian.map(|c| c.upper),
            DonchianMiddle => self.donchian.map(|c| c.middle),
            DonchianLower => self.donchian.map(|c| c.lower),
            High52w => self.range_52w.map(|r| r.high),
            Low52w => self.range_52w.map(|r| r.low),
            High52wRatio => self.range_52w.map(|r| r.high_ratio),
            Low52wRatio => self.range_52w.map(|r| r.low_ratio),
        }
    }

    /// Number of scalar readings that are available.
    pub fn available_count(&self) -> usize {
        IndicatorName::ALL
            .iter()
            .filter(|&&name| self.value(name).is_some())
            .count()
    }
}

/// Compute every indicator's latest value for `bars`.
///
/// The series is assumed validated (finite, positive prices, ascending).
pub fn compute_indicators(bars: &[Bar], backend: &dyn IndicatorBackend) -> IndicatorSet {
    let cols = Columns::from_bars(bars);
    let close = cols.close.last().copied();

    let bollinger = calculate_bollinger(backend, &cols.close, BOLLINGER_PERIOD, BOLLINGER_STD);
    let bb_position = bollinger.zip(close).and_then(|(b, c)| b.position(c));

    let atr = calculate_atr(bars, ATR_PERIOD);
    let atr_pct = atr.zip(close).and_then(|(a, c)| atr_pct(a, c));

    IndicatorSet {
        close,

        sma_5: current_sma(backend, &cols.close, 5),
        sma_20: current_sma(backend, &cols.close, 20),
        sma_60: current_sma(backend, &cols.close, 60),
        sma_120: current_sma(backend, &cols.close, 120),
        sma_200: current_sma(backend, &cols.close, 200),
        ema_12: current_ema(&cols.close, 12),
        ema_26: current_ema(&cols.close, 26),

        rsi: current_rsi(&cols.close, RSI_PERIOD),
        macd: current_macd(&cols.close),
        bollinger,
        bb_position,
        stochastic: calculate_stochastic(
            backend,
            &cols.high,
            &cols.low,
            &cols.close,
            STOCH_K_PERIOD,
            STOCH_D_PERIOD,
        ),
        williams_r: calculate_williams_r(backend, &cols.high, &cols.low, &cols.close, WILLIAMS_PERIOD),
        cci: calculate_cci(backend, &cols.typical, CCI_PERIOD),

        adx: calculate_adx(bars, ADX_PERIOD),
        parabolic_sar: current_sar(bars),

        atr,
        atr_pct,

        obv: current_obv(&cols.close, &cols.volume),
        vwap: calculate_vwap(backend, &cols.typical, &cols.volume, VWAP_PERIOD),
        cmf: calculate_cmf(backend, bars, CMF_PERIOD),

        keltner: calculate_keltner(bars, &cols.close, CHANNEL_PERIOD, KELTNER_MULTIPLIER),
        donchian: calculate_donchian(backend, &cols.high, &cols.low, CHANNEL_PERIOD),
        range_52w: calculate_52w_range(backend, &cols.high, &cols.low, &cols.close),
    }
}
