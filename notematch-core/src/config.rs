//! Injectable engine configuration.
//!
//! Every tunable constant used by the builder, the evaluator and the rule
//! layer lives here. `Default` carries the documented values; missing fields in
//! a serialized config fall back to those defaults field by field.

use serde::{Deserialize, Serialize};

/// Top-level configuration passed to the builder, evaluator and rule layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub tiers: TierThresholds,
    pub features: FeatureConfig,
    pub rules: RuleWeights,
}

/// Similarity tier boundaries (inclusive lower bounds).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    pub strong: f64,
    pub medium: f64,
    pub weak: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            strong: 0.90,
            medium: 0.80,
            weak: 0.70,
        }
    }
}

/// Normalization constants for the feature builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// MACD histogram divisor before `tanh`.
    pub macd_scale: f64,
    /// Bandwidth (fraction of price) that maps to 1.0. Wider bands saturate.
    pub bandwidth_ceiling: f64,
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    /// Body/range ratio below which a candle is a doji.
    pub doji_threshold: f64,
    /// MA slope (percent per candle) that maps to full trend direction/strength.
    pub slope_saturation: f64,
    /// ATR/price ratio that maps to full trend strength when slope is missing.
    pub atr_reference: f64,
    /// |price - MA| / MA that maps to full trend strength when slope and ATR are missing.
    pub ma_deviation_reference: f64,
    pub session: SessionHours,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            macd_scale: 50.0,
            bandwidth_ceiling: 0.05,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            doji_threshold: 0.1,
            slope_saturation: 0.1,
            atr_reference: 0.02,
            ma_deviation_reference: 0.05,
            session: SessionHours::default(),
        }
    }
}

/// UTC hour boundaries for the session flag.
///
/// `[new_york_close, london_open)` is the Tokyo bucket (wrapping midnight),
/// `[london_open, new_york_open)` London, `[new_york_open, new_york_close)` the
/// London/New York overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionHours {
    pub london_open: u32,
    pub new_york_open: u32,
    pub new_york_close: u32,
}

impl Default for SessionHours {
    fn default() -> Self {
        Self {
            london_open: 7,
            new_york_open: 13,
            new_york_close: 22,
        }
    }
}

/// Weights of the rule confirmation composite score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleWeights {
    pub similarity: f64,
    pub trend: f64,
    pub price_range: f64,
    /// Max |close - entry| / entry for the price-range check (exclusive).
    pub price_tolerance: f64,
    /// |trend direction| at or below this is labelled `range`.
    pub trend_dead_zone: f64,
}

impl Default for RuleWeights {
    fn default() -> Self {
        Self {
            similarity: 0.6,
            trend: 0.3,
            price_range: 0.1,
            price_tolerance: 0.05,
            trend_dead_zone: 0.2,
        }
    }
}
