//! Small categorical types shared across the engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Trade direction of an anchor pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// +1 for buy, -1 for sell.
    pub fn sign(self) -> f64 {
        match self {
            Side::Buy => 1.0,
            Side::Sell => -1.0,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

/// Candle timeframe the anchor was recorded on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Timeframe {
    M1,
    M5,
    M15,
    M30,
    H1,
    H4,
    D1,
}

impl Timeframe {
    pub fn minutes(self) -> i64 {
        match self {
            Timeframe::M1 => 1,
            Timeframe::M5 => 5,
            Timeframe::M15 => 15,
            Timeframe::M30 => 30,
            Timeframe::H1 => 60,
            Timeframe::H4 => 240,
            Timeframe::D1 => 1440,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Timeframe::M1 => "M1",
            Timeframe::M5 => "M5",
            Timeframe::M15 => "M15",
            Timeframe::M30 => "M30",
            Timeframe::H1 => "H1",
            Timeframe::H4 => "H4",
            Timeframe::D1 => "D1",
        };
        f.write_str(s)
    }
}

/// Coarse trend label, compared for equality by the rule confirmation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendLabel {
    Up,
    Down,
    Range,
}

impl TrendLabel {
    /// Direction implied by the label: +1, -1 or 0.
    pub fn direction(self) -> f64 {
        match self {
            TrendLabel::Up => 1.0,
            TrendLabel::Down => -1.0,
            TrendLabel::Range => 0.0,
        }
    }

    /// Classify a trend-direction value in [-1, 1]. Values inside the dead
    /// zone are `Range`. Returns `None` for non-finite input.
    pub fn from_direction(direction: f64, dead_zone: f64) -> Option<Self> {
        if !direction.is_finite() {
            return None;
        }
        Some(if direction > dead_zone {
            TrendLabel::Up
        } else if direction < -dead_zone {
            TrendLabel::Down
        } else {
            TrendLabel::Range
        })
    }
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendLabel::Up => write!(f, "up"),
            TrendLabel::Down => write!(f, "down"),
            TrendLabel::Range => write!(f, "range"),
        }
    }
}

/// MACD crossover state at the observed candle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MacdCross {
    Bullish,
    Bearish,
    None,
}

impl MacdCross {
    pub fn encode(self) -> f64 {
        match self {
            MacdCross::Bearish => 0.0,
            MacdCross::None => 0.5,
            MacdCross::Bullish => 1.0,
        }
    }
}

/// RSI zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsiZone {
    Oversold,
    Neutral,
    Overbought,
}

impl RsiZone {
    pub fn encode(self) -> f64 {
        match self {
            RsiZone::Oversold => 0.0,
            RsiZone::Neutral => 0.5,
            RsiZone::Overbought => 1.0,
        }
    }

    /// Zone for a raw RSI value: `>= overbought` and `<= oversold` are inclusive.
    pub fn from_rsi(rsi: f64, overbought: f64, oversold: f64) -> Self {
        if rsi >= overbought {
            RsiZone::Overbought
        } else if rsi <= oversold {
            RsiZone::Oversold
        } else {
            RsiZone::Neutral
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_wire_names() {
        assert_eq!(serde_json::to_string(&Side::Buy).unwrap(), "\"buy\"");
        let side: Side = serde_json::from_str("\"sell\"").unwrap();
        assert_eq!(side, Side::Sell);
        assert_eq!(side.sign(), -1.0);
    }

    #[test]
    fn timeframe_minutes() {
        assert_eq!(Timeframe::M15.minutes(), 15);
        assert_eq!(Timeframe::H4.minutes(), 240);
        let tf: Timeframe = serde_json::from_str("\"H1\"").unwrap();
        assert_eq!(tf, Timeframe::H1);
    }

    #[test]
    fn trend_label_dead_zone() {
        assert_eq!(TrendLabel::from_direction(0.5, 0.2), Some(TrendLabel::Up));
        assert_eq!(TrendLabel::from_direction(-0.5, 0.2), Some(TrendLabel::Down));
        assert_eq!(TrendLabel::from_direction(0.2, 0.2), Some(TrendLabel::Range));
        assert_eq!(TrendLabel::from_direction(f64::NAN, 0.2), None);
    }

    #[test]
    fn rsi_zone_thresholds_inclusive() {
        assert_eq!(RsiZone::from_rsi(70.0, 70.0, 30.0), RsiZone::Overbought);
        assert_eq!(RsiZone::from_rsi(30.0, 70.0, 30.0), RsiZone::Oversold);
        assert_eq!(RsiZone::from_rsi(50.0, 70.0, 30.0), RsiZone::Neutral);
    }

    #[test]
    fn categorical_encodings() {
        assert_eq!(MacdCross::Bearish.encode(), 0.0);
        assert_eq!(MacdCross::None.encode(), 0.5);
        assert_eq!(MacdCross::Bullish.encode(), 1.0);
        assert_eq!(RsiZone::Oversold.encode(), 0.0);
        assert_eq!(RsiZone::Overbought.encode(), 1.0);
    }
}
