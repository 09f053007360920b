//! Candle: one OHLCV observation for a single symbol and timeframe tick.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::features::IndicatorReading;

/// OHLCV candle.
///
/// Produced externally per timeframe tick. The core never mutates a candle; it
/// reads prices for feature extraction and for exit checks during backtests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl Candle {
    /// Returns true if any OHLC field is NaN or infinite.
    pub fn is_void(&self) -> bool {
        !(self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite())
    }

    /// Basic OHLC sanity check: high >= low, high >= open, high >= close, etc.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.close > 0.0
    }

    /// High minus low. Zero for a flat candle.
    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

/// A candle plus whatever indicator readings the caller already has for it.
///
/// Used for live matching, where the surrounding system supplies indicators
/// computed by its own pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketObservation {
    pub candle: Candle,
    #[serde(default)]
    pub indicators: IndicatorReading,
}

impl MarketObservation {
    pub fn new(candle: Candle, indicators: IndicatorReading) -> Self {
        Self { candle, indicators }
    }

    /// Observation with no indicators: every indicator-derived dimension falls
    /// back to its neutral default.
    pub fn bare(candle: Candle) -> Self {
        Self {
            candle,
            indicators: IndicatorReading::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_candle() -> Candle {
        Candle {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap(),
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 103.0,
            volume: 50_000.0,
        }
    }

    #[test]
    fn candle_is_sane() {
        assert!(sample_candle().is_sane());
    }

    #[test]
    fn candle_detects_void() {
        let mut candle = sample_candle();
        candle.close = f64::INFINITY;
        assert!(candle.is_void());
        assert!(!candle.is_sane());
    }

    #[test]
    fn candle_detects_inverted_range() {
        let mut candle = sample_candle();
        candle.high = 97.0;
        assert!(!candle.is_sane());
    }

    #[test]
    fn volume_defaults_when_missing() {
        let json = r#"{"timestamp":"2024-01-02T09:00:00Z","open":1.0,"high":2.0,"low":0.5,"close":1.5}"#;
        let candle: Candle = serde_json::from_str(json).unwrap();
        assert_eq!(candle.volume, 0.0);
        assert_eq!(candle.range(), 1.5);
    }
}
