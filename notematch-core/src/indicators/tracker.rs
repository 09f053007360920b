//! IndicatorTracker: composes the streaming indicators into one
//! [`IndicatorReading`] per candle.
//!
//! Strictly causal: the reading for candle `t` depends only on candles `0..=t`.
//! Values still in warmup are `None`, which the feature builder maps to its
//! neutral defaults.

use serde::{Deserialize, Serialize};

use super::{Atr, Bollinger, Indicator, Macd, Rsi, Sma};
use crate::domain::{Candle, MacdCross};
use crate::features::IndicatorReading;

/// Periods for the indicators tracked during a backtest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub ma_period: usize,
    pub rsi_period: usize,
    pub atr_period: usize,
    pub bb_period: usize,
    pub bb_multiplier: f64,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            ma_period: 20,
            rsi_period: 14,
            atr_period: 14,
            bb_period: 20,
            bb_multiplier: 2.0,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
        }
    }
}

impl TrackerConfig {
    /// Candles needed before every tracked indicator has a value.
    pub fn warmup(&self) -> usize {
        let macd = (self.macd_slow.saturating_sub(1)) + (self.macd_signal.saturating_sub(1));
        // +1: the MA slope needs the previous MA value as well
        [
            self.ma_period,
            self.rsi_period,
            self.atr_period.saturating_sub(1),
            self.bb_period.saturating_sub(1),
            macd,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
            + 1
    }
}

#[derive(Debug, Clone)]
pub struct IndicatorTracker {
    ma: Sma,
    rsi: Rsi,
    atr: Atr,
    bollinger: Bollinger,
    macd: Macd,
    prev_ma: Option<f64>,
    prev_spread: Option<f64>,
    candles_seen: usize,
}

impl IndicatorTracker {
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            ma: Sma::new(config.ma_period),
            rsi: Rsi::new(config.rsi_period),
            atr: Atr::new(config.atr_period),
            bollinger: Bollinger::new(config.bb_period, config.bb_multiplier),
            macd: Macd::new(config.macd_fast, config.macd_slow, config.macd_signal),
            prev_ma: None,
            prev_spread: None,
            candles_seen: 0,
        }
    }

    pub fn candles_seen(&self) -> usize {
        self.candles_seen
    }

    /// Advance every indicator by one candle and return the reading for it.
    pub fn update(&mut self, candle: &Candle) -> IndicatorReading {
        self.candles_seen += 1;

        let ma = self.ma.update(candle);
        let ma_slope_pct = match (ma, self.prev_ma) {
            (Some(now), Some(prev)) if prev != 0.0 => Some((now - prev) / prev * 100.0),
            _ => None,
        };
        if ma.is_some() {
            self.prev_ma = ma;
        }

        let rsi = self.rsi.update(candle);
        let atr = self.atr.update(candle);
        let bb = self.bollinger.update(candle);

        let macd = self.macd.update(candle);
        let macd_cross = macd.map(|m| {
            let spread = m.line - m.signal;
            let cross = match self.prev_spread {
                Some(prev) if prev <= 0.0 && spread > 0.0 => MacdCross::Bullish,
                Some(prev) if prev >= 0.0 && spread < 0.0 => MacdCross::Bearish,
                _ => MacdCross::None,
            };
            self.prev_spread = Some(spread);
            cross
        });

        IndicatorReading {
            trend: None,
            ma_value: ma,
            ma_slope_pct,
            atr,
            macd_histogram: macd.map(|m| m.histogram),
            macd_cross,
            rsi,
            rsi_zone: None,
            bb_percent_b: bb.map(|b| b.percent_b),
            bb_upper: bb.map(|b| b.upper),
            bb_middle: bb.map(|b| b.middle),
            bb_lower: bb.map(|b| b.lower),
            bb_bandwidth: bb.and_then(|b| b.bandwidth),
        }
    }
}

impl Default for IndicatorTracker {
    fn default() -> Self {
        Self::new(&TrackerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_candles;

    fn small() -> TrackerConfig {
        TrackerConfig {
            ma_period: 3,
            rsi_period: 3,
            atr_period: 3,
            bb_period: 3,
            bb_multiplier: 2.0,
            macd_fast: 2,
            macd_slow: 3,
            macd_signal: 2,
        }
    }

    #[test]
    fn first_candle_reading_is_empty() {
        let mut tracker = IndicatorTracker::new(&small());
        let reading = tracker.update(&make_candles(&[100.0])[0]);
        assert_eq!(reading, IndicatorReading::default());
    }

    #[test]
    fn all_fields_populated_after_warmup() {
        let config = small();
        let closes: Vec<f64> = (0..config.warmup()).map(|i| 100.0 + i as f64).collect();
        let mut tracker = IndicatorTracker::new(&config);
        let mut last = IndicatorReading::default();
        for c in make_candles(&closes) {
            last = tracker.update(&c);
        }
        assert!(last.ma_value.is_some());
        assert!(last.ma_slope_pct.unwrap() > 0.0);
        assert!(last.rsi.is_some());
        assert!(last.atr.is_some());
        assert!(last.macd_histogram.is_some());
        assert!(last.macd_cross.is_some());
        assert!(last.bb_percent_b.is_some());
        assert!(last.bb_bandwidth.is_some());
        assert_eq!(tracker.candles_seen(), closes.len());
    }

    #[test]
    fn macd_cross_detected_on_reversal() {
        let mut closes: Vec<f64> = (0..12).map(|i| 100.0 - i as f64).collect();
        closes.extend((0..12).map(|i| 89.0 + 3.0 * i as f64));
        let mut tracker = IndicatorTracker::new(&small());
        let crosses: Vec<_> = make_candles(&closes)
            .iter()
            .map(|c| tracker.update(c).macd_cross)
            .collect();
        assert!(crosses.contains(&Some(MacdCross::Bullish)));
    }

    #[test]
    fn default_warmup_covers_macd() {
        // 25 + 8 + 1
        assert_eq!(TrackerConfig::default().warmup(), 34);
    }
}
