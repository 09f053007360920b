//! Streaming indicators used to derive feature vectors from raw candles
//! during backtests.
//!
//! Each indicator consumes one candle at a time and returns `None` until its
//! warmup is complete. [`IndicatorTracker`] composes them into the
//! [`IndicatorReading`](crate::features::IndicatorReading) the feature builder
//! understands.

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod tracker;

pub use atr::Atr;
pub use bollinger::{Bollinger, BollingerValue};
pub use ema::Ema;
pub use macd::{Macd, MacdValue};
pub use rsi::Rsi;
pub use sma::Sma;
pub use tracker::{IndicatorTracker, TrackerConfig};

use crate::domain::Candle;

/// Streaming indicator.
///
/// # Look-ahead contamination guard
/// The value returned for candle t may only depend on candles up to and
/// including t. Every indicator must pass the truncated-vs-full series test.
pub trait Indicator: Send + Sync {
    type Output;

    /// Human-readable name (e.g., "sma_20", "atr_14").
    fn name(&self) -> &str;

    /// Number of candles consumed before the first value is produced.
    fn lookback(&self) -> usize;

    /// Consume the next candle.
    fn update(&mut self, candle: &Candle) -> Option<Self::Output>;

    /// Feed a whole series, collecting one output per candle.
    fn series(&mut self, candles: &[Candle]) -> Vec<Option<Self::Output>> {
        candles.iter().map(|c| self.update(c)).collect()
    }
}

/// Create synthetic candles from close prices for testing.
///
/// Generates plausible OHLC: open = prev_close (or close for first candle),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000,
/// one candle per minute from 2024-01-02 00:00 UTC.
#[cfg(test)]
pub fn make_candles(closes: &[f64]) -> Vec<Candle> {
    use chrono::{TimeZone, Utc};
    let base = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Candle {
                timestamp: base + chrono::Duration::minutes(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

#[cfg(test)]
mod tests {
    use super::*;

    fn zigzag(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0 + i as f64 * 0.1)
            .collect()
    }

    fn assert_no_lookahead<I, F>(make: F)
    where
        I: Indicator,
        I::Output: PartialEq + std::fmt::Debug,
        F: Fn() -> I,
    {
        let candles = make_candles(&zigzag(80));
        let full = make().series(&candles);
        for cut in [10, 30, 55, 79] {
            let truncated = make().series(&candles[..cut]);
            assert_eq!(&full[..cut], &truncated[..], "lookahead detected at cut {cut}");
        }
    }

    #[test]
    fn indicators_are_causal() {
        assert_no_lookahead(|| Sma::new(20));
        assert_no_lookahead(|| Ema::new(12));
        assert_no_lookahead(|| Rsi::new(14));
        assert_no_lookahead(|| Atr::new(14));
        assert_no_lookahead(|| Bollinger::new(20, 2.0));
        assert_no_lookahead(Macd::default);
    }

    #[test]
    fn lookback_matches_first_value() {
        let candles = make_candles(&zigzag(60));
        let mut rsi = Rsi::new(14);
        let lookback = rsi.lookback();
        let out = rsi.series(&candles);
        assert!(out[..lookback].iter().all(Option::is_none));
        assert!(out[lookback].is_some());

        let mut macd = Macd::default();
        let lookback = macd.lookback();
        let out = macd.series(&candles);
        assert!(out[..lookback].iter().all(Option::is_none));
        assert!(out[lookback].is_some());
    }
}
