//! MACD, streaming.
//!
//! line = EMA(fast) - EMA(slow), signal = EMA(line, signal_period),
//! histogram = line - signal.
//! Lookback: (slow - 1) + (signal - 1).

use super::{Ema, Indicator};
use crate::domain::Candle;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdValue {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: Ema,
    slow: Ema,
    signal: Ema,
    lookback: usize,
    name: String,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        assert!(fast >= 1 && slow >= 1 && signal >= 1, "MACD periods must be >= 1");
        assert!(fast < slow, "MACD fast period must be shorter than slow");
        Self {
            fast: Ema::new(fast),
            slow: Ema::new(slow),
            signal: Ema::new(signal),
            lookback: (slow - 1) + (signal - 1),
            name: format!("macd_{fast}_{slow}_{signal}"),
        }
    }
}

impl Default for Macd {
    fn default() -> Self {
        Self::new(12, 26, 9)
    }
}

impl Indicator for Macd {
    type Output = MacdValue;

    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.lookback
    }

    fn update(&mut self, candle: &Candle) -> Option<MacdValue> {
        let fast = self.fast.update(candle);
        let slow = self.slow.update(candle)?;
        let line = fast? - slow;
        let signal = self.signal.update_value(line)?;
        Some(MacdValue {
            line,
            signal,
            histogram: line - signal,
        })
    }
}
