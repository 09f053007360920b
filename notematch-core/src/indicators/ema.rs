//! Exponential Moving Average (EMA), streaming.
//!
//! Recursive: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (period + 1).
//! Seed: SMA of the first `period` values.
//! Lookback: period - 1.

use super::Indicator;
use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    alpha: f64,
    seed_sum: f64,
    seen: usize,
    current: Option<f64>,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            alpha: 2.0 / (period as f64 + 1.0),
            seed_sum: 0.0,
            seen: 0,
            current: None,
            name: format!("ema_{period}"),
        }
    }

    /// Feed a raw value (close, MACD line, ...). Non-finite values are ignored.
    pub fn update_value(&mut self, value: f64) -> Option<f64> {
        if !value.is_finite() {
            return self.current;
        }
        match self.current {
            Some(prev) => {
                self.current = Some(self.alpha * value + (1.0 - self.alpha) * prev);
            }
            None => {
                self.seed_sum += value;
                self.seen += 1;
                if self.seen == self.period {
                    self.current = Some(self.seed_sum / self.period as f64);
                }
            }
        }
        self.current
    }

    pub fn value(&self) -> Option<f64> {
        self.current
    }
}

impl Indicator for Ema {
    type Output = f64;

    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn update(&mut self, candle: &Candle) -> Option<f64> {
        self.update_value(candle.close)
    }
}
