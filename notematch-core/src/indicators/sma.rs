//! Simple Moving Average (SMA), streaming.
//!
//! Rolling mean of close prices over a fixed window.
//! Lookback: period - 1 (first value on the `period`-th candle).

use std::collections::VecDeque;

use super::Indicator;
use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    window: VecDeque<f64>,
    sum: f64,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            window: VecDeque::with_capacity(period),
            sum: 0.0,
            name: format!("sma_{period}"),
        }
    }

    /// Feed a raw value. Non-finite values are ignored.
    pub fn update_value(&mut self, value: f64) -> Option<f64> {
        if value.is_finite() {
            self.window.push_back(value);
            self.sum += value;
            if self.window.len() > self.period {
                if let Some(leaving) = self.window.pop_front() {
                    self.sum -= leaving;
                }
            }
        }
        self.value()
    }

    pub fn value(&self) -> Option<f64> {
        (self.window.len() == self.period).then(|| self.sum / self.period as f64)
    }

    /// Values currently in the window, oldest first.
    pub fn window(&self) -> impl Iterator<Item = &f64> {
        self.window.iter()
    }
}

impl Indicator for Sma {
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
