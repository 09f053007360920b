//! Bollinger Bands, streaming.
//!
//! - Middle: SMA(close, period)
//! - Upper: middle + mult * stddev(close, period)
//! - Lower: middle - mult * stddev(close, period)
//!
//! Uses population stddev (divide by N).
//! Lookback: period - 1.

use super::{Indicator, Sma};
use crate::domain::Candle;

/// All three bands plus the derived position and width for one candle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerValue {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    /// (close - lower) / (upper - lower); 0.5 when the bands collapse.
    pub percent_b: f64,
    /// (upper - lower) / middle; `None` when middle is zero.
    pub bandwidth: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    multiplier: f64,
    sma: Sma,
    name: String,
}

impl Bollinger {
    pub fn new(period: usize, multiplier: f64) -> Self {
        assert!(period >= 1, "Bollinger period must be >= 1");
        Self {
            multiplier,
            sma: Sma::new(period),
            name: format!("bollinger_{period}_{multiplier}"),
        }
    }
}

impl Indicator for Bollinger {
    type Output = BollingerValue;

    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.sma.lookback()
    }

    fn update(&mut self, candle: &Candle) -> Option<BollingerValue> {
        let middle = self.sma.update_value(candle.close)?;
        let (sum_sq, n) = self
            .sma
            .window()
            .fold((0.0, 0usize), |(acc, n), x| (acc + (x - middle).powi(2), n + 1));
        let stddev = (sum_sq / n as f64).sqrt();

        let upper = middle + self.multiplier * stddev;
        let lower = middle - self.multiplier * stddev;
        let width = upper - lower;
        let percent_b = if width > 0.0 {
            (candle.close - lower) / width
        } else {
            0.5
        };
        let bandwidth = (middle != 0.0).then(|| width / middle);

        Some(BollingerValue {
            upper,
            middle,
            lower,
            percent_b,
            bandwidth,
        })
    }
}
