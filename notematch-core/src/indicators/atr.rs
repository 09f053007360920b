//! Average True Range (ATR), streaming.
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|); the first
//! candle has no previous close and uses high-low.
//! ATR uses Wilder smoothing (alpha = 1/period), seeded with the mean of the
//! first `period` true ranges.
//! Lookback: period - 1.

use super::Indicator;
use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    prev_close: Option<f64>,
    seed_sum: f64,
    seen: usize,
    current: Option<f64>,
    name: String,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self {
            period,
            prev_close: None,
            seed_sum: 0.0,
            seen: 0,
            current: None,
            name: format!("atr_{period}"),
        }
    }

    pub fn value(&self) -> Option<f64> {
        self.current
    }
}

/// True range of `candle` given the previous close, if any.
pub fn true_range(candle: &Candle, prev_close: Option<f64>) -> f64 {
    let hl = candle.high - candle.low;
    match prev_close {
        Some(pc) => hl
            .max((candle.high - pc).abs())
            .max((candle.low - pc).abs()),
        None => hl,
    }
}

impl Indicator for Atr {
    type Output = f64;

    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn update(&mut self, candle: &Candle) -> Option<f64> {
        if candle.is_void() {
            return self.current;
        }
        let tr = true_range(candle, self.prev_close);
        self.prev_close = Some(candle.close);

        match self.current {
            Some(prev) => {
                let alpha = 1.0 / self.period as f64;
                self.current = Some(alpha * tr + (1.0 - alpha) * prev);
            }
            None => {
                self.seed_sum += tr;
                self.seen += 1;
                if self.seen == self.period {
                    self.current = Some(self.seed_sum / self.period as f64);
                }
            }
        }
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_candles, DEFAULT_EPSILON};

    #[test]
    fn true_range_uses_gap() {
        let candles = make_candles(&[100.0, 110.0]);
        // second candle: open 100, close 110 → high 111, low 99; prev close 100
        let tr = true_range(&candles[1], Some(100.0));
        assert_approx(tr, 12.0, DEFAULT_EPSILON);
        assert_approx(true_range(&candles[0], None), 2.0, DEFAULT_EPSILON);
    }

    #[test]
    fn atr_constant_range() {
        let mut atr = Atr::new(3);
        let mut last = None;
        for c in make_candles(&[100.0; 10]) {
            last = atr.update(&c);
        }
        // flat closes: every candle spans close ± 1
        assert_approx(last.unwrap(), 2.0, DEFAULT_EPSILON);
    }

    #[test]
    fn atr_warmup() {
        let mut atr = Atr::new(3);
        let candles = make_candles(&[100.0, 101.0, 102.0]);
        assert_eq!(atr.update(&candles[0]), None);
        assert_eq!(atr.update(&candles[1]), None);
        assert!(atr.update(&candles[2]).is_some());
    }
}
