//! Per-run backtest parameters.

use serde::{Deserialize, Serialize};

use crate::error::ParamError;
use crate::indicators::TrackerConfig;

/// Which number is compared against `match_threshold` on each flat candle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryScore {
    /// Raw cosine similarity between anchor and market vector.
    #[default]
    Cosine,
    /// Rule-confirmed composite score (similarity, trend, price range).
    Composite,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestParams {
    /// Enter when the entry score is >= this value.
    pub match_threshold: f64,
    /// Take-profit distance from entry, percent. Zero disables.
    pub take_profit_pct: f64,
    /// Stop-loss distance from entry, percent. Zero disables.
    pub stop_loss_pct: f64,
    pub max_holding_minutes: i64,
    /// One-way trading cost, percent. Charged twice per round trip.
    pub cost_percent: f64,
    /// Candles to feed the indicators before entries are allowed.
    pub warmup_candles: usize,
    pub entry_score: EntryScore,
    pub indicators: TrackerConfig,
}

impl Default for BacktestParams {
    fn default() -> Self {
        Self {
            match_threshold: 0.80,
            take_profit_pct: 2.0,
            stop_loss_pct: 1.0,
            max_holding_minutes: 240,
            cost_percent: 0.0,
            warmup_candles: 0,
            entry_score: EntryScore::Cosine,
            indicators: TrackerConfig::default(),
        }
    }
}

impl BacktestParams {
    pub fn validate(&self) -> Result<(), ParamError> {
        if !(-1.0..=1.0).contains(&self.match_threshold) {
            return Err(ParamError::MatchThreshold(self.match_threshold));
        }
        for (name, value) in [
            ("take_profit_pct", self.take_profit_pct),
            ("stop_loss_pct", self.stop_loss_pct),
            ("cost_percent", self.cost_percent),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ParamError::Percentage { name, value });
            }
        }
        if self.max_holding_minutes <= 0 {
            return Err(ParamError::MaxHolding(self.max_holding_minutes));
        }

        let ind = &self.indicators;
        for (name, period) in [
            ("ma_period", ind.ma_period),
            ("rsi_period", ind.rsi_period),
            ("atr_period", ind.atr_period),
            ("bb_period", ind.bb_period),
            ("macd_fast", ind.macd_fast),
            ("macd_slow", ind.macd_slow),
            ("macd_signal", ind.macd_signal),
        ] {
            if period == 0 {
                return Err(ParamError::Period { name });
            }
        }
        if ind.macd_fast >= ind.macd_slow {
            return Err(ParamError::MacdPeriods {
                fast: ind.macd_fast,
                slow: ind.macd_slow,
            });
        }
        Ok(())
    }

    /// Take-profit price for a position, or `None` when disabled.
    pub(crate) fn take_profit_price(&self, entry_price: f64, sign: f64) -> Option<f64> {
        (self.take_profit_pct > 0.0)
            .then(|| entry_price * (1.0 + sign * self.take_profit_pct / 100.0))
    }

    /// Stop-loss price for a position, or `None` when disabled.
    pub(crate) fn stop_loss_price(&self, entry_price: f64, sign: f64) -> Option<f64> {
        (self.stop_loss_pct > 0.0).then(|| entry_price * (1.0 - sign * self.stop_loss_pct / 100.0))
    }
}
