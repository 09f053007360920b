//! BacktestEvent: one simulated round trip, entry → exit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::labels::Side;

/// How a simulated position ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Take-profit reached.
    Win,
    /// Stop-loss reached.
    Loss,
    /// Max holding time elapsed, or the series ended with the position open.
    Timeout,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Win => write!(f, "win"),
            Outcome::Loss => write!(f, "loss"),
            Outcome::Timeout => write!(f, "timeout"),
        }
    }
}

/// A completed simulated trade. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestEvent {
    pub side: Side,
    pub entry_time: DateTime<Utc>,
    pub entry_price: f64,
    pub match_score_at_entry: f64,
    pub exit_time: DateTime<Utc>,
    pub exit_price: f64,
    pub outcome: Outcome,
    /// Net of round-trip cost, in percent.
    pub pnl_percent: f64,
    pub holding_minutes: i64,
}

impl BacktestEvent {
    pub fn is_profitable(&self) -> bool {
        self.pnl_percent > 0.0
    }
}

/// Side-adjusted percent return minus round-trip cost (`2 × cost_percent`).
pub fn pnl_percent(side: Side, entry_price: f64, exit_price: f64, cost_percent: f64) -> f64 {
    if entry_price <= 0.0 || !entry_price.is_finite() {
        return 0.0;
    }
    let gross = side.sign() * (exit_price - entry_price) / entry_price * 100.0;
    gross - 2.0 * cost_percent
}
