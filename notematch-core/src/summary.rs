//! Result aggregation: pure reduction of a backtest event list.
//!
//! Every statistic is a pure function of the event slice. The summary keeps no
//! state of its own; it is recomputed, never incrementally maintained.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::{BacktestEvent, Outcome};

/// Aggregate statistics for one backtest run. All percentages are in
/// percentage points of the entry price, the same unit as
/// [`BacktestEvent::pnl_percent`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BacktestSummary {
    pub setup_count: usize,
    pub win_count: usize,
    pub loss_count: usize,
    pub timeout_count: usize,
    /// wins / setups, in [0, 1].
    pub win_rate: f64,
    /// Gross profit / gross loss. `+inf` only when there are profits and no
    /// losses; serialized as the string `"inf"`.
    #[serde(
        serialize_with = "serialize_profit_factor",
        deserialize_with = "deserialize_profit_factor"
    )]
    pub profit_factor: f64,
    /// Sum of positive pnl.
    pub total_profit: f64,
    /// Sum of |negative pnl|.
    pub total_loss: f64,
    pub average_pnl: f64,
    pub average_win: f64,
    pub average_loss: f64,
    pub expectancy: f64,
    /// Largest peak-to-trough fall of cumulative pnl, as a positive number.
    pub max_drawdown: f64,
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,
}

impl BacktestSummary {
    pub fn from_events(events: &[BacktestEvent]) -> Self {
        ResultAggregator::summarize(events)
    }
}

/// Reduces an event list into a [`BacktestSummary`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultAggregator;

impl ResultAggregator {
    pub fn summarize(events: &[BacktestEvent]) -> BacktestSummary {
        if events.is_empty() {
            return BacktestSummary::default();
        }

        let win_count = count_outcome(events, Outcome::Win);
        let loss_count = count_outcome(events, Outcome::Loss);
        let timeout_count = count_outcome(events, Outcome::Timeout);
        let win_rate = win_count as f64 / events.len() as f64;

        let average_win = mean(events.iter().map(|e| e.pnl_percent).filter(|p| *p > 0.0));
        let average_loss = mean(
            events
                .iter()
                .map(|e| e.pnl_percent)
                .filter(|p| *p < 0.0)
                .map(f64::abs),
        );

        BacktestSummary {
            setup_count: events.len(),
            win_count,
            loss_count,
            timeout_count,
            win_rate,
            profit_factor: profit_factor(events),
            total_profit: gross_profit(events),
            total_loss: gross_loss(events),
            average_pnl: mean(events.iter().map(|e| e.pnl_percent)),
            average_win,
            average_loss,
            expectancy: win_rate * average_win - (1.0 - win_rate) * average_loss,
            max_drawdown: max_drawdown(events),
            max_consecutive_wins: max_consecutive(events, Outcome::Win),
            max_consecutive_losses: max_consecutive(events, Outcome::Loss),
        }
    }
}

// ─── Individual statistics ──────────────────────────────────────────

/// Sum of positive pnl.
pub fn gross_profit(events: &[BacktestEvent]) -> f64 {
    events
        .iter()
        .map(|e| e.pnl_percent)
        .filter(|p| *p > 0.0)
        .sum()
}

/// Sum of |negative pnl|.
pub fn gross_loss(events: &[BacktestEvent]) -> f64 {
    events
        .iter()
        .map(|e| e.pnl_percent)
        .filter(|p| *p < 0.0)
        .map(f64::abs)
        .sum()
}

/// Gross profit / gross loss.
///
/// `+inf` when gross loss is zero and gross profit positive, 0.0 when both are zero.
pub fn profit_factor(events: &[BacktestEvent]) -> f64 {
    let profit = gross_profit(events);
    let loss = gross_loss(events);
    if loss == 0.0 {
        return if profit > 0.0 { f64::INFINITY } else { 0.0 };
    }
    profit / loss
}

/// Peak-to-trough scan over cumulative pnl, in event order. The curve starts
/// at zero, so a first losing trade is already a drawdown.
pub fn max_drawdown(events: &[BacktestEvent]) -> f64 {
    let mut cumulative = 0.0_f64;
    let mut peak = 0.0_f64;
    let mut max_dd = 0.0_f64;

    for event in events {
        cumulative += event.pnl_percent;
        if cumulative > peak {
            peak = cumulative;
        }
        max_dd = max_dd.max(peak - cumulative);
    }
    max_dd
}

/// Longest run of consecutive events with the given outcome. Any other
/// outcome, timeouts included, breaks the streak.
pub fn max_consecutive(events: &[BacktestEvent], outcome: Outcome) -> usize {
    let mut max_streak = 0;
    let mut current = 0;

    for event in events {
        if event.outcome == outcome {
            current += 1;
            max_streak = max_streak.max(current);
        } else {
            current = 0;
        }
    }
    max_streak
}

fn count_outcome(events: &[BacktestEvent], outcome: Outcome) -> usize {
    events.iter().filter(|e| e.outcome == outcome).count()
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

// ─── Serde helpers ──────────────────────────────────────────────────

fn serialize_profit_factor<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_infinite() && value.is_sign_positive() {
        serializer.serialize_str("inf")
    } else {
        serializer.serialize_f64(*value)
    }
}

fn deserialize_profit_factor<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Number(f64),
        Text(String),
    }

    match Wire::deserialize(deserializer)? {
        Wire::Number(v) => Ok(v),
        Wire::Text(s) if s == "inf" => Ok(f64::INFINITY),
        Wire::Text(s) => Err(serde::de::Error::custom(format!(
            "invalid profit factor {s:?}: expected a number or \"inf\""
        ))),
    }
}
