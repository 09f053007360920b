//! Position state machine: `Flat` ⇄ `InPosition`.
//!
//! [`step`] is the only transition function. It sees exactly one candle, so a
//! decision at candle t cannot depend on anything after t.
//!
//! - Flat: score the candle; enter at its close when score >= threshold.
//! - InPosition: check exits against this candle in priority order
//!   take-profit, stop-loss, timeout. The candle a position is opened on is
//!   never checked for its exit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::params::BacktestParams;
use crate::domain::{pnl_percent, BacktestEvent, Candle, Outcome, Side};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub entry_time: DateTime<Utc>,
    pub entry_price: f64,
    pub match_score: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PositionState {
    #[default]
    Flat,
    InPosition(OpenPosition),
}

impl PositionState {
    pub fn is_flat(&self) -> bool {
        matches!(self, PositionState::Flat)
    }

    pub fn position(&self) -> Option<&OpenPosition> {
        match self {
            PositionState::Flat => None,
            PositionState::InPosition(p) => Some(p),
        }
    }
}

/// Advance the state machine by one candle.
///
/// `score` is only called while flat; returning `None` (warmup) blocks entry.
pub fn step<F>(
    state: PositionState,
    candle: &Candle,
    params: &BacktestParams,
    side: Side,
    score: F,
) -> (PositionState, Option<BacktestEvent>)
where
    F: FnOnce() -> Option<f64>,
{
    match state {
        PositionState::Flat => match score() {
            Some(s) if s >= params.match_threshold => {
                let position = OpenPosition {
                    entry_time: candle.timestamp,
                    entry_price: candle.close,
                    match_score: s,
                };
                (PositionState::InPosition(position), None)
            }
            _ => (PositionState::Flat, None),
        },
        PositionState::InPosition(position) => match check_exit(&position, candle, params, side) {
            Some((exit_price, outcome)) => {
                let event = close_position(&position, candle, exit_price, outcome, params, side);
                (PositionState::Flat, Some(event))
            }
            None => (state, None),
        },
    }
}

/// Close `position` at `candle`'s close with outcome `Timeout`. Used when the
/// series ends with the position still open.
pub fn force_close(
    position: &OpenPosition,
    candle: &Candle,
    params: &BacktestParams,
    side: Side,
) -> BacktestEvent {
    close_position(position, candle, candle.close, Outcome::Timeout, params, side)
}

/// TP is checked before SL when both lie inside the candle's range. The real
/// intrabar path is unknown, so this is an approximation.
fn check_exit(
    position: &OpenPosition,
    candle: &Candle,
    params: &BacktestParams,
    side: Side,
) -> Option<(f64, Outcome)> {
    let sign = side.sign();
    let entry = position.entry_price;

    if let Some(tp) = params.take_profit_price(entry, sign) {
        let hit = match side {
            Side::Buy => candle.high >= tp,
            Side::Sell => candle.low <= tp,
        };
        if hit {
            return Some((tp, Outcome::Win));
        }
    }

    if let Some(sl) = params.stop_loss_price(entry, sign) {
        let hit = match side {
            Side::Buy => candle.low <= sl,
            Side::Sell => candle.high >= sl,
        };
        if hit {
            return Some((sl, Outcome::Loss));
        }
    }

    let held = (candle.timestamp - position.entry_time).num_minutes();
    if held >= params.max_holding_minutes {
        return Some((candle.close, Outcome::Timeout));
    }
    None
}

fn close_position(
    position: &OpenPosition,
    candle: &Candle,
    exit_price: f64,
    outcome: Outcome,
    params: &BacktestParams,
    side: Side,
) -> BacktestEvent {
    BacktestEvent {
        side,
        entry_time: position.entry_time,
        entry_price: position.entry_price,
        match_score_at_entry: position.match_score,
        exit_time: candle.timestamp,
        exit_price,
        outcome,
        pnl_percent: pnl_percent(side, position.entry_price, exit_price, params.cost_percent),
        holding_minutes: (candle.timestamp - position.entry_time).num_minutes(),
    }
}
