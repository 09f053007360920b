//! BacktestSimulator: replays a candle series against one anchor.
//!
//! Candles are consumed once, in order. Per candle:
//! 1. Reject malformed or out-of-order candles (logged, counted, never fatal).
//! 2. Advance the streaming indicators.
//! 3. Drive [`step`]; the market vector is only built while flat.
//!
//! A position still open after the last candle is closed there as a timeout.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::params::{BacktestParams, EntryScore};
use super::state::{force_close, step, PositionState};
use crate::config::MatchConfig;
use crate::domain::{AnchorPattern, BacktestEvent, Candle};
use crate::error::ParamError;
use crate::features::{FeatureVector, IndicatorReading};
use crate::indicators::IndicatorTracker;
use crate::rules::RuleConfirmationLayer;
use crate::summary::{BacktestSummary, ResultAggregator};

/// Everything one simulation produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestRun {
    pub events: Vec<BacktestEvent>,
    pub summary: BacktestSummary,
    /// Candles that passed validation and were fed to the state machine.
    /// Zero means the window held no usable data.
    pub candles_processed: usize,
    pub skipped_candles: usize,
    /// Candles on which the anchor was scored (flat and past warmup).
    pub evaluations: usize,
    /// Highest entry score seen, if any candle was scored.
    pub best_score: Option<f64>,
}

impl BacktestRun {
    pub fn is_empty_window(&self) -> bool {
        self.candles_processed == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct BacktestSimulator {
    layer: RuleConfirmationLayer,
    params: BacktestParams,
}

impl BacktestSimulator {
    /// Fails when `params` cannot drive a simulation (see
    /// [`BacktestParams::validate`]); a constructed simulator never panics in `run`.
    pub fn new(config: &MatchConfig, params: BacktestParams) -> Result<Self, ParamError> {
        params.validate()?;
        Ok(Self {
            layer: RuleConfirmationLayer::new(config),
            params,
        })
    }

    pub fn params(&self) -> &BacktestParams {
        &self.params
    }

    pub fn run(&self, anchor: &AnchorPattern, candles: &[Candle]) -> BacktestRun {
        let mut tracker = IndicatorTracker::new(&self.params.indicators);
        let mut state = PositionState::Flat;
        let mut events = Vec::new();
        let mut last: Option<&Candle> = None;
        let mut candles_processed = 0usize;
        let mut skipped_candles = 0usize;
        let mut evaluations = 0usize;
        let mut best_score: Option<f64> = None;

        for candle in candles {
            if !candle.is_sane() {
                warn!(timestamp = %candle.timestamp, "skipping malformed candle");
                skipped_candles += 1;
                continue;
            }
            if let Some(prev) = last {
                if candle.timestamp <= prev.timestamp {
                    warn!(
                        timestamp = %candle.timestamp,
                        previous = %prev.timestamp,
                        "skipping candle that is not later than its predecessor"
                    );
                    skipped_candles += 1;
                    continue;
                }
            }

            let reading = tracker.update(candle);
            candles_processed += 1;
            let warm = candles_processed > self.params.warmup_candles;

            let (next, event) = step(state, candle, &self.params, anchor.side, || {
                if !warm {
                    return None;
                }
                let score = self.entry_score(anchor, candle, &reading);
                evaluations += 1;
                best_score = Some(best_score.map_or(score, |b| b.max(score)));
                Some(score)
            });

            if let (PositionState::Flat, PositionState::InPosition(p)) = (&state, &next) {
                debug!(
                    "{} entry at {} price {:.5} score {:.4}",
                    anchor.side, p.entry_time, p.entry_price, p.match_score
                );
            }
            if let Some(event) = event {
                log_exit(&event);
                events.push(event);
            }

            state = next;
            last = Some(candle);
        }

        if let (PositionState::InPosition(position), Some(candle)) = (state, last) {
            let event = force_close(&position, candle, &self.params, anchor.side);
            log_exit(&event);
            events.push(event);
        }

        let summary = ResultAggregator::summarize(&events);
        BacktestRun {
            events,
            summary,
            candles_processed,
            skipped_candles,
            evaluations,
            best_score,
        }
    }

    /// Market vector the simulator derives for `candle` from its own indicators.
    pub fn market_vector(&self, candle: &Candle, reading: &IndicatorReading) -> FeatureVector {
        self.layer
            .builder()
            .build(candle, reading, Some(candle.timestamp))
    }

    fn entry_score(&self, anchor: &AnchorPattern, candle: &Candle, reading: &IndicatorReading) -> f64 {
        let vector = self.market_vector(candle, reading);
        match self.params.entry_score {
            EntryScore::Cosine => self
                .layer
                .evaluator()
                .cosine(anchor.feature_vector.as_slice(), vector.as_slice()),
            EntryScore::Composite => {
                let trend = self.layer.trend_of(&vector);
                self.layer.confirm(anchor, &vector, trend, candle.close).score
            }
        }
    }
}

fn log_exit(event: &BacktestEvent) {
    debug!(
        "{} exit at {} price {:.5} {} pnl {:.3}% after {}m",
        event.side,
        event.exit_time,
        event.exit_price,
        event.outcome,
        event.pnl_percent,
        event.holding_minutes
    );
}
