//! Single-run orchestration: config → candles → simulator → report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use notematch_core::{
    BacktestParams, BacktestRun, BacktestSimulator, Candle, Side, Timeframe, VectorError,
};

use crate::config::{ConfigError, RunConfig, RunId};
use crate::data_loader::{detect_gaps, load_candles, select_window, LoadError};

/// Errors from running a backtest.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("anchor error: {0}")]
    Anchor(#[from] VectorError),
}

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

/// Time span actually simulated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub candle_count: usize,
}

impl DataWindow {
    pub fn of(candles: &[Candle]) -> Self {
        Self {
            start: candles.first().map(|c| c.timestamp),
            end: candles.last().map(|c| c.timestamp),
            candle_count: candles.len(),
        }
    }
}

/// Complete result of a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub symbol: String,
    pub side: Side,
    pub timeframe: Timeframe,
    pub params: BacktestParams,
    pub window: DataWindow,
    pub run: BacktestRun,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Load the configured candles and run the backtest they describe.
pub fn run_backtest(config: &RunConfig) -> Result<BacktestReport, RunError> {
    config.validate()?;
    let candles = select_window(load_candles(&config.data.path)?, &config.data);
    run_on_candles(config, &candles)
}

/// Run a config against candles the caller already holds.
///
/// Candles must be in ascending order; out-of-order or malformed ones are
/// skipped by the simulator.
pub fn run_on_candles(config: &RunConfig, candles: &[Candle]) -> Result<BacktestReport, RunError> {
    config.validate()?;
    let run_id = config.run_id()?;
    let anchor = config.anchor.to_anchor()?;
    detect_gaps(candles, anchor.timeframe);

    info!(
        run_id = %short(&run_id),
        symbol = %anchor.symbol,
        side = %anchor.side,
        candles = candles.len(),
        "starting backtest"
    );

    let simulator = BacktestSimulator::new(&config.matching, config.backtest.clone())
        .map_err(ConfigError::Params)?;
    let run = simulator.run(&anchor, candles);

    info!(
        run_id = %short(&run_id),
        setups = run.summary.setup_count,
        win_rate = run.summary.win_rate,
        skipped = run.skipped_candles,
        "backtest complete"
    );

    Ok(BacktestReport {
        schema_version: SCHEMA_VERSION,
        run_id,
        symbol: anchor.symbol,
        side: anchor.side,
        timeframe: anchor.timeframe,
        params: config.backtest.clone(),
        window: DataWindow::of(candles),
        run,
    })
}

fn short(run_id: &str) -> &str {
    run_id.get(..12).unwrap_or(run_id)
}
