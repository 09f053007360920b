//! Backtest simulation: a Flat/InPosition state machine replayed over a
//! chronologically ordered candle series.

pub mod params;
pub mod simulator;
pub mod state;

pub use params::{BacktestParams, EntryScore};
pub use simulator::{BacktestRun, BacktestSimulator};
pub use state::{force_close, step, OpenPosition, PositionState};
