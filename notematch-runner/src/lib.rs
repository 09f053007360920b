//! NoteMatch Runner: backtest orchestration around the core engine.
//!
//! This crate builds on `notematch-core` to provide:
//! - TOML run and batch configuration with content-addressed run ids
//! - CSV candle loading (sorting, de-duplication, gap reporting, windowing)
//! - Single runs, rayon-parallel batches and threshold sweeps
//! - Report export (JSON summary, CSV trade tape, Markdown digest)
//! - Seeded synthetic candles for demos

pub mod batch;
pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;
pub mod synthetic;

pub use batch::{rank_by_expectancy, run_batch, threshold_sweep};
pub use config::{AnchorConfig, BatchConfig, ConfigError, DataConfig, RunConfig, RunId};
pub use data_loader::{
    detect_gaps, load_candles, parse_candles, select_window, GapReport, LoadError,
};
pub use export::{export_report, generate_report, load_report};
pub use runner::{
    run_backtest, run_on_candles, BacktestReport, DataWindow, RunError, SCHEMA_VERSION,
};
pub use synthetic::{synthetic_candles, write_candles_csv, SyntheticSpec};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn report_is_send_sync() {
        assert_send::<BacktestReport>();
        assert_sync::<BacktestReport>();
    }

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<RunConfig>();
        assert_sync::<RunConfig>();
        assert_send::<BatchConfig>();
        assert_sync::<BatchConfig>();
    }

    #[test]
    fn errors_are_send_sync() {
        assert_send::<RunError>();
        assert_sync::<RunError>();
    }
}
