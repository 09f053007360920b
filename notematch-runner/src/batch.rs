//! Batch execution and threshold sweeps.
//!
//! Each run builds its own simulator and state machine, so runs are fanned out
//! with rayon without any shared mutable state. Results come back in input
//! order; one failing run does not abort the others.

use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::RunConfig;
use crate::runner::{run_backtest, BacktestReport, RunError};

/// Run every config, optionally in parallel.
pub fn run_batch(configs: &[RunConfig], parallel: bool) -> Vec<Result<BacktestReport, RunError>> {
    info!(runs = configs.len(), parallel, "starting batch");

    let results: Vec<Result<BacktestReport, RunError>> = if parallel {
        configs.par_iter().map(run_backtest).collect()
    } else {
        configs.iter().map(run_backtest).collect()
    };

    let failed = results.iter().filter(|r| r.is_err()).count();
    if failed > 0 {
        warn!(failed, runs = configs.len(), "batch finished with failures");
    } else {
        info!(runs = configs.len(), "batch complete");
    }
    results
}

/// One config per threshold, everything else copied from `base`.
pub fn threshold_sweep(base: &RunConfig, thresholds: &[f64]) -> Vec<RunConfig> {
    thresholds
        .iter()
        .map(|&t| {
            let mut config = base.clone();
            config.backtest.match_threshold = t;
            config
        })
        .collect()
}

/// Successful reports ranked by expectancy, best first.
pub fn rank_by_expectancy(reports: &mut [BacktestReport]) {
    reports.sort_by(|a, b| {
        b.run
            .summary
            .expectancy
            .total_cmp(&a.run.summary.expectancy)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AnchorConfig, DataConfig};
    use notematch_core::features::NEUTRAL;
    use notematch_core::{BacktestParams, Side, Timeframe};
    use std::path::PathBuf;

    fn base() -> RunConfig {
        RunConfig {
            anchor: AnchorConfig {
                symbol: "NZDUSD".into(),
                side: Side::Sell,
                entry_price: 0.61,
                timeframe: Timeframe::M5,
                vector: NEUTRAL.to_vec(),
                trend: None,
            },
            data: DataConfig {
                path: PathBuf::from("/nonexistent/nzdusd.csv"),
                start: None,
                end: None,
            },
            backtest: BacktestParams::default(),
            matching: Default::default(),
        }
    }

    #[test]
    fn sweep_varies_only_threshold() {
        let configs = threshold_sweep(&base(), &[0.7, 0.8, 0.9]);
        assert_eq!(configs.len(), 3);
        assert_eq!(configs[2].backtest.match_threshold, 0.9);
        assert_eq!(configs[0].anchor, base().anchor);
        let ids: std::collections::HashSet<_> =
            configs.iter().map(|c| c.run_id().unwrap()).collect();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn failures_stay_in_their_slot() {
        let results = run_batch(&threshold_sweep(&base(), &[0.7, 0.8]), true);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| matches!(r, Err(RunError::Data(_)))));
    }
}
