//! Report export: JSON summary, CSV trade tape and a Markdown digest.
//!
//! Artifacts for a run land in `<output_dir>/<run_id>/`, so rerunning an
//! identical config overwrites its own previous artifacts. Persisted JSON
//! carries `schema_version`; newer versions are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use notematch_core::BacktestEvent;

use crate::runner::{BacktestReport, SCHEMA_VERSION};

// ─── JSON ───────────────────────────────────────────────────────────

pub fn export_json(report: &BacktestReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize BacktestReport to JSON")
}

/// Deserialize a report, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<BacktestReport> {
    let report: BacktestReport =
        serde_json::from_str(json).context("failed to deserialize BacktestReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV ────────────────────────────────────────────────────────────

/// Trade tape, one row per closed position.
pub fn export_trades_csv(events: &[BacktestEvent]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "side",
        "entry_time",
        "entry_price",
        "match_score",
        "exit_time",
        "exit_price",
        "outcome",
        "pnl_percent",
        "holding_minutes",
    ])?;

    for e in events {
        wtr.write_record([
            &e.side.to_string(),
            &e.entry_time.to_rfc3339(),
            &format!("{:.6}", e.entry_price),
            &format!("{:.4}", e.match_score_at_entry),
            &e.exit_time.to_rfc3339(),
            &format!("{:.6}", e.exit_price),
            &e.outcome.to_string(),
            &format!("{:.4}", e.pnl_percent),
            &e.holding_minutes.to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Markdown ───────────────────────────────────────────────────────

pub fn generate_report(report: &BacktestReport) -> String {
    let s = &report.run.summary;
    let mut md = String::with_capacity(1024);

    md.push_str(&format!(
        "# {} {} on {}\n\n",
        report.symbol, report.side, report.timeframe
    ));
    md.push_str(&format!("Run `{}`\n\n", report.run_id));

    match (report.window.start, report.window.end) {
        (Some(start), Some(end)) => md.push_str(&format!(
            "Window: {} to {} ({} candles, {} skipped)\n\n",
            start.to_rfc3339(),
            end.to_rfc3339(),
            report.window.candle_count,
            report.run.skipped_candles
        )),
        _ => md.push_str("Window: no candles\n\n"),
    }

    md.push_str("| Metric | Value |\n|---|---|\n");
    md.push_str(&format!("| Setups | {} |\n", s.setup_count));
    md.push_str(&format!(
        "| Wins / Losses / Timeouts | {} / {} / {} |\n",
        s.win_count, s.loss_count, s.timeout_count
    ));
    md.push_str(&format!("| Win rate | {:.1}% |\n", s.win_rate * 100.0));
    md.push_str(&format!("| Profit factor | {} |\n", fmt_profit_factor(s.profit_factor)));
    md.push_str(&format!("| Expectancy | {:.3}% |\n", s.expectancy));
    md.push_str(&format!("| Average win | {:.3}% |\n", s.average_win));
    md.push_str(&format!("| Average loss | {:.3}% |\n", s.average_loss));
    md.push_str(&format!("| Max drawdown | {:.3}% |\n", s.max_drawdown));
    md.push_str(&format!(
        "| Longest streaks (win / loss) | {} / {} |\n",
        s.max_consecutive_wins, s.max_consecutive_losses
    ));
    if let Some(best) = report.run.best_score {
        md.push_str(&format!("| Best entry score | {best:.4} |\n"));
    }
    md
}

pub fn fmt_profit_factor(pf: f64) -> String {
    if pf.is_infinite() {
        "inf".to_string()
    } else {
        format!("{pf:.2}")
    }
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Write `summary.json`, `trades.csv` and `report.md` under
/// `<output_dir>/<run_id>/`. Returns the run directory.
pub fn export_report(report: &BacktestReport, output_dir: &Path) -> Result<PathBuf> {
    let run_dir = output_dir.join(&report.run_id);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    write_artifact(&run_dir.join("summary.json"), export_json(report)?)?;
    write_artifact(
        &run_dir.join("trades.csv"),
        export_trades_csv(&report.run.events)?,
    )?;
    write_artifact(&run_dir.join("report.md"), generate_report(report))?;

    Ok(run_dir)
}

fn write_artifact(path: &Path, contents: String) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

/// Load a report back from a run directory.
pub fn load_report(run_dir: &Path) -> Result<BacktestReport> {
    let path = run_dir.join("summary.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}
