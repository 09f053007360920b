//! NoteMatch CLI: backtest anchors against candle history and inspect vectors.
//!
//! Commands:
//! - `backtest`: run one TOML config and export its artifacts
//! - `batch`: run every `[[run]]` of a batch file, in parallel by default
//! - `sweep`: rerun one config over a list of match thresholds
//! - `compare`: cosine, tier and per-group breakdown of two vectors
//! - `features`: build the 12-D vector for a candle (and optional indicators)
//! - `synth`: write a seeded synthetic candle CSV

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use notematch_core::features::convert_legacy_vector;
use notematch_core::{
    Candle, FeatureVectorBuilder, IndicatorReading, MatchConfig, SimilarityEvaluator, Timeframe,
};
use notematch_runner::export::fmt_profit_factor;
use notematch_runner::{
    export_report, rank_by_expectancy, run_backtest, run_batch, synthetic_candles,
    threshold_sweep, write_candles_csv, BacktestReport, BatchConfig, RunConfig, SyntheticSpec,
};

#[derive(Parser)]
#[command(
    name = "notematch",
    about = "NoteMatch CLI: match trade notes against market history"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single backtest from a TOML config file.
    Backtest {
        /// Path to a TOML run config.
        #[arg(long)]
        config: PathBuf,

        /// Output directory for artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// Print the summary only; write no artifacts.
        #[arg(long, default_value_t = false)]
        no_export: bool,
    },
    /// Run every [[run]] table of a batch file.
    Batch {
        /// Path to a TOML batch file.
        #[arg(long)]
        config: PathBuf,

        /// Run one config at a time.
        #[arg(long, default_value_t = false)]
        sequential: bool,

        /// Output directory for artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Rerun one config over several match thresholds, ranked by expectancy.
    Sweep {
        /// Path to a TOML run config.
        #[arg(long)]
        config: PathBuf,

        /// Thresholds to try, comma separated (e.g. 0.7,0.8,0.9).
        #[arg(long, value_delimiter = ',', required = true)]
        thresholds: Vec<f64>,
    },
    /// Compare two feature vectors.
    Compare {
        /// First vector: a JSON array, or a path to a file holding one.
        #[arg(long)]
        a: String,

        /// Second vector: a JSON array, or a path to a file holding one.
        #[arg(long)]
        b: String,

        /// Optional TOML file with [tiers] overrides.
        #[arg(long)]
        matching: Option<PathBuf>,
    },
    /// Build the 12-D feature vector for one candle.
    Features {
        /// Candle as JSON (or a path to a JSON file).
        #[arg(long)]
        candle: String,

        /// Indicator reading as JSON (or a path to a JSON file).
        #[arg(long)]
        indicators: Option<String>,
    },
    /// Write a seeded synthetic candle CSV.
    Synth {
        /// Output CSV path.
        #[arg(long)]
        out: PathBuf,

        #[arg(long, default_value_t = 5_000)]
        count: usize,

        /// Timeframe label (M1, M5, M15, M30, H1, H4, D1).
        #[arg(long, default_value = "M15")]
        timeframe: String,

        /// First candle time (RFC3339).
        #[arg(long, default_value = "2024-01-01T00:00:00Z")]
        start: String,

        #[arg(long, default_value_t = 1.0)]
        start_price: f64,

        /// Max per-candle move as a fraction of price.
        #[arg(long, default_value_t = 0.0015)]
        volatility: f64,

        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Backtest {
            config,
            output_dir,
            no_export,
        } => run_backtest_cmd(&config, &output_dir, no_export),
        Commands::Batch {
            config,
            sequential,
            output_dir,
        } => run_batch_cmd(&config, !sequential, &output_dir),
        Commands::Sweep { config, thresholds } => run_sweep_cmd(&config, &thresholds),
        Commands::Compare { a, b, matching } => run_compare(&a, &b, matching.as_deref()),
        Commands::Features { candle, indicators } => run_features(&candle, indicators.as_deref()),
        Commands::Synth {
            out,
            count,
            timeframe,
            start,
            start_price,
            volatility,
            seed,
        } => run_synth(&out, count, &timeframe, &start, start_price, volatility, seed),
    }
}

fn run_backtest_cmd(config_path: &Path, output_dir: &Path, no_export: bool) -> Result<()> {
    let config = RunConfig::load(config_path)?;
    let report = run_backtest(&config)?;
    print_summary(&report);

    if !no_export {
        let run_dir = export_report(&report, output_dir)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

fn run_batch_cmd(config_path: &Path, parallel: bool, output_dir: &Path) -> Result<()> {
    let batch = BatchConfig::load(config_path)?;
    let results = run_batch(&batch.run, parallel);

    let mut failed = 0usize;
    for (i, result) in results.iter().enumerate() {
        match result {
            Ok(report) => {
                export_report(report, output_dir)?;
                println!("{}", summary_line(report));
            }
            Err(e) => {
                failed += 1;
                eprintln!("run {}: {e}", i + 1);
            }
        }
    }
    println!("Artifacts saved under: {}", output_dir.display());

    if failed > 0 {
        bail!("{failed} of {} runs failed", results.len());
    }
    Ok(())
}

fn run_sweep_cmd(config_path: &Path, thresholds: &[f64]) -> Result<()> {
    let base = RunConfig::load(config_path)?;
    let configs = threshold_sweep(&base, thresholds);
    for config in &configs {
        config.validate()?;
    }

    let mut reports = run_batch(&configs, true)
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;
    rank_by_expectancy(&mut reports);

    println!(
        "{:>9}  {:>6}  {:>8}  {:>7}  {:>10}",
        "threshold", "setups", "win rate", "PF", "expectancy"
    );
    for r in &reports {
        let s = &r.run.summary;
        println!(
            "{:>9.3}  {:>6}  {:>7.1}%  {:>7}  {:>9.3}%",
            r.params.match_threshold,
            s.setup_count,
            s.win_rate * 100.0,
            fmt_profit_factor(s.profit_factor),
            s.expectancy
        );
    }
    Ok(())
}

fn run_compare(a: &str, b: &str, matching: Option<&Path>) -> Result<()> {
    let a = read_vector(a).context("vector --a")?;
    let b = read_vector(b).context("vector --b")?;
    let config = match matching {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            toml::from_str::<MatchConfig>(&text)?
        }
        None => MatchConfig::default(),
    };

    let report = SimilarityEvaluator::new(config.tiers).evaluate(a.as_slice(), b.as_slice());
    println!("Similarity:  {:.4}", report.similarity);
    println!("Tier:        {}", report.tier);
    println!();
    println!("{:<12} {:>10} {:>7} {:>13}", "group", "similarity", "weight", "contribution");
    for g in &report.breakdown.groups {
        println!(
            "{:<12} {:>10.4} {:>7.2} {:>13.4}",
            format!("{:?}", g.group).to_lowercase(),
            g.similarity,
            g.weight,
            g.contribution
        );
    }
    println!("{:<12} {:>32.4}", "weighted", report.breakdown.weighted_total);
    Ok(())
}

fn run_features(candle: &str, indicators: Option<&str>) -> Result<()> {
    let candle: Candle = serde_json::from_str(&read_json_arg(candle)?)
        .context("candle must be {timestamp, open, high, low, close[, volume]}")?;
    let reading: IndicatorReading = match indicators {
        Some(arg) => serde_json::from_str(&read_json_arg(arg)?).context("invalid indicator JSON")?,
        None => IndicatorReading::default(),
    };

    let vector = FeatureVectorBuilder::default().build(&candle, &reading, Some(candle.timestamp));
    println!("{}", serde_json::to_string(&vector)?);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_synth(
    out: &Path,
    count: usize,
    timeframe: &str,
    start: &str,
    start_price: f64,
    volatility: f64,
    seed: u64,
) -> Result<()> {
    let timeframe: Timeframe = serde_json::from_value(serde_json::Value::String(
        timeframe.to_uppercase(),
    ))
    .with_context(|| format!("unknown timeframe '{timeframe}'"))?;
    let start: DateTime<Utc> = DateTime::parse_from_rfc3339(start)
        .with_context(|| format!("invalid --start '{start}'"))?
        .with_timezone(&Utc);

    let candles = synthetic_candles(&SyntheticSpec {
        start,
        timeframe,
        count,
        start_price,
        volatility,
        seed,
    })?;
    let file = std::fs::File::create(out)
        .with_context(|| format!("failed to create {}", out.display()))?;
    write_candles_csv(&candles, file)?;
    println!("Wrote {} candles to {}", candles.len(), out.display());
    Ok(())
}

/// Inline JSON, or the contents of the file it names.
fn read_json_arg(arg: &str) -> Result<String> {
    let trimmed = arg.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return Ok(arg.to_string());
    }
    std::fs::read_to_string(arg).with_context(|| format!("failed to read {arg}"))
}

/// Parse a vector argument; 7/8/18-D legacy vectors are converted to 12-D.
fn read_vector(arg: &str) -> Result<Vec<f64>> {
    let value: serde_json::Value = serde_json::from_str(&read_json_arg(arg)?)?;
    let Some(items) = value.as_array() else {
        bail!("expected a JSON array of numbers");
    };
    let raw: Vec<f64> = items
        .iter()
        .map(|v| v.as_f64())
        .collect::<Option<_>>()
        .context("vector entries must all be numbers")?;
    // other lengths are compared as-is, zero padded
    Ok(match convert_legacy_vector(&raw) {
        Ok(vector) => vector.as_slice().to_vec(),
        Err(_) => raw,
    })
}

fn summary_line(report: &BacktestReport) -> String {
    let s = &report.run.summary;
    format!(
        "{} {} {:<6} thr {:.2}  setups {:>4}  win {:>5.1}%  PF {:>6}  exp {:>7.3}%  [{}]",
        report.symbol,
        report.side,
        report.timeframe,
        report.params.match_threshold,
        s.setup_count,
        s.win_rate * 100.0,
        fmt_profit_factor(s.profit_factor),
        s.expectancy,
        &report.run_id[..12.min(report.run_id.len())]
    )
}

fn print_summary(report: &BacktestReport) {
    let s = &report.run.summary;
    println!();
    println!("=== Backtest Result ===");
    println!("Run:            {}", report.run_id);
    println!(
        "Anchor:         {} {} on {}",
        report.symbol, report.side, report.timeframe
    );
    match (report.window.start, report.window.end) {
        (Some(start), Some(end)) => println!("Period:         {start} to {end}"),
        _ => println!("Period:         (no candles in window)"),
    }
    println!(
        "Candles:        {} ({} skipped, {} scored)",
        report.window.candle_count, report.run.skipped_candles, report.run.evaluations
    );
    if let Some(best) = report.run.best_score {
        println!("Best score:     {best:.4}");
    }
    println!();
    println!("--- Setups ---");
    println!(
        "Setups:         {} ({} win / {} loss / {} timeout)",
        s.setup_count, s.win_count, s.loss_count, s.timeout_count
    );
    println!("Win Rate:       {:.1}%", s.win_rate * 100.0);
    println!("Profit Factor:  {}", fmt_profit_factor(s.profit_factor));
    println!("Expectancy:     {:.3}%", s.expectancy);
    println!("Avg Win:        {:.3}%", s.average_win);
    println!("Avg Loss:       {:.3}%", s.average_loss);
    println!("Max Drawdown:   {:.3}%", s.max_drawdown);
    println!(
        "Streaks:        {} wins / {} losses",
        s.max_consecutive_wins, s.max_consecutive_losses
    );
}
