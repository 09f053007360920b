//! Seeded synthetic candles for demos and tests.
//!
//! A multiplicative random walk: each candle opens at the previous close,
//! moves by at most `volatility` (fraction), and gets wicks on both sides.
//! Same seed, same series.

use std::io::Write;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use notematch_core::{Candle, Timeframe};

#[derive(Debug, Clone)]
pub struct SyntheticSpec {
    pub start: DateTime<Utc>,
    pub timeframe: Timeframe,
    pub count: usize,
    pub start_price: f64,
    /// Max per-candle move as a fraction of price.
    pub volatility: f64,
    pub seed: u64,
}

/// Fails if the series would run past the last representable timestamp.
pub fn synthetic_candles(spec: &SyntheticSpec) -> Result<Vec<Candle>> {
    let mut rng = StdRng::seed_from_u64(spec.seed);
    let step = Duration::minutes(spec.timeframe.minutes());
    let vol = spec.volatility.abs();
    let mut price = spec.start_price;
    let mut timestamp = spec.start;
    let mut candles = Vec::with_capacity(spec.count);

    for i in 0..spec.count {
        if i > 0 {
            timestamp = timestamp.checked_add_signed(step).ok_or_else(|| {
                anyhow!(
                    "{} {} candles from {} overflow the timestamp range",
                    spec.count,
                    spec.timeframe,
                    spec.start
                )
            })?;
        }
        let open = price;
        let change = if vol > 0.0 { rng.gen_range(-vol..vol) } else { 0.0 };
        price = (price * (1.0 + change)).max(f64::EPSILON);
        let close = price;
        let wick = if vol > 0.0 { rng.gen_range(0.0..vol / 2.0) } else { 0.0 };
        candles.push(Candle {
            timestamp,
            open,
            high: open.max(close) * (1.0 + wick),
            low: open.min(close) * (1.0 - wick),
            close,
            volume: rng.gen_range(100.0..10_000.0_f64).round(),
        });
    }
    Ok(candles)
}

/// Write candles in the format `load_candles` reads.
pub fn write_candles_csv<W: Write>(candles: &[Candle], out: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["timestamp", "open", "high", "low", "close", "volume"])?;
    for c in candles {
        wtr.write_record([
            &c.timestamp.to_rfc3339(),
            &format!("{:.6}", c.open),
            &format!("{:.6}", c.high),
            &format!("{:.6}", c.low),
            &format!("{:.6}", c.close),
            &format!("{:.0}", c.volume),
        ])?;
    }
    wtr.flush().context("failed to flush candle CSV")?;
    Ok(())
}
