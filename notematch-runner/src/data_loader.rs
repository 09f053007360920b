//! Candle loading for the runner.
//!
//! Reads OHLCV rows from CSV with a `timestamp,open,high,low,close,volume`
//! header. Timestamps are RFC3339 or integer unix seconds; `volume` may be
//! omitted. Rows are sorted ascending and duplicate timestamps dropped (first
//! row wins), so the simulator always receives a chronological series. A file
//! with a header and no rows loads as an empty series.
//!
//! Price sanity is not checked here; the simulator skips malformed candles
//! itself and counts them.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use notematch_core::{Candle, Timeframe};

use crate::config::DataConfig;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open candle file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: unrecognised timestamp '{value}' (expected RFC3339 or unix seconds)")]
    Timestamp { row: usize, value: String },
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: f64,
}

/// Load, sort and de-duplicate candles from a CSV file.
pub fn load_candles(path: &Path) -> Result<Vec<Candle>, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let candles = parse_candles(file)?;
    debug!(path = %path.display(), count = candles.len(), "loaded candles");
    Ok(candles)
}

/// Parse candles from any CSV reader. See [`load_candles`].
pub fn parse_candles<R: Read>(reader: R) -> Result<Vec<Candle>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut candles = Vec::new();
    for (i, row) in rdr.deserialize::<CsvRow>().enumerate() {
        let row = row?;
        let timestamp = parse_timestamp(&row.timestamp).ok_or_else(|| LoadError::Timestamp {
            // header is row 1
            row: i + 2,
            value: row.timestamp.clone(),
        })?;
        candles.push(Candle {
            timestamp,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        });
    }

    candles.sort_by_key(|c| c.timestamp);
    let before = candles.len();
    candles.dedup_by_key(|c| c.timestamp);
    let dropped = before - candles.len();
    if dropped > 0 {
        warn!(dropped, "dropped candles with duplicate timestamps");
    }

    Ok(candles)
}

/// RFC3339 first, then integer unix seconds.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    s.parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}

/// Keep candles inside the configured inclusive window.
pub fn select_window(candles: Vec<Candle>, data: &DataConfig) -> Vec<Candle> {
    if data.start.is_none() && data.end.is_none() {
        return candles;
    }
    candles
        .into_iter()
        .filter(|c| data.contains(c.timestamp))
        .collect()
}

/// Spacing irregularities against the expected timeframe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GapReport {
    pub gaps: usize,
    pub largest: Option<Duration>,
}

/// Count consecutive candles spaced further apart than one `timeframe`.
///
/// Gaps are expected over weekends and holidays, so they are only reported,
/// never repaired.
pub fn detect_gaps(candles: &[Candle], timeframe: Timeframe) -> GapReport {
    let step = Duration::minutes(timeframe.minutes());
    let mut report = GapReport::default();
    for pair in candles.windows(2) {
        let delta = pair[1].timestamp - pair[0].timestamp;
        if delta > step {
            debug!(from = %pair[0].timestamp, to = %pair[1].timestamp, "gap in candle series");
            report.gaps += 1;
            report.largest = Some(report.largest.map_or(delta, |l| l.max(delta)));
        }
    }
    if let Some(largest) = report.largest {
        warn!(
            gaps = report.gaps,
            largest_minutes = largest.num_minutes(),
            %timeframe,
            "candle series has gaps"
        );
    }
    report
}
