//! Serializable run configuration.
//!
//! A run file is TOML with four tables:
//!
//! ```toml
//! [anchor]
//! symbol = "EURUSD"
//! side = "buy"
//! entry_price = 1.0850
//! timeframe = "M15"
//! vector = [0.4, 0.6, 0.75, 0.2, 1.0, 0.62, 0.5, 0.7, 0.35, 0.6, 1.0, 0.5]
//!
//! [data]
//! path = "data/EURUSD_M15.csv"
//! start = "2024-01-01T00:00:00Z"   # optional, quoted RFC3339
//!
//! [backtest]                       # optional, defaults per field
//! match_threshold = 0.85
//!
//! [matching]                       # optional, defaults per field
//! ```
//!
//! A batch file holds the same tables under `[[run]]`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use notematch_core::{
    AnchorPattern, BacktestParams, MatchConfig, ParamError, Side, Timeframe, TrendLabel,
    VectorError,
};

/// Content-addressed identifier of a run configuration.
pub type RunId = String;

/// Errors from reading or validating run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("invalid backtest parameters: {0}")]
    Params(#[from] ParamError),
    #[error("invalid anchor: {0}")]
    Anchor(#[from] VectorError),
    #[error("data window start {start} is not before end {end}")]
    Window {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("batch file contains no [[run]] tables")]
    EmptyBatch,
}

/// Everything needed to reproduce one backtest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub anchor: AnchorConfig,
    pub data: DataConfig,
    #[serde(default)]
    pub backtest: BacktestParams,
    #[serde(default)]
    pub matching: MatchConfig,
}

/// Anchor note as stored: the vector may use any supported legacy layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorConfig {
    pub symbol: String,
    pub side: Side,
    pub entry_price: f64,
    pub timeframe: Timeframe,
    pub vector: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<TrendLabel>,
}

impl AnchorConfig {
    /// Ingest into a 12-D [`AnchorPattern`], converting legacy vectors.
    pub fn to_anchor(&self) -> Result<AnchorPattern, VectorError> {
        let anchor = AnchorPattern::from_raw(
            self.symbol.clone(),
            self.side,
            self.entry_price,
            &self.vector,
            self.timeframe,
        )?;
        Ok(match self.trend {
            Some(trend) => anchor.with_trend(trend),
            None => anchor,
        })
    }
}

/// Candle source and optional inclusive time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
}

impl DataConfig {
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| timestamp >= s) && self.end.map_or(true, |e| timestamp <= e)
    }
}

impl RunConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml_str(&read(path)?)
    }

    /// Check parameter ranges, the anchor vector and the data window.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.backtest.validate()?;
        self.anchor.to_anchor()?;
        if let (Some(start), Some(end)) = (self.data.start, self.data.end) {
            if start >= end {
                return Err(ConfigError::Window { start, end });
            }
        }
        Ok(())
    }

    /// Computes a deterministic hash ID for this configuration.
    ///
    /// Two identical configs share a RunId, so exports of a rerun land in the
    /// same directory.
    pub fn run_id(&self) -> Result<RunId, ConfigError> {
        let json = serde_json::to_string(self)?;
        let hash = blake3::hash(json.as_bytes());
        Ok(hash.to_hex().to_string())
    }
}

/// A batch file: one `[[run]]` table per backtest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default)]
    pub run: Vec<RunConfig>,
}

impl BatchConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let batch: BatchConfig = toml::from_str(s)?;
        if batch.run.is_empty() {
            return Err(ConfigError::EmptyBatch);
        }
        for run in &batch.run {
            run.validate()?;
        }
        Ok(batch)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml_str(&read(path)?)
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use notematch_core::EntryScore;

    const MINIMAL: &str = r#"
        [anchor]
        symbol = "EURUSD"
        side = "buy"
        entry_price = 1.085
        timeframe = "M15"
        vector = [0.4, 0.6, 0.75, 0.2, 1.0, 0.62, 0.5, 0.7, 0.35, 0.6, 1.0, 0.5]

        [data]
        path = "data/eurusd.csv"
    "#;

    #[test]
    fn minimal_config_takes_defaults() {
        let config = RunConfig::from_toml_str(MINIMAL).unwrap();
        assert_eq!(config.anchor.side, Side::Buy);
        assert_eq!(config.anchor.timeframe, Timeframe::M15);
        assert_eq!(config.backtest, BacktestParams::default());
        assert_eq!(config.matching, MatchConfig::default());
        assert!(config.data.start.is_none());
    }

    #[test]
    fn partial_tables_override_fields() {
        let toml = format!(
            "{MINIMAL}\n[backtest]\nmatch_threshold = 0.9\nentry_score = \"composite\"\n\
             [backtest.indicators]\nrsi_period = 7\n[matching.tiers]\nstrong = 0.95\n"
        );
        let config = RunConfig::from_toml_str(&toml).unwrap();
        assert_eq!(config.backtest.match_threshold, 0.9);
        assert_eq!(config.backtest.entry_score, EntryScore::Composite);
        assert_eq!(config.backtest.take_profit_pct, 2.0);
        assert_eq!(config.backtest.indicators.rsi_period, 7);
        assert_eq!(config.matching.tiers.strong, 0.95);
        assert_eq!(config.matching.tiers.medium, 0.80);
    }

    #[test]
    fn window_parses_quoted_rfc3339() {
        let toml = MINIMAL.replace(
            "path = \"data/eurusd.csv\"",
            "path = \"data/eurusd.csv\"\nstart = \"2024-03-01T00:00:00Z\"\nend = \"2024-03-31T23:59:00Z\"",
        );
        let config = RunConfig::from_toml_str(&toml).unwrap();
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(config.data.start, Some(start));
        assert!(config.data.contains(start));
        assert!(!config.data.contains(start - chrono::Duration::seconds(1)));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let toml = MINIMAL.replace(
            "path = \"data/eurusd.csv\"",
            "path = \"data/eurusd.csv\"\nstart = \"2024-04-01T00:00:00Z\"\nend = \"2024-03-01T00:00:00Z\"",
        );
        assert!(matches!(
            RunConfig::from_toml_str(&toml),
            Err(ConfigError::Window { .. })
        ));
    }

    #[test]
    fn bad_vector_length_is_rejected() {
        let toml = MINIMAL.replace(
            "vector = [0.4, 0.6, 0.75, 0.2, 1.0, 0.62, 0.5, 0.7, 0.35, 0.6, 1.0, 0.5]",
            "vector = [0.4, 0.6, 0.75]",
        );
        assert!(matches!(
            RunConfig::from_toml_str(&toml),
            Err(ConfigError::Anchor(VectorError::InvalidVectorDimension { len: 3 }))
        ));
    }

    #[test]
    fn bad_params_are_rejected() {
        let toml = format!("{MINIMAL}\n[backtest]\nmax_holding_minutes = 0\n");
        assert!(matches!(
            RunConfig::from_toml_str(&toml),
            Err(ConfigError::Params(ParamError::MaxHolding(0)))
        ));
    }

    #[test]
    fn unknown_side_is_a_parse_error() {
        let toml = MINIMAL.replace("side = \"buy\"", "side = \"long\"");
        assert!(matches!(
            RunConfig::from_toml_str(&toml),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn run_id_is_deterministic() {
        let a = RunConfig::from_toml_str(MINIMAL).unwrap();
        let b = RunConfig::from_toml_str(MINIMAL).unwrap();
        assert_eq!(a.run_id().unwrap(), b.run_id().unwrap());
        assert_eq!(a.run_id().unwrap().len(), 64);

        let mut c = a.clone();
        c.backtest.match_threshold = 0.81;
        assert_ne!(a.run_id().unwrap(), c.run_id().unwrap());
    }

    #[test]
    fn legacy_anchor_vector_converts() {
        let toml = MINIMAL.replace(
            "vector = [0.4, 0.6, 0.75, 0.2, 1.0, 0.62, 0.5, 0.7, 0.35, 0.6, 1.0, 0.5]",
            "vector = [0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5]",
        );
        let config = RunConfig::from_toml_str(&toml).unwrap();
        let anchor = config.anchor.to_anchor().unwrap();
        assert_eq!(anchor.feature_vector.as_slice().len(), 12);
    }

    #[test]
    fn empty_batch_is_rejected() {
        assert!(matches!(
            BatchConfig::from_toml_str(""),
            Err(ConfigError::EmptyBatch)
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = RunConfig::load(Path::new("/nonexistent/run.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/run.toml"));
    }
}
