//! AnchorPattern: the recorded trade note that market states are matched against.

use serde::{Deserialize, Serialize};

use crate::error::VectorError;
use crate::features::{convert_legacy_vector, dim, FeatureVector};

use super::labels::{Side, Timeframe, TrendLabel};

/// Read-only anchor. The feature vector is always in the current 12-D layout;
/// legacy vectors are converted on ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorPattern {
    pub symbol: String,
    pub side: Side,
    pub entry_price: f64,
    pub feature_vector: FeatureVector,
    pub timeframe: Timeframe,
    /// Trend label recorded with the note, if any.
    #[serde(default)]
    pub trend: Option<TrendLabel>,
}

impl AnchorPattern {
    /// Ingest an anchor whose stored vector may use a legacy schema.
    ///
    /// Lengths 7, 8 and 18 are remapped; any length other than 7/8/12/18 fails
    /// with `InvalidVectorDimension`.
    pub fn from_raw(
        symbol: impl Into<String>,
        side: Side,
        entry_price: f64,
        raw_vector: &[f64],
        timeframe: Timeframe,
    ) -> Result<Self, VectorError> {
        Ok(Self {
            symbol: symbol.into(),
            side,
            entry_price,
            feature_vector: convert_legacy_vector(raw_vector)?,
            timeframe,
            trend: None,
        })
    }

    pub fn with_trend(mut self, trend: TrendLabel) -> Self {
        self.trend = Some(trend);
        self
    }

    /// Explicit trend label, else the label implied by the trend-direction dimension.
    pub fn trend_label(&self, dead_zone: f64) -> Option<TrendLabel> {
        self.trend.or_else(|| {
            TrendLabel::from_direction(self.feature_vector[dim::TREND_DIRECTION], dead_zone)
        })
    }
}
