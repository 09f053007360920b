//! NoteMatch Core: feature vectors, similarity matching, rule confirmation,
//! backtest simulation and result aggregation.
//!
//! This crate contains the matching engine:
//! - Domain value objects (candles, anchors, backtest events, labels)
//! - 12-D feature vector construction with documented neutral defaults
//! - Legacy 7/8/18-D vector conversion
//! - Cosine similarity, match tiers and per-group breakdown
//! - Rule confirmation (similarity + trend + price range)
//! - Streaming indicators and the Flat/InPosition backtest state machine
//! - Pure reduction of backtest events into summary statistics
//!
//! Everything here is synchronous and free of I/O. Independent runs share no
//! mutable state and can be executed in parallel by the caller.

pub mod backtest;
pub mod config;
pub mod domain;
pub mod error;
pub mod features;
pub mod indicators;
pub mod rules;
pub mod similarity;
pub mod summary;

pub use backtest::{BacktestParams, BacktestRun, BacktestSimulator, EntryScore, PositionState};
pub use config::{FeatureConfig, MatchConfig, RuleWeights, SessionHours, TierThresholds};
pub use domain::{
    AnchorPattern, BacktestEvent, Candle, MarketObservation, Outcome, Side, Timeframe, TrendLabel,
};
pub use error::{ParamError, VectorError};
pub use features::{FeatureVector, FeatureVectorBuilder, IndicatorReading, LegacyFormat};
pub use rules::{MatchEvaluation, RuleConfirmationLayer};
pub use similarity::{MatchTier, SimilarityEvaluator, SimilarityReport};
pub use summary::{BacktestSummary, ResultAggregator};
