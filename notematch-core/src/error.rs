//! Structural input errors.
//!
//! Degenerate numeric input (NaN, zero vectors, mismatched pairwise lengths)
//! never reaches this type; it is absorbed locally as a neutral value.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum VectorError {
    /// Anchor vector length is not one of the known schema lengths (7, 8, 12, 18).
    #[error("invalid feature vector dimension {len}: expected 12 (or legacy 7, 8, 18)")]
    InvalidVectorDimension { len: usize },
    #[error("feature vector component {index} is not finite")]
    NonFinite { index: usize },
}

/// Backtest parameters that cannot drive a meaningful simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("match_threshold must be within [-1, 1], got {0}")]
    MatchThreshold(f64),
    #[error("{name} must be a finite, non-negative percentage, got {value}")]
    Percentage { name: &'static str, value: f64 },
    #[error("max_holding_minutes must be positive, got {0}")]
    MaxHolding(i64),
    #[error("indicator period {name} must be >= 1")]
    Period { name: &'static str },
    #[error("macd_fast ({fast}) must be shorter than macd_slow ({slow})")]
    MacdPeriods { fast: usize, slow: usize },
}
