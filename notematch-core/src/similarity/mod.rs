//! Similarity evaluation between two feature vectors.
//!
//! [`cosine`] is the primary metric. [`SimilarityEvaluator`] adds tier
//! classification and the explanatory per-group breakdown.

pub mod breakdown;
pub mod cosine;
pub mod tier;

use serde::{Deserialize, Serialize};

use crate::config::TierThresholds;

pub use breakdown::{breakdown, FeatureGroup, GroupScore, SimilarityBreakdown};
pub use cosine::cosine;
pub use tier::MatchTier;

/// Result of comparing two vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityReport {
    /// Whole-vector cosine similarity in [-1, 1].
    pub similarity: f64,
    pub tier: MatchTier,
    pub breakdown: SimilarityBreakdown,
}

/// Cosine evaluator with injectable tier thresholds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityEvaluator {
    tiers: TierThresholds,
}

impl SimilarityEvaluator {
    pub fn new(tiers: TierThresholds) -> Self {
        Self { tiers }
    }

    pub fn thresholds(&self) -> &TierThresholds {
        &self.tiers
    }

    pub fn cosine(&self, a: &[f64], b: &[f64]) -> f64 {
        cosine(a, b)
    }

    pub fn tier(&self, similarity: f64) -> MatchTier {
        self.tiers.classify(similarity)
    }

    /// Full comparison: score, tier and breakdown. Never fails.
    pub fn evaluate(&self, a: &[f64], b: &[f64]) -> SimilarityReport {
        let similarity = cosine(a, b);
        SimilarityReport {
            similarity,
            tier: self.tier(similarity),
            breakdown: breakdown(a, b),
        }
    }
}
