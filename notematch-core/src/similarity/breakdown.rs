//! Per-group similarity breakdown, for explaining a score.
//!
//! Purely informational: the primary score is always the whole-vector cosine.

use serde::{Deserialize, Serialize};
use std::ops::Range;

use super::cosine::cosine;
use crate::features::FEATURE_DIM;

/// Semantic group of feature dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureGroup {
    Trend,
    Momentum,
    Overbought,
    Volatility,
    Candle,
    Time,
}

impl FeatureGroup {
    pub const ALL: [FeatureGroup; 6] = [
        FeatureGroup::Trend,
        FeatureGroup::Momentum,
        FeatureGroup::Overbought,
        FeatureGroup::Volatility,
        FeatureGroup::Candle,
        FeatureGroup::Time,
    ];

    pub fn dims(self) -> Range<usize> {
        match self {
            FeatureGroup::Trend => 0..3,
            FeatureGroup::Momentum => 3..5,
            FeatureGroup::Overbought => 5..7,
            FeatureGroup::Volatility => 7..9,
            FeatureGroup::Candle => 9..11,
            FeatureGroup::Time => 11..12,
        }
    }

    /// Weight in the explanatory total. Weights sum to 1.
    pub fn weight(self) -> f64 {
        match self {
            FeatureGroup::Trend => 0.25,
            FeatureGroup::Momentum => 0.20,
            FeatureGroup::Overbought => 0.20,
            FeatureGroup::Volatility => 0.15,
            FeatureGroup::Candle => 0.10,
            FeatureGroup::Time => 0.10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupScore {
    pub group: FeatureGroup,
    pub similarity: f64,
    pub weight: f64,
    pub contribution: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityBreakdown {
    pub groups: Vec<GroupScore>,
    /// Sum of group contributions. Not the match score.
    pub weighted_total: f64,
}

impl SimilarityBreakdown {
    pub fn group(&self, group: FeatureGroup) -> Option<&GroupScore> {
        self.groups.iter().find(|g| g.group == group)
    }
}

/// Cosine per group. Inputs shorter than 12 dimensions are zero-padded,
/// dimensions beyond 12 are ignored.
pub fn breakdown(a: &[f64], b: &[f64]) -> SimilarityBreakdown {
    let a = pad(a);
    let b = pad(b);
    let groups: Vec<GroupScore> = FeatureGroup::ALL
        .iter()
        .map(|&group| {
            let range = group.dims();
            let similarity = cosine(&a[range.clone()], &b[range]);
            let weight = group.weight();
            GroupScore {
                group,
                similarity,
                weight,
                contribution: similarity * weight,
            }
        })
        .collect();
    let weighted_total = groups.iter().map(|g| g.contribution).sum();
    SimilarityBreakdown {
        groups,
        weighted_total,
    }
}

fn pad(v: &[f64]) -> [f64; FEATURE_DIM] {
    let mut out = [0.0; FEATURE_DIM];
    for (dst, src) in out.iter_mut().zip(v.iter()) {
        *dst = *src;
    }
    out
}
