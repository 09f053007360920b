//! Match tiers derived from fixed similarity thresholds.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::TierThresholds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchTier {
    None,
    Weak,
    Medium,
    Strong,
}

impl MatchTier {
    /// Classify with the default thresholds (0.90 / 0.80 / 0.70).
    pub fn from_score(score: f64) -> Self {
        TierThresholds::default().classify(score)
    }
}

impl TierThresholds {
    /// Lower bounds are inclusive. NaN classifies as `None`.
    pub fn classify(&self, score: f64) -> MatchTier {
        if score >= self.strong {
            MatchTier::Strong
        } else if score >= self.medium {
            MatchTier::Medium
        } else if score >= self.weak {
            MatchTier::Weak
        } else {
            MatchTier::None
        }
    }
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchTier::None => "none",
            MatchTier::Weak => "weak",
            MatchTier::Medium => "medium",
            MatchTier::Strong => "strong",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_are_inclusive() {
        assert_eq!(MatchTier::from_score(0.90), MatchTier::Strong);
        assert_eq!(MatchTier::from_score(0.8999), MatchTier::Medium);
        assert_eq!(MatchTier::from_score(0.80), MatchTier::Medium);
        assert_eq!(MatchTier::from_score(0.70), MatchTier::Weak);
        assert_eq!(MatchTier::from_score(0.6999), MatchTier::None);
        assert_eq!(MatchTier::from_score(-1.0), MatchTier::None);
        assert_eq!(MatchTier::from_score(f64::NAN), MatchTier::None);
    }

    #[test]
    fn custom_thresholds() {
        let t = TierThresholds {
            strong: 0.99,
            medium: 0.95,
            weak: 0.5,
        };
        assert_eq!(t.classify(0.96), MatchTier::Medium);
        assert_eq!(t.classify(0.6), MatchTier::Weak);
    }

    #[test]
    fn tiers_are_ordered() {
        assert!(MatchTier::Strong > MatchTier::Medium);
        assert!(MatchTier::Weak > MatchTier::None);
        assert_eq!(MatchTier::Medium.to_string(), "medium");
    }
}
