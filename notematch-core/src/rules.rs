//! Rule confirmation: cosine similarity blended with trend and price checks.
//!
//! Composite score = 0.6 × similarity + 0.3 × trend match + 0.1 × price in
//! range (weights from [`RuleWeights`]), clamped to [0, 1].
//!
//! `reasons` is always three lines in this order: numeric score, trend
//! agreement, price-range agreement. Display layers depend on the order.

use serde::{Deserialize, Serialize};

use crate::config::{MatchConfig, RuleWeights};
use crate::domain::{AnchorPattern, MarketObservation, TrendLabel};
use crate::features::{dim, FeatureVector, FeatureVectorBuilder};
use crate::similarity::SimilarityEvaluator;

/// Output of a single anchor-vs-observation evaluation. Never persisted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEvaluation {
    /// Composite score in [0, 1].
    pub score: f64,
    /// Raw cosine similarity in [-1, 1].
    pub similarity: f64,
    pub trend_matched: bool,
    pub price_range_matched: bool,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RuleConfirmationLayer {
    builder: FeatureVectorBuilder,
    evaluator: SimilarityEvaluator,
    weights: RuleWeights,
}

impl RuleConfirmationLayer {
    pub fn new(config: &MatchConfig) -> Self {
        Self {
            builder: FeatureVectorBuilder::new(config.features.clone()),
            evaluator: SimilarityEvaluator::new(config.tiers),
            weights: config.rules,
        }
    }

    pub fn builder(&self) -> &FeatureVectorBuilder {
        &self.builder
    }

    pub fn evaluator(&self) -> &SimilarityEvaluator {
        &self.evaluator
    }

    /// Score a live observation against an anchor.
    pub fn score(&self, anchor: &AnchorPattern, observation: &MarketObservation) -> MatchEvaluation {
        let vector = self.builder.build_observation(observation);
        let current_trend = observation
            .indicators
            .trend
            .or_else(|| self.trend_of(&vector));
        self.confirm(anchor, &vector, current_trend, observation.candle.close)
    }

    /// Score an already-built vector. Used by the simulator, which derives
    /// its own vectors.
    pub fn confirm(
        &self,
        anchor: &AnchorPattern,
        vector: &FeatureVector,
        current_trend: Option<TrendLabel>,
        close: f64,
    ) -> MatchEvaluation {
        let w = &self.weights;
        let similarity = self
            .evaluator
            .cosine(anchor.feature_vector.as_slice(), vector.as_slice());
        let tier = self.evaluator.tier(similarity);

        let anchor_trend = anchor.trend_label(w.trend_dead_zone);
        let trend_matched = matches!((anchor_trend, current_trend), (Some(a), Some(c)) if a == c);

        let deviation = price_deviation(close, anchor.entry_price);
        let price_range_matched = deviation.is_some_and(|d| d < w.price_tolerance);

        let raw = w.similarity * similarity
            + w.trend * indicator(trend_matched)
            + w.price_range * indicator(price_range_matched);
        let score = if raw.is_finite() { raw.clamp(0.0, 1.0) } else { 0.0 };

        let reasons = vec![
            format!("similarity {similarity:.4} ({tier})"),
            trend_reason(trend_matched, anchor_trend, current_trend),
            price_reason(price_range_matched, deviation, w.price_tolerance),
        ];

        MatchEvaluation {
            score,
            similarity,
            trend_matched,
            price_range_matched,
            reasons,
        }
    }

    /// Trend label implied by a vector's direction dimension.
    pub fn trend_of(&self, vector: &FeatureVector) -> Option<TrendLabel> {
        TrendLabel::from_direction(vector[dim::TREND_DIRECTION], self.weights.trend_dead_zone)
    }
}

/// |close - entry| / entry, or `None` when either price is unusable.
fn price_deviation(close: f64, entry_price: f64) -> Option<f64> {
    if !close.is_finite() || !entry_price.is_finite() || entry_price <= 0.0 {
        return None;
    }
    Some((close - entry_price).abs() / entry_price)
}

fn indicator(flag: bool) -> f64 {
    if flag {
        1.0
    } else {
        0.0
    }
}

fn label_or_unknown(label: Option<TrendLabel>) -> String {
    label.map_or_else(|| "unknown".to_string(), |l| l.to_string())
}

fn trend_reason(matched: bool, anchor: Option<TrendLabel>, current: Option<TrendLabel>) -> String {
    let verdict = if matched { "trend match" } else { "trend mismatch" };
    format!(
        "{verdict}: anchor {}, current {}",
        label_or_unknown(anchor),
        label_or_unknown(current)
    )
}

fn price_reason(matched: bool, deviation: Option<f64>, tolerance: f64) -> String {
    match deviation {
        Some(d) if matched => format!("price within range: {:.2}% from entry", d * 100.0),
        Some(d) => format!(
            "price out of range: {:.2}% from entry (limit {:.2}%)",
            d * 100.0,
            tolerance * 100.0
        ),
        None => "price out of range: deviation unavailable".to_string(),
    }
}
