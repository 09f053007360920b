//! FeatureVectorBuilder: candle + indicator reading → 12-D feature vector.
//!
//! Pure and total: every missing or non-finite input degrades to the neutral
//! constant for its dimension (see [`NEUTRAL`]); nothing here returns an error.
//!
//! Layout:
//! - 0..=2  trend direction, strength, alignment
//! - 3..=4  MACD momentum (tanh-squashed), crossover state
//! - 5..=6  RSI level, RSI zone
//! - 7..=8  Bollinger %B, bandwidth
//! - 9..=10 candle body ratio, candle direction
//! - 11     session flag

use chrono::{DateTime, Utc};

use crate::config::FeatureConfig;
use crate::domain::{Candle, MarketObservation, RsiZone};
use crate::features::reading::IndicatorReading;
use crate::features::session::session_flag;
use crate::features::vector::{dim, FeatureVector, NEUTRAL};

/// Builds feature vectors with a fixed normalization config.
#[derive(Debug, Clone, Default)]
pub struct FeatureVectorBuilder {
    config: FeatureConfig,
}

impl FeatureVectorBuilder {
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Build a vector for one candle. `timestamp` drives the session flag only;
    /// pass `None` for the neutral session value.
    pub fn build(
        &self,
        candle: &Candle,
        indicators: &IndicatorReading,
        timestamp: Option<DateTime<Utc>>,
    ) -> FeatureVector {
        let mut v = NEUTRAL;

        let trend = self.trend(candle, indicators);
        v[dim::TREND_DIRECTION] = trend.direction;
        v[dim::TREND_STRENGTH] = trend.strength;
        v[dim::TREND_ALIGNMENT] = trend.alignment;

        v[dim::MACD_MOMENTUM] = self.macd_momentum(indicators);
        v[dim::MACD_CROSS] = indicators
            .macd_cross
            .map(|c| c.encode())
            .unwrap_or(NEUTRAL[dim::MACD_CROSS]);

        v[dim::RSI_LEVEL] = self.rsi_level(indicators);
        v[dim::RSI_ZONE] = self.rsi_zone(indicators);

        v[dim::BB_POSITION] = self.bollinger_position(candle, indicators);
        v[dim::BB_BANDWIDTH] = self.bollinger_bandwidth(candle, indicators);

        let (body, direction) = self.candle_shape(candle);
        v[dim::CANDLE_BODY] = body;
        v[dim::CANDLE_DIRECTION] = direction;

        v[dim::SESSION] = session_flag(timestamp, &self.config.session);

        FeatureVector::from_components(v)
    }

    /// Build from an observation, using the candle's own timestamp for the session.
    pub fn build_observation(&self, observation: &MarketObservation) -> FeatureVector {
        self.build(
            &observation.candle,
            &observation.indicators,
            Some(observation.candle.timestamp),
        )
    }

    fn trend(&self, candle: &Candle, reading: &IndicatorReading) -> TrendFeatures {
        let cfg = &self.config;
        let close = Some(candle.close).filter(|c| c.is_finite() && *c > 0.0);
        let slope = reading.ma_slope_pct();
        let deviation = match (close, reading.ma_value()) {
            (Some(c), Some(ma)) => Some((c - ma) / ma),
            _ => None,
        };
        let label = reading.trend.map(|t| t.direction());

        let direction = if let Some(s) = slope {
            ratio(s, cfg.slope_saturation).clamp(-1.0, 1.0)
        } else if let Some(dev) = deviation {
            ratio(dev, cfg.ma_deviation_reference).clamp(-1.0, 1.0)
        } else {
            label.unwrap_or(NEUTRAL[dim::TREND_DIRECTION])
        };

        let strength = if let Some(s) = slope {
            ratio(s.abs(), cfg.slope_saturation).min(1.0)
        } else if let (Some(atr), Some(c)) = (reading.atr(), close) {
            ratio(atr / c, cfg.atr_reference).min(1.0)
        } else if let Some(dev) = deviation {
            ratio(dev.abs(), cfg.ma_deviation_reference).min(1.0)
        } else {
            NEUTRAL[dim::TREND_STRENGTH]
        };

        let slope_sign = slope.map(sign);
        let position_sign = deviation.map(sign);
        let label_sign = label.map(sign);
        let alignment = agreement_half(slope_sign, position_sign.or(label_sign))
            + agreement_half(position_sign, label_sign.or(slope_sign));

        TrendFeatures {
            direction,
            strength,
            alignment,
        }
    }

    fn macd_momentum(&self, reading: &IndicatorReading) -> f64 {
        match reading.macd_histogram() {
            Some(h) => ratio(h, self.config.macd_scale).tanh(),
            None => NEUTRAL[dim::MACD_MOMENTUM],
        }
    }

    fn rsi_level(&self, reading: &IndicatorReading) -> f64 {
        match reading.rsi() {
            Some(rsi) => (rsi / 100.0).clamp(0.0, 1.0),
            None => NEUTRAL[dim::RSI_LEVEL],
        }
    }

    fn rsi_zone(&self, reading: &IndicatorReading) -> f64 {
        if let Some(zone) = reading.rsi_zone {
            return zone.encode();
        }
        match reading.rsi() {
            Some(rsi) => {
                RsiZone::from_rsi(rsi, self.config.rsi_overbought, self.config.rsi_oversold)
                    .encode()
            }
            None => NEUTRAL[dim::RSI_ZONE],
        }
    }

    fn bollinger_position(&self, candle: &Candle, reading: &IndicatorReading) -> f64 {
        if let Some(pb) = reading.bb_percent_b() {
            return pb.clamp(0.0, 1.0);
        }
        match reading.bb_bands() {
            Some((upper, lower)) if candle.close.is_finite() => {
                let width = upper - lower;
                if width > 0.0 {
                    ((candle.close - lower) / width).clamp(0.0, 1.0)
                } else {
                    NEUTRAL[dim::BB_POSITION]
                }
            }
            _ => NEUTRAL[dim::BB_POSITION],
        }
    }

    /// Bandwidth as a fraction of price, rescaled so `bandwidth_ceiling` maps
    /// to 1.0. Wider bands saturate at 1.0.
    fn bollinger_bandwidth(&self, candle: &Candle, reading: &IndicatorReading) -> f64 {
        let ceiling = self.config.bandwidth_ceiling;
        if let Some(bw) = reading.bb_bandwidth() {
            return ratio(bw, ceiling).min(1.0);
        }
        let Some((upper, lower)) = reading.bb_bands() else {
            return NEUTRAL[dim::BB_BANDWIDTH];
        };
        let price = reading
            .bb_middle()
            .or(Some(candle.close).filter(|c| c.is_finite() && *c > 0.0));
        match price {
            Some(p) => ratio((upper - lower) / p, ceiling).min(1.0),
            None => NEUTRAL[dim::BB_BANDWIDTH],
        }
    }

    /// Body ratio and direction from OHLC only. A zero-range candle is a doji
    /// with ratio 0.
    fn candle_shape(&self, candle: &Candle) -> (f64, f64) {
        let range = candle.range();
        if candle.is_void() || range <= 0.0 {
            return (0.0, 0.5);
        }
        let body = ((candle.close - candle.open).abs() / range).min(1.0);
        let direction = if body < self.config.doji_threshold {
            0.5
        } else if candle.close > candle.open {
            1.0
        } else {
            0.0
        };
        (body, direction)
    }
}

struct TrendFeatures {
    direction: f64,
    strength: f64,
    alignment: f64,
}

/// Half of the alignment score: 0.5 on agreement, 0 on disagreement, 0.25
/// when either side is unknown.
fn agreement_half(subject: Option<f64>, reference: Option<f64>) -> f64 {
    match (subject, reference) {
        (Some(a), Some(b)) if a == b => 0.5,
        (Some(_), Some(_)) => 0.0,
        _ => 0.25,
    }
}

fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// `value / scale`, or 0 when the scale is unusable.
fn ratio(value: f64, scale: f64) -> f64 {
    if scale > 0.0 && scale.is_finite() {
        value / scale
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MacdCross, TrendLabel};
    use chrono::TimeZone;

    fn candle(open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap(),
            open,
            high,
            low,
            close,
            volume: 1000.0,
        }
    }

    fn build(c: &Candle, r: &IndicatorReading) -> FeatureVector {
        FeatureVectorBuilder::default().build(c, r, None)
    }

    #[test]
    fn empty_reading_gives_neutral_indicator_dims() {
        let v = build(&candle(100.0, 100.0, 100.0, 100.0), &IndicatorReading::default());
        assert_eq!(v, FeatureVector::neutral());
    }

    #[test]
    fn rsi_seventy_is_exactly_point_seven_and_overbought() {
        let r = IndicatorReading {
            rsi: Some(70.0),
            ..Default::default()
        };
        let v = build(&candle(100.0, 101.0, 99.0, 100.5), &r);
        assert_eq!(v[dim::RSI_LEVEL], 0.70);
        assert_eq!(v[dim::RSI_ZONE], 1.0);
    }

    #[test]
    fn rsi_thirty_is_oversold() {
        let r = IndicatorReading {
            rsi: Some(30.0),
            ..Default::default()
        };
        let v = build(&candle(100.0, 101.0, 99.0, 100.5), &r);
        assert_eq!(v[dim::RSI_ZONE], 0.0);
    }

    #[test]
    fn explicit_zone_wins_over_raw_rsi() {
        let r = IndicatorReading {
            rsi: Some(80.0),
            rsi_zone: Some(RsiZone::Neutral),
            ..Default::default()
        };
        let v = build(&candle(100.0, 101.0, 99.0, 100.5), &r);
        assert_eq!(v[dim::RSI_ZONE], 0.5);
        assert_eq!(v[dim::RSI_LEVEL], 0.8);
    }

    #[test]
    fn rsi_out_of_range_is_clamped() {
        let r = IndicatorReading {
            rsi: Some(140.0),
            ..Default::default()
        };
        let v = build(&candle(100.0, 101.0, 99.0, 100.5), &r);
        assert_eq!(v[dim::RSI_LEVEL], 1.0);
    }

    #[test]
    fn candle_direction_encoding() {
        let r = IndicatorReading::default();
        // body 0.8 of range, bullish
        assert_eq!(build(&candle(100.0, 105.0, 100.0, 104.0), &r)[dim::CANDLE_DIRECTION], 1.0);
        // bearish
        assert_eq!(build(&candle(104.0, 105.0, 100.0, 100.0), &r)[dim::CANDLE_DIRECTION], 0.0);
        // doji: body 0.02 of range
        let doji = build(&candle(100.0, 105.0, 95.0, 100.2), &r);
        assert_eq!(doji[dim::CANDLE_DIRECTION], 0.5);
        assert!((doji[dim::CANDLE_BODY] - 0.02).abs() < 1e-12);
    }

    #[test]
    fn zero_range_candle_is_neutral() {
        let v = build(&candle(100.0, 100.0, 100.0, 100.0), &IndicatorReading::default());
        assert_eq!(v[dim::CANDLE_BODY], 0.0);
        assert_eq!(v[dim::CANDLE_DIRECTION], 0.5);
    }

    #[test]
    fn macd_histogram_is_tanh_squashed() {
        let r = IndicatorReading {
            macd_histogram: Some(25.0),
            macd_cross: Some(MacdCross::Bullish),
            ..Default::default()
        };
        let v = build(&candle(100.0, 101.0, 99.0, 100.5), &r);
        assert!((v[dim::MACD_MOMENTUM] - (0.5f64).tanh()).abs() < 1e-12);
        assert_eq!(v[dim::MACD_CROSS], 1.0);

        let huge = IndicatorReading {
            macd_histogram: Some(-1e9),
            ..Default::default()
        };
        let v = build(&candle(100.0, 101.0, 99.0, 100.5), &huge);
        assert!(v[dim::MACD_MOMENTUM] >= -1.0 && v[dim::MACD_MOMENTUM] < -0.99);
    }

    #[test]
    fn bollinger_from_bands() {
        let r = IndicatorReading {
            bb_upper: Some(102.0),
            bb_middle: Some(100.0),
            bb_lower: Some(98.0),
            ..Default::default()
        };
        let v = build(&candle(100.0, 101.5, 99.0, 101.0), &r);
        assert!((v[dim::BB_POSITION] - 0.75).abs() < 1e-12);
        // width 4 / price 100 = 0.04 → 0.04 / 0.05 = 0.8
        assert!((v[dim::BB_BANDWIDTH] - 0.8).abs() < 1e-12);
    }

    #[test]
    fn wide_bands_saturate_bandwidth() {
        let r = IndicatorReading {
            bb_upper: Some(120.0),
            bb_middle: Some(100.0),
            bb_lower: Some(80.0),
            ..Default::default()
        };
        let v = build(&candle(100.0, 101.5, 99.0, 101.0), &r);
        assert_eq!(v[dim::BB_BANDWIDTH], 1.0);
    }

    #[test]
    fn precomputed_percent_b_is_clamped() {
        let r = IndicatorReading {
            bb_percent_b: Some(1.4),
            ..Default::default()
        };
        let v = build(&candle(100.0, 101.5, 99.0, 101.0), &r);
        assert_eq!(v[dim::BB_POSITION], 1.0);
    }

    #[test]
    fn trend_from_slope_and_position() {
        let r = IndicatorReading {
            ma_value: Some(100.0),
            ma_slope_pct: Some(0.05),
            ..Default::default()
        };
        let v = build(&candle(101.0, 102.5, 100.5, 102.0), &r);
        assert!((v[dim::TREND_DIRECTION] - 0.5).abs() < 1e-12);
        assert!((v[dim::TREND_STRENGTH] - 0.5).abs() < 1e-12);
        assert_eq!(v[dim::TREND_ALIGNMENT], 1.0);
    }

    #[test]
    fn trend_disagreement_lowers_alignment() {
        let r = IndicatorReading {
            ma_value: Some(105.0),
            ma_slope_pct: Some(0.05),
            ..Default::default()
        };
        let v = build(&candle(101.0, 102.5, 100.5, 102.0), &r);
        assert_eq!(v[dim::TREND_ALIGNMENT], 0.0);
    }

    #[test]
    fn strength_falls_back_to_atr() {
        let r = IndicatorReading {
            atr: Some(1.0),
            ..Default::default()
        };
        let v = build(&candle(100.0, 101.0, 99.0, 100.0), &r);
        // 1/100 = 0.01 → 0.01/0.02 = 0.5
        assert!((v[dim::TREND_STRENGTH] - 0.5).abs() < 1e-12);
        assert_eq!(v[dim::TREND_DIRECTION], 0.0);
        assert_eq!(v[dim::TREND_ALIGNMENT], 0.5);
    }

    #[test]
    fn label_only_trend() {
        let r = IndicatorReading {
            trend: Some(TrendLabel::Down),
            ..Default::default()
        };
        let v = build(&candle(100.0, 101.0, 99.0, 100.0), &r);
        assert_eq!(v[dim::TREND_DIRECTION], -1.0);
        assert_eq!(v[dim::TREND_ALIGNMENT], 0.5);
    }

    #[test]
    fn session_uses_observation_timestamp() {
        let obs = MarketObservation::bare(candle(100.0, 101.0, 99.0, 100.5));
        let v = FeatureVectorBuilder::default().build_observation(&obs);
        assert_eq!(v[dim::SESSION], 0.5); // 09:00 UTC → London
        let late = MarketObservation::bare(Candle {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 15, 0, 0).unwrap(),
            ..candle(100.0, 101.0, 99.0, 100.5)
        });
        assert_eq!(FeatureVectorBuilder::default().build_observation(&late)[dim::SESSION], 0.8);
    }

    #[test]
    fn identical_inputs_are_bit_identical() {
        let r = IndicatorReading {
            rsi: Some(55.5),
            macd_histogram: Some(3.3),
            ma_value: Some(99.0),
            ma_slope_pct: Some(-0.02),
            ..Default::default()
        };
        let c = candle(100.0, 101.0, 99.0, 100.5);
        assert_eq!(build(&c, &r), build(&c, &r));
    }
}
