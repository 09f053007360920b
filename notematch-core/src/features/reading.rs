//! IndicatorReading: the optional indicator values attached to one candle.

use serde::{Deserialize, Serialize};

use crate::domain::{MacdCross, RsiZone, TrendLabel};

/// Indicator values for a single candle. Every field is optional.
///
/// The builder applies all default-substitution rules, so callers pass
/// whatever they have. Non-finite numbers are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorReading {
    /// Explicit trend label from the caller's own trend classifier.
    pub trend: Option<TrendLabel>,
    /// Moving average level at this candle.
    pub ma_value: Option<f64>,
    /// Moving average slope, percent per candle.
    pub ma_slope_pct: Option<f64>,
    /// Average true range in price units.
    pub atr: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub macd_cross: Option<MacdCross>,
    /// Raw RSI on the 0-100 scale.
    pub rsi: Option<f64>,
    pub rsi_zone: Option<RsiZone>,
    /// Pre-computed Bollinger %B.
    pub bb_percent_b: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_lower: Option<f64>,
    /// Pre-computed bandwidth as a fraction of price.
    pub bb_bandwidth: Option<f64>,
}

impl IndicatorReading {
    pub(crate) fn ma_value(&self) -> Option<f64> {
        finite(self.ma_value).filter(|v| *v > 0.0)
    }

    pub(crate) fn ma_slope_pct(&self) -> Option<f64> {
        finite(self.ma_slope_pct)
    }

    pub(crate) fn atr(&self) -> Option<f64> {
        finite(self.atr).filter(|v| *v >= 0.0)
    }

    pub(crate) fn macd_histogram(&self) -> Option<f64> {
        finite(self.macd_histogram)
    }

    pub(crate) fn rsi(&self) -> Option<f64> {
        finite(self.rsi)
    }

    pub(crate) fn bb_percent_b(&self) -> Option<f64> {
        finite(self.bb_percent_b)
    }

    pub(crate) fn bb_bands(&self) -> Option<(f64, f64)> {
        match (finite(self.bb_upper), finite(self.bb_lower)) {
            (Some(upper), Some(lower)) if upper >= lower => Some((upper, lower)),
            _ => None,
        }
    }

    pub(crate) fn bb_middle(&self) -> Option<f64> {
        finite(self.bb_middle).filter(|v| *v > 0.0)
    }

    pub(crate) fn bb_bandwidth(&self) -> Option<f64> {
        finite(self.bb_bandwidth).filter(|v| *v >= 0.0)
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_finite_fields_read_as_absent() {
        let reading = IndicatorReading {
            rsi: Some(f64::NAN),
            macd_histogram: Some(f64::INFINITY),
            ma_value: Some(-1.0),
            ..Default::default()
        };
        assert_eq!(reading.rsi(), None);
        assert_eq!(reading.macd_histogram(), None);
        assert_eq!(reading.ma_value(), None);
    }

    #[test]
    fn inverted_bands_are_ignored() {
        let reading = IndicatorReading {
            bb_upper: Some(99.0),
            bb_lower: Some(101.0),
            ..Default::default()
        };
        assert_eq!(reading.bb_bands(), None);
    }

    #[test]
    fn partial_json_deserializes() {
        let reading: IndicatorReading =
            serde_json::from_str(r#"{"rsi": 72.5, "rsi_zone": "overbought"}"#).unwrap();
        assert_eq!(reading.rsi, Some(72.5));
        assert_eq!(reading.rsi_zone, Some(RsiZone::Overbought));
        assert_eq!(reading.trend, None);
    }
}
