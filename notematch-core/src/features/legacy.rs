//! Legacy vector schemas (7-, 8- and 18-dimension) and their conversion to
//! the current 12-dimension layout.
//!
//! The index tables below are literal best-effort mappings carried over from
//! the older schemas. They have never been validated against historical data;
//! treat converted anchors as approximations. Target dimensions with no source
//! take the neutral default.

use serde::{Deserialize, Serialize};

use crate::error::VectorError;
use crate::features::vector::{FeatureVector, FEATURE_DIM, NEUTRAL};

/// Schema version of a stored vector, identified by its length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegacyFormat {
    /// trend dir, trend strength, macd hist, rsi, bb %B, body ratio, session
    Dim7,
    /// trend dir, trend strength, macd hist, macd cross, rsi, rsi zone, bb %B, candle dir
    Dim8,
    /// Current layout.
    Dim12,
    /// Expanded schema with wicks, volume, stochastics and ATR.
    Dim18,
}

/// Source index in the legacy vector for each of the 12 current dimensions.
type IndexMap = [Option<usize>; FEATURE_DIM];

const MAP_7: IndexMap = [
    Some(0), // trend direction
    Some(1), // trend strength
    None,    // trend alignment
    Some(2), // macd momentum
    None,    // macd cross
    Some(3), // rsi level
    None,    // rsi zone
    Some(4), // bb %B
    None,    // bb bandwidth
    Some(5), // candle body
    None,    // candle direction
    Some(6), // session
];

const MAP_8: IndexMap = [
    Some(0),
    Some(1),
    None,
    Some(2),
    Some(3),
    Some(4),
    Some(5),
    Some(6),
    None,
    None,
    Some(7),
    None,
];

// 18-D: 0 dir, 1 strength, 2 alignment, 3 macd hist, 4 macd cross, 5 macd line,
// 6 rsi, 7 rsi zone, 8 stoch, 9 bb %B, 10 bandwidth, 11 atr, 12 body,
// 13 candle dir, 14 upper wick, 15 lower wick, 16 volume, 17 session
const MAP_18: IndexMap = [
    Some(0),
    Some(1),
    Some(2),
    Some(3),
    Some(4),
    Some(6),
    Some(7),
    Some(9),
    Some(10),
    Some(12),
    Some(13),
    Some(17),
];

impl LegacyFormat {
    pub fn from_len(len: usize) -> Result<Self, VectorError> {
        match len {
            7 => Ok(LegacyFormat::Dim7),
            8 => Ok(LegacyFormat::Dim8),
            12 => Ok(LegacyFormat::Dim12),
            18 => Ok(LegacyFormat::Dim18),
            _ => Err(VectorError::InvalidVectorDimension { len }),
        }
    }

    pub fn dimension(self) -> usize {
        match self {
            LegacyFormat::Dim7 => 7,
            LegacyFormat::Dim8 => 8,
            LegacyFormat::Dim12 => 12,
            LegacyFormat::Dim18 => 18,
        }
    }

    fn index_map(self) -> IndexMap {
        match self {
            LegacyFormat::Dim7 => MAP_7,
            LegacyFormat::Dim8 => MAP_8,
            LegacyFormat::Dim12 => std::array::from_fn(Some),
            LegacyFormat::Dim18 => MAP_18,
        }
    }
}

/// Convert a stored vector of length 7, 8, 12 or 18 to the current layout.
///
/// Any other length is `InvalidVectorDimension`. Non-finite source values
/// become the neutral default of their target dimension.
pub fn convert_legacy_vector(values: &[f64]) -> Result<FeatureVector, VectorError> {
    let format = LegacyFormat::from_len(values.len())?;
    let map = format.index_map();
    let mut out = NEUTRAL;
    for (target, source) in map.iter().enumerate() {
        if let Some(src) = source {
            out[target] = values[*src];
        }
    }
    Ok(FeatureVector::from_components(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::vector::dim;

    fn ramp(len: usize) -> Vec<f64> {
        (0..len).map(|i| i as f64 / 100.0).collect()
    }

    #[test]
    fn every_legacy_length_yields_twelve_dims() {
        for len in [7, 8, 12, 18] {
            let v = convert_legacy_vector(&ramp(len)).unwrap();
            assert_eq!(v.as_slice().len(), FEATURE_DIM, "len {len}");
        }
    }

    #[test]
    fn other_lengths_are_rejected() {
        for len in [0, 1, 6, 9, 11, 13, 17, 19, 24] {
            assert_eq!(
                convert_legacy_vector(&ramp(len)),
                Err(VectorError::InvalidVectorDimension { len }),
            );
        }
    }

    #[test]
    fn twelve_is_identity() {
        let raw = ramp(12);
        let v = convert_legacy_vector(&raw).unwrap();
        assert_eq!(v.as_slice(), raw.as_slice());
    }

    #[test]
    fn seven_dim_mapping() {
        let v = convert_legacy_vector(&ramp(7)).unwrap();
        assert_eq!(v[dim::TREND_DIRECTION], 0.0);
        assert_eq!(v[dim::MACD_MOMENTUM], 0.02);
        assert_eq!(v[dim::RSI_LEVEL], 0.03);
        assert_eq!(v[dim::SESSION], 0.06);
        assert_eq!(v[dim::TREND_ALIGNMENT], NEUTRAL[dim::TREND_ALIGNMENT]);
        assert_eq!(v[dim::CANDLE_DIRECTION], NEUTRAL[dim::CANDLE_DIRECTION]);
    }

    #[test]
    fn eighteen_dim_mapping() {
        let v = convert_legacy_vector(&ramp(18)).unwrap();
        assert_eq!(v[dim::RSI_LEVEL], 0.06);
        assert_eq!(v[dim::CANDLE_BODY], 0.12);
        assert_eq!(v[dim::SESSION], 0.17);
    }

    #[test]
    fn non_finite_legacy_values_become_neutral() {
        let mut raw = ramp(8);
        raw[4] = f64::NAN; // rsi
        let v = convert_legacy_vector(&raw).unwrap();
        assert_eq!(v[dim::RSI_LEVEL], NEUTRAL[dim::RSI_LEVEL]);
    }

    #[test]
    fn format_lengths_round_trip() {
        for format in [
            LegacyFormat::Dim7,
            LegacyFormat::Dim8,
            LegacyFormat::Dim12,
            LegacyFormat::Dim18,
        ] {
            assert_eq!(LegacyFormat::from_len(format.dimension()), Ok(format));
        }
    }
}
