//! FeatureVector: the fixed 12-dimension normalized encoding of a market state.

use serde::{Deserialize, Serialize};
use std::ops::Index;

use crate::error::VectorError;

/// Number of dimensions in the current vector schema.
pub const FEATURE_DIM: usize = 12;

/// Dimension indices, in schema order.
pub mod dim {
    pub const TREND_DIRECTION: usize = 0;
    pub const TREND_STRENGTH: usize = 1;
    pub const TREND_ALIGNMENT: usize = 2;
    pub const MACD_MOMENTUM: usize = 3;
    pub const MACD_CROSS: usize = 4;
    pub const RSI_LEVEL: usize = 5;
    pub const RSI_ZONE: usize = 6;
    pub const BB_POSITION: usize = 7;
    pub const BB_BANDWIDTH: usize = 8;
    pub const CANDLE_BODY: usize = 9;
    pub const CANDLE_DIRECTION: usize = 10;
    pub const SESSION: usize = 11;
}

/// Value each dimension takes when its input is unavailable.
///
/// Directional fields default to 0, zone-like and position fields to 0.5.
pub const NEUTRAL: [f64; FEATURE_DIM] = [
    0.0, // trend direction
    0.0, // trend strength
    0.5, // trend alignment (0.25 + 0.25)
    0.0, // macd momentum
    0.5, // macd cross: none
    0.5, // rsi level
    0.5, // rsi zone: neutral
    0.5, // bollinger %B
    0.5, // bollinger bandwidth
    0.0, // candle body ratio
    0.5, // candle direction: doji
    0.5, // session: unknown
];

/// Immutable 12-dimension feature vector. Every component is finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct FeatureVector([f64; FEATURE_DIM]);

impl FeatureVector {
    /// Build from raw components, substituting the neutral default for any
    /// non-finite value.
    pub fn from_components(values: [f64; FEATURE_DIM]) -> Self {
        let mut out = values;
        for (i, v) in out.iter_mut().enumerate() {
            if !v.is_finite() {
                *v = NEUTRAL[i];
            }
        }
        Self(out)
    }

    /// The all-neutral vector.
    pub fn neutral() -> Self {
        Self(NEUTRAL)
    }

    /// Strict construction: exactly 12 finite numbers.
    pub fn try_from_slice(values: &[f64]) -> Result<Self, VectorError> {
        if values.len() != FEATURE_DIM {
            return Err(VectorError::InvalidVectorDimension { len: values.len() });
        }
        let mut out = [0.0; FEATURE_DIM];
        for (i, &v) in values.iter().enumerate() {
            if !v.is_finite() {
                return Err(VectorError::NonFinite { index: i });
            }
            out[i] = v;
        }
        Ok(Self(out))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn to_array(self) -> [f64; FEATURE_DIM] {
        self.0
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }
}

impl Index<usize> for FeatureVector {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

impl TryFrom<Vec<f64>> for FeatureVector {
    type Error = VectorError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::try_from_slice(&values)
    }
}

impl From<FeatureVector> for Vec<f64> {
    fn from(v: FeatureVector) -> Self {
        v.0.to_vec()
    }
}

impl AsRef<[f64]> for FeatureVector {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

/// True only for exactly 12 finite numbers.
pub fn is_valid_vector(values: &[f64]) -> bool {
    values.len() == FEATURE_DIM && values.iter().all(|v| v.is_finite())
}

/// Validation for loosely typed input from collaborators (stored JSON).
///
/// Rejects null, non-arrays, non-numeric entries, wrong length. JSON cannot
/// carry NaN, but a number that does not fit an `f64` is rejected too.
pub fn is_valid_vector_value(value: &serde_json::Value) -> bool {
    let Some(items) = value.as_array() else {
        return false;
    };
    items.len() == FEATURE_DIM
        && items
            .iter()
            .all(|item| item.as_f64().is_some_and(|v| v.is_finite()))
}
