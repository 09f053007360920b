//! Feature extraction: candle + indicators → fixed-width normalized vector.

pub mod builder;
pub mod legacy;
pub mod reading;
pub mod session;
pub mod vector;

pub use builder::FeatureVectorBuilder;
pub use legacy::{convert_legacy_vector, LegacyFormat};
pub use reading::IndicatorReading;
pub use vector::{dim, is_valid_vector, is_valid_vector_value, FeatureVector, FEATURE_DIM, NEUTRAL};
