//! Core types for obesity category prediction: the attribute schema, trained
//! encoding tables, feature vector layout and label decoding.

pub mod encoding;
pub mod error;
pub mod features;
pub mod labels;
pub mod record;
pub mod schema;

pub use encoding::{CategoricalAttribute, EncodingRegistry, EncodingTable, UNKNOWN_CODE, encode};
pub use error::{EncodingError, SchemaError, ShapeError};
pub use features::{
    Assembled, FEATURE_COUNT, FEATURE_ORDER, Feature, FeatureVector, NUMERIC_FEATURE_COUNT,
    UnknownCategory, assemble,
};
pub use labels::{Decoded, ObesityCategory, UNKNOWN_RESULT, decode};
pub use record::{InputRecord, NumericAttribute};
