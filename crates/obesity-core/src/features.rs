//! Feature vector assembly.
//!
//! # Layout (16 slots, training order)
//!
//! | Index | Column                           | Kind        |
//! |-------|----------------------------------|-------------|
//! | 0     | Age                              | Numeric     |
//! | 1     | Gender                           | Categorical |
//! | 2     | Height                           | Numeric     |
//! | 3     | Weight                           | Numeric     |
//! | 4     | CALC                             | Categorical |
//! | 5     | FAVC                             | Categorical |
//! | 6     | FCVC                             | Numeric     |
//! | 7     | NCP                              | Numeric     |
//! | 8     | SCC                              | Categorical |
//! | 9     | SMOKE                            | Categorical |
//! | 10    | CH2O                             | Numeric     |
//! | 11    | family_history_with_overweight   | Categorical |
//! | 12    | FAF                              | Numeric     |
//! | 13    | TUE                              | Numeric     |
//! | 14    | CAEC                             | Categorical |
//! | 15    | MTRANS                           | Categorical |
//!
//! The numeric subset handed to the scaler is the numeric slots in
//! [`NumericAttribute::ALL`] order, which is also their order in the layout.

use serde::Serialize;
use tracing::warn;

use crate::encoding::{CategoricalAttribute, EncodingRegistry, UNKNOWN_CODE};
use crate::error::ShapeError;
use crate::record::{InputRecord, NumericAttribute};

/// Total number of slots in a [`FeatureVector`].
pub const FEATURE_COUNT: usize = 16;

/// Number of slots the scaler normalizes.
pub const NUMERIC_FEATURE_COUNT: usize = 8;

/// One slot of the feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Numeric(NumericAttribute),
    Categorical(CategoricalAttribute),
}

/// Slot order the model was trained with.
pub const FEATURE_ORDER: [Feature; FEATURE_COUNT] = [
    Feature::Numeric(NumericAttribute::Age),
    Feature::Categorical(CategoricalAttribute::Gender),
    Feature::Numeric(NumericAttribute::Height),
    Feature::Numeric(NumericAttribute::Weight),
    Feature::Categorical(CategoricalAttribute::AlcoholFrequency),
    Feature::Categorical(CategoricalAttribute::HighCalorieFood),
    Feature::Numeric(NumericAttribute::VegetableFrequency),
    Feature::Numeric(NumericAttribute::MealsPerDay),
    Feature::Categorical(CategoricalAttribute::CalorieTracking),
    Feature::Categorical(CategoricalAttribute::Smoker),
    Feature::Numeric(NumericAttribute::WaterIntake),
    Feature::Categorical(CategoricalAttribute::FamilyHistory),
    Feature::Numeric(NumericAttribute::PhysicalActivity),
    Feature::Numeric(NumericAttribute::ScreenTime),
    Feature::Categorical(CategoricalAttribute::SnackingFrequency),
    Feature::Categorical(CategoricalAttribute::Transportation),
];

impl Feature {
    /// Column name in the training dataset.
    pub fn column_name(&self) -> &'static str {
        match self {
            Self::Numeric(a) => a.column_name(),
            Self::Categorical(a) => a.column_name(),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Numeric(_))
    }

    /// Index of this slot in [`FEATURE_ORDER`].
    pub fn position(&self) -> usize {
        match self {
            Self::Numeric(a) => numeric_position(*a),
            Self::Categorical(a) => match a {
                CategoricalAttribute::Gender => 1,
                CategoricalAttribute::AlcoholFrequency => 4,
                CategoricalAttribute::HighCalorieFood => 5,
                CategoricalAttribute::CalorieTracking => 8,
                CategoricalAttribute::Smoker => 9,
                CategoricalAttribute::FamilyHistory => 11,
                CategoricalAttribute::SnackingFrequency => 14,
                CategoricalAttribute::Transportation => 15,
            },
        }
    }
}

fn numeric_position(attribute: NumericAttribute) -> usize {
    match attribute {
        NumericAttribute::Age => 0,
        NumericAttribute::Height => 2,
        NumericAttribute::Weight => 3,
        NumericAttribute::VegetableFrequency => 6,
        NumericAttribute::MealsPerDay => 7,
        NumericAttribute::WaterIntake => 10,
        NumericAttribute::PhysicalActivity => 12,
        NumericAttribute::ScreenTime => 13,
    }
}

/// Dataset column names in slot order.
pub fn column_names() -> [&'static str; FEATURE_COUNT] {
    FEATURE_ORDER.map(|f| f.column_name())
}

/// Ordered numeric input to the classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.values[feature.position()]
    }

    /// The numeric slots, in scaler order.
    pub fn numeric(&self) -> Vec<f64> {
        NumericAttribute::ALL
            .iter()
            .map(|&a| self.values[numeric_position(a)])
            .collect()
    }

    /// Overwrite the numeric slots, leaving categorical codes untouched.
    pub fn set_numeric(&mut self, values: &[f64]) -> Result<(), ShapeError> {
        if values.len() != NUMERIC_FEATURE_COUNT {
            return Err(ShapeError {
                expected: NUMERIC_FEATURE_COUNT,
                actual: values.len(),
            });
        }
        for (&a, &v) in NumericAttribute::ALL.iter().zip(values) {
            self.values[numeric_position(a)] = v;
        }
        Ok(())
    }
}

/// A categorical answer that fell outside its domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnknownCategory {
    pub attribute: CategoricalAttribute,
    pub value: String,
}

/// Output of [`assemble`].
#[derive(Debug, Clone, PartialEq)]
pub struct Assembled {
    pub vector: FeatureVector,
    /// Categorical fields that were encoded as [`UNKNOWN_CODE`].
    pub unknown: Vec<UnknownCategory>,
}

/// Build the feature vector for `record`.
///
/// Numeric values pass through unchanged, out-of-range ones included.
pub fn assemble(registry: &EncodingRegistry, record: &InputRecord) -> Assembled {
    let mut values = [0.0; FEATURE_COUNT];
    let mut unknown = Vec::new();

    for (slot, feature) in values.iter_mut().zip(FEATURE_ORDER) {
        *slot = match feature {
            Feature::Numeric(a) => record.numeric(a),
            Feature::Categorical(a) => {
                let raw = record.categorical(a);
                let code = registry.encode(a, raw);
                if code == UNKNOWN_CODE {
                    warn!(attribute = %a, value = raw, "unknown category encoded as -1");
                    unknown.push(UnknownCategory {
                        attribute: a,
                        value: raw.to_string(),
                    });
                }
                code as f64
            }
        };
    }

    Assembled {
        vector: FeatureVector { values },
        unknown,
    }
}
