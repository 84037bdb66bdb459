//! Obesity categories and class-index decoding.

use std::fmt;

use serde::{Serialize, Serializer};

/// Label returned for a class index the decoder does not know.
pub const UNKNOWN_RESULT: &str = "Unknown";

/// The seven categories the classifier was trained on, in class-index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObesityCategory {
    Underweight,
    NormalWeight,
    OverweightLevelI,
    OverweightLevelII,
    ObesityTypeI,
    ObesityTypeII,
    ObesityTypeIII,
}

impl ObesityCategory {
    pub const ALL: [Self; 7] = [
        Self::Underweight,
        Self::NormalWeight,
        Self::OverweightLevelI,
        Self::OverweightLevelII,
        Self::ObesityTypeI,
        Self::ObesityTypeII,
        Self::ObesityTypeIII,
    ];

    pub fn from_index(index: i64) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn index(&self) -> i64 {
        *self as i64
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Underweight => "Underweight",
            Self::NormalWeight => "Normal Weight",
            Self::OverweightLevelI => "Overweight Level I",
            Self::OverweightLevelII => "Overweight Level II",
            Self::ObesityTypeI => "Obesity Type I",
            Self::ObesityTypeII => "Obesity Type II",
            Self::ObesityTypeIII => "Obesity Type III",
        }
    }
}

impl fmt::Display for ObesityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded class index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    Category(ObesityCategory),
    /// The model produced an index outside the category table.
    Unrecognized(i64),
}

impl Decoded {
    /// Human-readable label; [`UNKNOWN_RESULT`] for unrecognized indices.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Category(c) => c.as_str(),
            Self::Unrecognized(_) => UNKNOWN_RESULT,
        }
    }

    pub fn category(&self) -> Option<ObesityCategory> {
        match self {
            Self::Category(c) => Some(*c),
            Self::Unrecognized(_) => None,
        }
    }

    pub fn is_recognized(&self) -> bool {
        matches!(self, Self::Category(_))
    }

    pub fn class_index(&self) -> i64 {
        match self {
            Self::Category(c) => c.index(),
            Self::Unrecognized(i) => *i,
        }
    }
}

impl fmt::Display for Decoded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Decoded {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Map a class index to its category. Never fails.
pub fn decode(index: i64) -> Decoded {
    ObesityCategory::from_index(index).map_or(Decoded::Unrecognized(index), Decoded::Category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_all_known_indices() {
        let expected = [
            "Underweight",
            "Normal Weight",
            "Overweight Level I",
            "Overweight Level II",
            "Obesity Type I",
            "Obesity Type II",
            "Obesity Type III",
        ];
        for (i, label) in expected.iter().enumerate() {
            let d = decode(i as i64);
            assert_eq!(d.label(), *label);
            assert!(d.is_recognized());
            assert_eq!(d.class_index(), i as i64);
        }
    }

    #[test]
    fn unknown_indices_use_sentinel() {
        for index in [7, 12, 99, -1, i64::MIN, i64::MAX] {
            let d = decode(index);
            assert_eq!(d, Decoded::Unrecognized(index));
            assert_eq!(d.label(), UNKNOWN_RESULT);
            assert!(!d.is_recognized());
            assert!(d.category().is_none());
            assert_eq!(d.class_index(), index);
        }
    }

    #[test]
    fn sentinel_is_not_a_category_label() {
        assert!(ObesityCategory::ALL.iter().all(|c| c.as_str() != UNKNOWN_RESULT));
    }

    #[test]
    fn index_roundtrip() {
        for c in ObesityCategory::ALL {
            assert_eq!(ObesityCategory::from_index(c.index()), Some(c));
        }
    }

    #[test]
    fn serializes_as_label() {
        assert_eq!(
            serde_json::to_string(&decode(4)).unwrap(),
            "\"Obesity Type I\""
        );
        assert_eq!(serde_json::to_string(&decode(12)).unwrap(), "\"Unknown\"");
    }
}
