//! Categorical encoding tables.
//!
//! Each categorical answer maps to the integer code the classifier was trained
//! on. The tables are immutable constants; [`EncodingRegistry`] groups them into
//! a single table-of-tables keyed by [`CategoricalAttribute`] and checks them
//! once, at startup, against each attribute's enumerated domain.
//!
//! Values outside a table's domain encode to [`UNKNOWN_CODE`]. The model never
//! saw that code during training, so callers must treat the prediction as
//! unreliable.
//!
//! Note that `snacking_frequency` lists `no` last while `alcohol_frequency`
//! lists it first. Both orders are what the model was trained with.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EncodingError;

/// Sentinel code for a value outside its attribute's domain.
pub const UNKNOWN_CODE: i64 = -1;

/// Attributes answered by picking one option from a fixed list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalAttribute {
    Gender,
    AlcoholFrequency,
    HighCalorieFood,
    Smoker,
    CalorieTracking,
    FamilyHistory,
    SnackingFrequency,
    Transportation,
}

impl CategoricalAttribute {
    pub const ALL: [Self; 8] = [
        Self::Gender,
        Self::AlcoholFrequency,
        Self::HighCalorieFood,
        Self::Smoker,
        Self::CalorieTracking,
        Self::FamilyHistory,
        Self::SnackingFrequency,
        Self::Transportation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gender => "gender",
            Self::AlcoholFrequency => "alcohol_frequency",
            Self::HighCalorieFood => "high_calorie_food",
            Self::Smoker => "smoker",
            Self::CalorieTracking => "calorie_tracking",
            Self::FamilyHistory => "family_history",
            Self::SnackingFrequency => "snacking_frequency",
            Self::Transportation => "transportation",
        }
    }

    /// Column name in the training dataset.
    pub fn column_name(&self) -> &'static str {
        match self {
            Self::Gender => "Gender",
            Self::AlcoholFrequency => "CALC",
            Self::HighCalorieFood => "FAVC",
            Self::Smoker => "SMOKE",
            Self::CalorieTracking => "SCC",
            Self::FamilyHistory => "family_history_with_overweight",
            Self::SnackingFrequency => "CAEC",
            Self::Transportation => "MTRANS",
        }
    }

    /// Enumerated domain in the order the input form offers it.
    ///
    /// The first entry is the form's default selection.
    pub fn domain(&self) -> &'static [&'static str] {
        match self {
            Self::Gender => &["Male", "Female"],
            Self::HighCalorieFood | Self::Smoker | Self::CalorieTracking | Self::FamilyHistory => {
                &["yes", "no"]
            }
            Self::AlcoholFrequency | Self::SnackingFrequency => {
                &["no", "Sometimes", "Frequently", "Always"]
            }
            Self::Transportation => &[
                "Public_Transportation",
                "Automobile",
                "Walking",
                "Motorbike",
                "Bike",
            ],
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for CategoricalAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One attribute's value → code mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingTable {
    attribute: CategoricalAttribute,
    entries: &'static [(&'static str, i64)],
}

const NO_YES: &[(&str, i64)] = &[("no", 0), ("yes", 1)];

/// The trained encodings, one table per categorical attribute.
pub const TABLES: [EncodingTable; 8] = [
    EncodingTable::new(CategoricalAttribute::Gender, &[("Male", 0), ("Female", 1)]),
    EncodingTable::new(
        CategoricalAttribute::AlcoholFrequency,
        &[("no", 0), ("Sometimes", 1), ("Frequently", 2), ("Always", 3)],
    ),
    EncodingTable::new(CategoricalAttribute::HighCalorieFood, NO_YES),
    EncodingTable::new(CategoricalAttribute::Smoker, NO_YES),
    EncodingTable::new(CategoricalAttribute::CalorieTracking, NO_YES),
    EncodingTable::new(CategoricalAttribute::FamilyHistory, NO_YES),
    EncodingTable::new(
        CategoricalAttribute::SnackingFrequency,
        &[("Sometimes", 0), ("Frequently", 1), ("Always", 2), ("no", 3)],
    ),
    EncodingTable::new(
        CategoricalAttribute::Transportation,
        &[
            ("Public_Transportation", 0),
            ("Automobile", 1),
            ("Walking", 2),
            ("Motorbike", 3),
            ("Bike", 4),
        ],
    ),
];

impl EncodingTable {
    pub const fn new(
        attribute: CategoricalAttribute,
        entries: &'static [(&'static str, i64)],
    ) -> Self {
        Self { attribute, entries }
    }

    pub fn attribute(&self) -> CategoricalAttribute {
        self.attribute
    }

    /// `(value, code)` pairs in code-declaration order.
    pub fn entries(&self) -> &'static [(&'static str, i64)] {
        self.entries
    }

    /// Code for `value`, or [`UNKNOWN_CODE`] when it is not in the domain.
    ///
    /// Matching is exact and case-sensitive.
    pub fn encode(&self, value: &str) -> i64 {
        self.entries
            .iter()
            .find(|(v, _)| *v == value)
            .map_or(UNKNOWN_CODE, |&(_, code)| code)
    }

    fn validate(&self) -> Result<(), EncodingError> {
        let expected: BTreeSet<&str> = self.attribute.domain().iter().copied().collect();
        let found: BTreeSet<&str> = self.entries.iter().map(|(v, _)| *v).collect();
        if expected != found || found.len() != self.entries.len() {
            return Err(EncodingError::DomainMismatch {
                attribute: self.attribute,
                expected: expected.iter().map(|s| s.to_string()).collect(),
                found: self.entries.iter().map(|(v, _)| v.to_string()).collect(),
            });
        }

        let mut codes: Vec<i64> = self.entries.iter().map(|&(_, c)| c).collect();
        codes.sort_unstable();
        let dense = codes.iter().zip(0i64..).all(|(&c, i)| c == i);
        if !dense {
            return Err(EncodingError::NonDenseCodes {
                attribute: self.attribute,
                codes,
            });
        }
        Ok(())
    }
}

/// Encode `value` for `attribute` using the trained tables.
pub fn encode(attribute: CategoricalAttribute, value: &str) -> i64 {
    TABLES[attribute.index()].encode(value)
}

/// Validated table-of-tables, one entry per [`CategoricalAttribute`].
#[derive(Debug, Clone)]
pub struct EncodingRegistry {
    tables: [EncodingTable; 8],
}

impl EncodingRegistry {
    /// Build the registry over the trained [`TABLES`].
    pub fn new() -> Result<Self, EncodingError> {
        Self::from_tables(TABLES)
    }

    /// Build a registry from an arbitrary set of tables.
    ///
    /// Every attribute must appear exactly once, each table must cover exactly
    /// its attribute's domain, and codes must be dense from zero.
    pub fn from_tables(
        tables: impl IntoIterator<Item = EncodingTable>,
    ) -> Result<Self, EncodingError> {
        let mut slots: [Option<EncodingTable>; 8] = [None; 8];
        for table in tables {
            let slot = &mut slots[table.attribute.index()];
            if slot.is_some() {
                return Err(EncodingError::DuplicateTable(table.attribute));
            }
            table.validate()?;
            *slot = Some(table);
        }

        let mut checked = TABLES;
        for attribute in CategoricalAttribute::ALL {
            checked[attribute.index()] =
                slots[attribute.index()].ok_or(EncodingError::MissingTable(attribute))?;
        }

        debug!(tables = checked.len(), "encoding registry validated");
        Ok(Self { tables: checked })
    }

    pub fn table(&self, attribute: CategoricalAttribute) -> &EncodingTable {
        &self.tables[attribute.index()]
    }

    pub fn encode(&self, attribute: CategoricalAttribute, value: &str) -> i64 {
        self.table(attribute).encode(value)
    }

    pub fn tables(&self) -> impl Iterator<Item = &EncodingTable> {
        self.tables.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_in_index_order() {
        for (i, attribute) in CategoricalAttribute::ALL.iter().enumerate() {
            assert_eq!(attribute.index(), i);
            assert_eq!(TABLES[i].attribute(), *attribute);
        }
    }

    #[test]
    fn trained_codes() {
        use CategoricalAttribute::*;

        assert_eq!(encode(Gender, "Male"), 0);
        assert_eq!(encode(Gender, "Female"), 1);

        assert_eq!(encode(AlcoholFrequency, "no"), 0);
        assert_eq!(encode(AlcoholFrequency, "Sometimes"), 1);
        assert_eq!(encode(AlcoholFrequency, "Frequently"), 2);
        assert_eq!(encode(AlcoholFrequency, "Always"), 3);

        for attribute in [HighCalorieFood, Smoker, CalorieTracking, FamilyHistory] {
            assert_eq!(encode(attribute, "no"), 0, "{attribute}");
            assert_eq!(encode(attribute, "yes"), 1, "{attribute}");
        }

        assert_eq!(encode(Transportation, "Public_Transportation"), 0);
        assert_eq!(encode(Transportation, "Automobile"), 1);
        assert_eq!(encode(Transportation, "Walking"), 2);
        assert_eq!(encode(Transportation, "Motorbike"), 3);
        assert_eq!(encode(Transportation, "Bike"), 4);
    }

    #[test]
    fn snacking_keeps_trained_order() {
        use CategoricalAttribute::SnackingFrequency;

        assert_eq!(encode(SnackingFrequency, "Sometimes"), 0);
        assert_eq!(encode(SnackingFrequency, "Frequently"), 1);
        assert_eq!(encode(SnackingFrequency, "Always"), 2);
        assert_eq!(encode(SnackingFrequency, "no"), 3);
        // Same answer, different code than alcohol.
        assert_ne!(
            encode(SnackingFrequency, "no"),
            encode(CategoricalAttribute::AlcoholFrequency, "no")
        );
    }

    #[test]
    fn out_of_domain_is_unknown() {
        let junk = ["", "Spaceship", "YES", "Yes", "male", " no", "no ", "Public Transportation"];
        for attribute in CategoricalAttribute::ALL {
            for value in junk {
                assert_eq!(encode(attribute, value), UNKNOWN_CODE, "{attribute} {value:?}");
            }
        }
    }

    #[test]
    fn values_from_other_tables_are_unknown() {
        assert_eq!(encode(CategoricalAttribute::Gender, "yes"), UNKNOWN_CODE);
        assert_eq!(encode(CategoricalAttribute::Smoker, "Sometimes"), UNKNOWN_CODE);
        assert_eq!(encode(CategoricalAttribute::Transportation, "no"), UNKNOWN_CODE);
    }

    #[test]
    fn encode_is_deterministic() {
        for table in TABLES {
            for &(value, code) in table.entries() {
                assert_eq!(table.encode(value), code);
                assert_eq!(table.encode(value), table.encode(value));
            }
        }
    }

    #[test]
    fn every_domain_value_has_a_code() {
        for attribute in CategoricalAttribute::ALL {
            for value in attribute.domain() {
                assert_ne!(encode(attribute, value), UNKNOWN_CODE, "{attribute} {value}");
            }
        }
    }

    #[test]
    fn registry_validates_trained_tables() {
        let registry = EncodingRegistry::new().unwrap();
        assert_eq!(registry.tables().count(), 8);
        assert_eq!(
            registry.encode(CategoricalAttribute::SnackingFrequency, "no"),
            3
        );
        assert_eq!(
            registry.encode(CategoricalAttribute::Transportation, "Spaceship"),
            UNKNOWN_CODE
        );
    }

    #[test]
    fn registry_rejects_missing_table() {
        let err = EncodingRegistry::from_tables(TABLES.into_iter().take(7)).unwrap_err();
        assert_eq!(
            err,
            EncodingError::MissingTable(CategoricalAttribute::Transportation)
        );
    }

    #[test]
    fn registry_rejects_duplicate_table() {
        let mut tables = TABLES.to_vec();
        tables.push(TABLES[0]);
        let err = EncodingRegistry::from_tables(tables).unwrap_err();
        assert_eq!(err, EncodingError::DuplicateTable(CategoricalAttribute::Gender));
    }

    #[test]
    fn registry_rejects_incomplete_domain() {
        let mut tables = TABLES;
        tables[0] = EncodingTable::new(CategoricalAttribute::Gender, &[("Male", 0)]);
        let err = EncodingRegistry::from_tables(tables).unwrap_err();
        assert!(matches!(
            err,
            EncodingError::DomainMismatch {
                attribute: CategoricalAttribute::Gender,
                ..
            }
        ));
    }

    #[test]
    fn registry_rejects_foreign_value() {
        let mut tables = TABLES;
        tables[3] = EncodingTable::new(
            CategoricalAttribute::Smoker,
            &[("no", 0), ("yes", 1), ("sometimes", 2)],
        );
        assert!(EncodingRegistry::from_tables(tables).is_err());
    }

    #[test]
    fn registry_rejects_sparse_codes() {
        let mut tables = TABLES;
        tables[3] = EncodingTable::new(CategoricalAttribute::Smoker, &[("no", 0), ("yes", 2)]);
        let err = EncodingRegistry::from_tables(tables).unwrap_err();
        assert_eq!(
            err,
            EncodingError::NonDenseCodes {
                attribute: CategoricalAttribute::Smoker,
                codes: vec![0, 2],
            }
        );
    }

    #[test]
    fn registry_rejects_repeated_code() {
        let mut tables = TABLES;
        tables[3] = EncodingTable::new(CategoricalAttribute::Smoker, &[("no", 1), ("yes", 1)]);
        assert!(matches!(
            EncodingRegistry::from_tables(tables),
            Err(EncodingError::NonDenseCodes { .. })
        ));
    }
}
