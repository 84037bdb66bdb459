//! Raw questionnaire answers for one person.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::encoding::CategoricalAttribute;

/// Attributes answered with a number.
///
/// [`ALL`](Self::ALL) is the order the scaler was fitted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericAttribute {
    Age,
    Height,
    Weight,
    VegetableFrequency,
    MealsPerDay,
    WaterIntake,
    PhysicalActivity,
    ScreenTime,
}

impl NumericAttribute {
    pub const ALL: [Self; 8] = [
        Self::Age,
        Self::Height,
        Self::Weight,
        Self::VegetableFrequency,
        Self::MealsPerDay,
        Self::WaterIntake,
        Self::PhysicalActivity,
        Self::ScreenTime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::Height => "height",
            Self::Weight => "weight",
            Self::VegetableFrequency => "vegetable_frequency",
            Self::MealsPerDay => "meals_per_day",
            Self::WaterIntake => "water_intake",
            Self::PhysicalActivity => "physical_activity",
            Self::ScreenTime => "screen_time",
        }
    }

    /// Column name in the training dataset.
    pub fn column_name(&self) -> &'static str {
        match self {
            Self::Age => "Age",
            Self::Height => "Height",
            Self::Weight => "Weight",
            Self::VegetableFrequency => "FCVC",
            Self::MealsPerDay => "NCP",
            Self::WaterIntake => "CH2O",
            Self::PhysicalActivity => "FAF",
            Self::ScreenTime => "TUE",
        }
    }

    /// Bounds enforced by the input form.
    pub fn range(&self) -> RangeInclusive<f64> {
        match self {
            Self::Age => 1.0..=120.0,
            Self::Height => 0.5..=2.5,
            Self::Weight => 20.0..=200.0,
            Self::VegetableFrequency => 0.0..=10.0,
            Self::MealsPerDay => 1.0..=10.0,
            Self::WaterIntake => 0.0..=5.0,
            Self::PhysicalActivity => 0.0..=7.0,
            Self::ScreenTime => 0.0..=5.0,
        }
    }

    /// Value the input form starts with.
    pub fn default_value(&self) -> f64 {
        match self {
            Self::Age => 25.0,
            Self::Height => 1.7,
            Self::Weight => 70.0,
            Self::VegetableFrequency => 2.0,
            Self::MealsPerDay => 3.0,
            Self::WaterIntake => 2.0,
            Self::PhysicalActivity => 2.0,
            Self::ScreenTime => 2.0,
        }
    }
}

impl fmt::Display for NumericAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One person's answers, exactly as collected.
///
/// Numeric values are trusted to be within [`NumericAttribute::range`] but are
/// never clamped. Categorical values are kept as the raw strings so that
/// out-of-domain answers survive until encoding.
///
/// Deserializes from either the snake_case field names or the training
/// dataset's column names (`Age`, `CALC`, `MTRANS`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputRecord {
    /// Whole years.
    #[serde(alias = "Age")]
    pub age: f64,
    #[serde(alias = "Gender")]
    pub gender: String,
    /// Metres.
    #[serde(alias = "Height")]
    pub height: f64,
    /// Kilograms.
    #[serde(alias = "Weight")]
    pub weight: f64,
    #[serde(alias = "CALC")]
    pub alcohol_frequency: String,
    #[serde(alias = "FAVC")]
    pub high_calorie_food: String,
    #[serde(alias = "FCVC")]
    pub vegetable_frequency: f64,
    #[serde(alias = "NCP")]
    pub meals_per_day: f64,
    #[serde(alias = "SCC")]
    pub calorie_tracking: String,
    #[serde(alias = "SMOKE")]
    pub smoker: String,
    /// Litres per day.
    #[serde(alias = "CH2O")]
    pub water_intake: f64,
    #[serde(alias = "family_history_with_overweight")]
    pub family_history: String,
    /// Days per week.
    #[serde(alias = "FAF")]
    pub physical_activity: f64,
    /// Hours per day.
    #[serde(alias = "TUE")]
    pub screen_time: f64,
    #[serde(alias = "CAEC")]
    pub snacking_frequency: String,
    #[serde(alias = "MTRANS")]
    pub transportation: String,
}

impl Default for InputRecord {
    /// The input form's initial state.
    fn default() -> Self {
        let first = |a: CategoricalAttribute| a.domain()[0].to_string();
        Self {
            age: NumericAttribute::Age.default_value(),
            gender: first(CategoricalAttribute::Gender),
            height: NumericAttribute::Height.default_value(),
            weight: NumericAttribute::Weight.default_value(),
            alcohol_frequency: first(CategoricalAttribute::AlcoholFrequency),
            high_calorie_food: first(CategoricalAttribute::HighCalorieFood),
            vegetable_frequency: NumericAttribute::VegetableFrequency.default_value(),
            meals_per_day: NumericAttribute::MealsPerDay.default_value(),
            calorie_tracking: first(CategoricalAttribute::CalorieTracking),
            smoker: first(CategoricalAttribute::Smoker),
            water_intake: NumericAttribute::WaterIntake.default_value(),
            family_history: first(CategoricalAttribute::FamilyHistory),
            physical_activity: NumericAttribute::PhysicalActivity.default_value(),
            screen_time: NumericAttribute::ScreenTime.default_value(),
            snacking_frequency: first(CategoricalAttribute::SnackingFrequency),
            transportation: first(CategoricalAttribute::Transportation),
        }
    }
}

impl InputRecord {
    pub fn numeric(&self, attribute: NumericAttribute) -> f64 {
        match attribute {
            NumericAttribute::Age => self.age,
            NumericAttribute::Height => self.height,
            NumericAttribute::Weight => self.weight,
            NumericAttribute::VegetableFrequency => self.vegetable_frequency,
            NumericAttribute::MealsPerDay => self.meals_per_day,
            NumericAttribute::WaterIntake => self.water_intake,
            NumericAttribute::PhysicalActivity => self.physical_activity,
            NumericAttribute::ScreenTime => self.screen_time,
        }
    }

    pub fn categorical(&self, attribute: CategoricalAttribute) -> &str {
        match attribute {
            CategoricalAttribute::Gender => &self.gender,
            CategoricalAttribute::AlcoholFrequency => &self.alcohol_frequency,
            CategoricalAttribute::HighCalorieFood => &self.high_calorie_food,
            CategoricalAttribute::Smoker => &self.smoker,
            CategoricalAttribute::CalorieTracking => &self.calorie_tracking,
            CategoricalAttribute::FamilyHistory => &self.family_history,
            CategoricalAttribute::SnackingFrequency => &self.snacking_frequency,
            CategoricalAttribute::Transportation => &self.transportation,
        }
    }

    /// Numeric attributes whose value falls outside the form's bounds.
    ///
    /// NaN counts as out of range.
    pub fn range_violations(&self) -> Vec<(NumericAttribute, f64)> {
        NumericAttribute::ALL
            .iter()
            .map(|&a| (a, self.numeric(a)))
            .filter(|(a, v)| !a.range().contains(v))
            .collect()
    }
}
