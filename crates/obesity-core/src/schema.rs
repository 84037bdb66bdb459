//! Arrow schema for questionnaire data in the training dataset's column layout.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;

use crate::encoding::CategoricalAttribute;
use crate::error::SchemaError;
use crate::features::{FEATURE_ORDER, Feature};
use crate::record::{InputRecord, NumericAttribute};

/// One column per feature slot, named as in the training dataset.
///
/// Numeric columns are `Float64`, categorical columns `Utf8`. All are
/// non-nullable.
pub fn input_schema() -> Schema {
    let fields: Vec<Field> = FEATURE_ORDER
        .iter()
        .map(|f| {
            let dt = if f.is_numeric() {
                DataType::Float64
            } else {
                DataType::Utf8
            };
            Field::new(f.column_name(), dt, false)
        })
        .collect();
    Schema::new(fields)
}

/// Convert Arrow batches into input records, one per row.
///
/// Columns are located by dataset name, so column order and extra columns
/// (such as the dataset's target column) do not matter. Numeric columns may be
/// any type castable to `Float64`; categorical columns any type castable to
/// `Utf8`.
pub fn records_from_batches(batches: &[RecordBatch]) -> Result<Vec<InputRecord>, SchemaError> {
    let mut records = Vec::with_capacity(batches.iter().map(|b| b.num_rows()).sum());
    for batch in batches {
        records.extend(records_from_batch(batch)?);
    }
    Ok(records)
}

pub fn records_from_batch(batch: &RecordBatch) -> Result<Vec<InputRecord>, SchemaError> {
    let numeric: Vec<(NumericAttribute, Float64Array)> = NumericAttribute::ALL
        .iter()
        .map(|&a| Ok((a, float_column(batch, a.column_name())?)))
        .collect::<Result<_, SchemaError>>()?;
    let categorical: Vec<(CategoricalAttribute, StringArray)> = CategoricalAttribute::ALL
        .iter()
        .map(|&a| Ok((a, string_column(batch, a.column_name())?)))
        .collect::<Result<_, SchemaError>>()?;

    let mut records = Vec::with_capacity(batch.num_rows());
    for row in 0..batch.num_rows() {
        let mut record = InputRecord::default();

        for (attribute, col) in &numeric {
            if col.is_null(row) {
                return Err(null_value(Feature::Numeric(*attribute), row));
            }
            *numeric_slot(&mut record, *attribute) = col.value(row);
        }

        for (attribute, col) in &categorical {
            if col.is_null(row) {
                return Err(null_value(Feature::Categorical(*attribute), row));
            }
            *categorical_slot(&mut record, *attribute) = col.value(row).to_string();
        }

        records.push(record);
    }
    Ok(records)
}

fn null_value(feature: Feature, row: usize) -> SchemaError {
    SchemaError::NullValue {
        column: feature.column_name().to_string(),
        row,
    }
}

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef, SchemaError> {
    batch
        .column_by_name(name)
        .ok_or_else(|| SchemaError::MissingColumn(name.to_string()))
}

fn float_column(batch: &RecordBatch, name: &str) -> Result<Float64Array, SchemaError> {
    let cast_col = cast(column(batch, name)?, &DataType::Float64)?;
    cast_col
        .as_any()
        .downcast_ref::<Float64Array>()
        .cloned()
        .ok_or_else(|| SchemaError::UnsupportedType {
            column: name.to_string(),
            data_type: cast_col.data_type().clone(),
        })
}

fn string_column(batch: &RecordBatch, name: &str) -> Result<StringArray, SchemaError> {
    let cast_col = cast(column(batch, name)?, &DataType::Utf8)?;
    cast_col
        .as_any()
        .downcast_ref::<StringArray>()
        .cloned()
        .ok_or_else(|| SchemaError::UnsupportedType {
            column: name.to_string(),
            data_type: cast_col.data_type().clone(),
        })
}

fn numeric_slot(record: &mut InputRecord, attribute: NumericAttribute) -> &mut f64 {
    match attribute {
        NumericAttribute::Age => &mut record.age,
        NumericAttribute::Height => &mut record.height,
        NumericAttribute::Weight => &mut record.weight,
        NumericAttribute::VegetableFrequency => &mut record.vegetable_frequency,
        NumericAttribute::MealsPerDay => &mut record.meals_per_day,
        NumericAttribute::WaterIntake => &mut record.water_intake,
        NumericAttribute::PhysicalActivity => &mut record.physical_activity,
        NumericAttribute::ScreenTime => &mut record.screen_time,
    }
}

fn categorical_slot(record: &mut InputRecord, attribute: CategoricalAttribute) -> &mut String {
    match attribute {
        CategoricalAttribute::Gender => &mut record.gender,
        CategoricalAttribute::AlcoholFrequency => &mut record.alcohol_frequency,
        CategoricalAttribute::HighCalorieFood => &mut record.high_calorie_food,
        CategoricalAttribute::Smoker => &mut record.smoker,
        CategoricalAttribute::CalorieTracking => &mut record.calorie_tracking,
        CategoricalAttribute::FamilyHistory => &mut record.family_history,
        CategoricalAttribute::SnackingFrequency => &mut record.snacking_frequency,
        CategoricalAttribute::Transportation => &mut record.transportation,
    }
}

/// Build a batch in [`input_schema`] layout from records.
pub fn records_to_batch(records: &[InputRecord]) -> Result<RecordBatch, SchemaError> {
    let columns: Vec<ArrayRef> = FEATURE_ORDER
        .iter()
        .map(|f| -> ArrayRef {
            match f {
                Feature::Numeric(a) => Arc::new(Float64Array::from_iter_values(
                    records.iter().map(|r| r.numeric(*a)),
                )),
                Feature::Categorical(a) => Arc::new(StringArray::from_iter_values(
                    records.iter().map(|r| r.categorical(*a)),
                )),
            }
        })
        .collect();
    Ok(RecordBatch::try_new(Arc::new(input_schema()), columns)?)
}
