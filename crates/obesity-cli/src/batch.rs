//! Batch prediction: reads dataset-layout CSV, predicts each row, builds an
//! output table of the inputs plus prediction columns.

use std::fs::File;
use std::io::Seek;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, anyhow};
use arrow::array::{ArrayRef, BooleanArray, Int64Array, StringArray};
use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use obesity_ai::{InferenceContext, PredictionResult};
use obesity_core::InputRecord;
use obesity_core::schema::{records_from_batches, records_to_batch};
use serde_json::{Value, json};

use crate::display::format_range_violations;

/// Rows sampled to infer CSV column types.
const SCHEMA_INFER_ROWS: usize = 1000;

pub struct BatchStats {
    pub total_rows: usize,
    pub failed: usize,
    pub unreliable: usize,
    pub elapsed_secs: f64,
}

pub struct BatchOutput {
    /// Input columns followed by `class_index`, `category`, `reliable`, `error`.
    pub batch: RecordBatch,
    pub results: Vec<anyhow::Result<PredictionResult>>,
    pub stats: BatchStats,
}

impl BatchOutput {
    /// One JSON object per input row, in input order.
    pub fn rows_json(&self) -> Value {
        let rows: Vec<Value> = self
            .results
            .iter()
            .enumerate()
            .map(|(row, result)| match result {
                Ok(prediction) => json!({ "row": row, "prediction": prediction }),
                Err(e) => json!({ "row": row, "error": e.to_string() }),
            })
            .collect();
        Value::Array(rows)
    }
}

/// Read a headed CSV file into Arrow batches, inferring column types.
pub fn read_csv(path: &Path) -> anyhow::Result<Vec<RecordBatch>> {
    let mut file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let format = Format::default().with_header(true);
    let (schema, _) = format
        .infer_schema(&mut file, Some(SCHEMA_INFER_ROWS))
        .with_context(|| format!("inferring schema of {}", path.display()))?;
    file.rewind()?;

    let reader = ReaderBuilder::new(Arc::new(schema))
        .with_format(format)
        .build(file)?;
    let batches = reader
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("reading {}", path.display()))?;

    let rows: usize = batches.iter().map(|b| b.num_rows()).sum();
    eprintln!("  Read {rows} rows from {}", path.display());
    Ok(batches)
}

/// Predict every row of `batches`. A failing row is reported in its `error`
/// column and does not stop the others.
///
/// Rows with numbers outside the form's bounds (NaN included) are refused
/// without calling the model.
pub fn predict_batches(
    ctx: &InferenceContext,
    batches: &[RecordBatch],
) -> anyhow::Result<BatchOutput> {
    let start = Instant::now();

    let records = records_from_batches(batches).context("converting rows to records")?;
    let results: Vec<anyhow::Result<PredictionResult>> = records
        .iter()
        .map(|record| {
            let violations = record.range_violations();
            if !violations.is_empty() {
                return Err(anyhow!(format_range_violations(&violations)));
            }
            Ok(ctx.predict(record)?)
        })
        .collect();
    let batch = output_batch(&records, &results)?;

    let stats = BatchStats {
        total_rows: records.len(),
        failed: results.iter().filter(|r| r.is_err()).count(),
        unreliable: results
            .iter()
            .filter(|r| matches!(r, Ok(p) if !p.is_reliable()))
            .count(),
        elapsed_secs: start.elapsed().as_secs_f64(),
    };

    Ok(BatchOutput {
        batch,
        results,
        stats,
    })
}

/// Input columns plus nullable prediction columns.
pub fn output_batch(
    records: &[InputRecord],
    results: &[anyhow::Result<PredictionResult>],
) -> anyhow::Result<RecordBatch> {
    let inputs = records_to_batch(records)?;

    let mut fields: Vec<Field> = inputs
        .schema()
        .fields()
        .iter()
        .map(|f| f.as_ref().clone())
        .collect();
    fields.extend([
        Field::new("class_index", DataType::Int64, true),
        Field::new("category", DataType::Utf8, true),
        Field::new("reliable", DataType::Boolean, true),
        Field::new("error", DataType::Utf8, true),
    ]);

    let ok = |r: &anyhow::Result<PredictionResult>| r.as_ref().ok().cloned();
    let predictions: Vec<Option<PredictionResult>> = results.iter().map(ok).collect();

    let mut columns: Vec<ArrayRef> = inputs.columns().to_vec();
    columns.push(Arc::new(Int64Array::from(
        predictions
            .iter()
            .map(|p| p.as_ref().map(|p| p.class_index))
            .collect::<Vec<_>>(),
    )));
    columns.push(Arc::new(StringArray::from(
        predictions
            .iter()
            .map(|p| p.as_ref().map(|p| p.label.label()))
            .collect::<Vec<_>>(),
    )));
    columns.push(Arc::new(BooleanArray::from(
        predictions
            .iter()
            .map(|p| p.as_ref().map(|p| p.is_reliable()))
            .collect::<Vec<_>>(),
    )));
    columns.push(Arc::new(StringArray::from(
        results
            .iter()
            .map(|r| r.as_ref().err().map(|e| e.to_string()))
            .collect::<Vec<_>>(),
    )));

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}

pub fn format_table(batch: &RecordBatch) -> anyhow::Result<String> {
    let table = arrow::util::pretty::pretty_format_batches(std::slice::from_ref(batch))?;
    Ok(table.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use arrow::array::Array;
    use obesity_ai::{
        FittedScaler, LinearArtifact, LinearClassifier, PipelineConfig, UnknownPolicy,
    };
    use obesity_core::FEATURE_COUNT;

    const CSV: &str = "\
Gender,Age,Height,Weight,family_history_with_overweight,FAVC,FCVC,NCP,CAEC,SMOKE,CH2O,SCC,FAF,TUE,CALC,MTRANS,NObeyesdad
Female,21,1.62,64,yes,no,2,3,Sometimes,no,2,no,0,1,no,Public_Transportation,Normal_Weight
Male,23,1.8,77,yes,no,2,3,Sometimes,no,2,no,2,1,Frequently,Spaceship,Normal_Weight
";

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    /// Class 1 above 70 kg, class 0 below.
    fn context(on_unknown: UnknownPolicy) -> InferenceContext {
        let scaler = FittedScaler::standard(
            vec![24.0, 1.7, 70.0, 2.0, 3.0, 2.0, 1.0, 1.0],
            vec![1.0, 1.0, 10.0, 1.0, 1.0, 1.0, 1.0, 1.0],
        )
        .unwrap();
        let mut weight_row = vec![0.0; FEATURE_COUNT];
        weight_row[3] = 1.0;
        let model = LinearClassifier::from_artifact(LinearArtifact {
            classes: vec![0, 1],
            coefficients: vec![vec![0.0; FEATURE_COUNT], weight_row],
            intercepts: vec![0.0, 0.0],
        })
        .unwrap();
        InferenceContext::new(scaler, Box::new(model), PipelineConfig { on_unknown }).unwrap()
    }

    fn column<'a, T: 'static>(batch: &'a RecordBatch, name: &str) -> &'a T {
        batch
            .column_by_name(name)
            .unwrap()
            .as_any()
            .downcast_ref::<T>()
            .unwrap()
    }

    #[test]
    fn reads_dataset_csv() {
        let f = write_csv(CSV);
        let batches = read_csv(f.path()).unwrap();
        let rows: usize = batches.iter().map(|b| b.num_rows()).sum();
        assert_eq!(rows, 2);
        let records = records_from_batches(&batches).unwrap();
        assert_eq!(records[0].age, 21.0);
        assert_eq!(records[1].transportation, "Spaceship");
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(read_csv(Path::new("/nonexistent/data.csv")).is_err());
    }

    #[test]
    fn predicts_each_row_under_warn() {
        let f = write_csv(CSV);
        let batches = read_csv(f.path()).unwrap();
        let out = predict_batches(&context(UnknownPolicy::Warn), &batches).unwrap();

        assert_eq!(out.stats.total_rows, 2);
        assert_eq!(out.stats.failed, 0);
        assert_eq!(out.stats.unreliable, 1);
        assert_eq!(out.batch.num_columns(), 16 + 4);

        let class = column::<Int64Array>(&out.batch, "class_index");
        assert_eq!(class.value(0), 0);
        assert_eq!(class.value(1), 1);
        let category = column::<StringArray>(&out.batch, "category");
        assert_eq!(category.value(0), "Underweight");
        assert_eq!(category.value(1), "Normal Weight");
        let reliable = column::<BooleanArray>(&out.batch, "reliable");
        assert!(reliable.value(0));
        assert!(!reliable.value(1));
        assert_eq!(column::<StringArray>(&out.batch, "error").null_count(), 2);
    }

    #[test]
    fn rejected_row_does_not_stop_the_batch() {
        let f = write_csv(CSV);
        let batches = read_csv(f.path()).unwrap();
        let out = predict_batches(&context(UnknownPolicy::Reject), &batches).unwrap();

        assert_eq!(out.stats.failed, 1);
        let class = column::<Int64Array>(&out.batch, "class_index");
        assert!(class.is_valid(0));
        assert!(class.is_null(1));
        let error = column::<StringArray>(&out.batch, "error");
        assert!(error.is_null(0));
        assert!(error.value(1).contains("Spaceship"));

        let rows = out.rows_json();
        assert_eq!(rows[0]["prediction"]["label"], "Underweight");
        assert_eq!(rows[1]["row"], 1);
        assert!(rows[1]["error"].as_str().unwrap().contains("transportation"));
    }

    #[test]
    fn missing_column_fails_the_batch() {
        let f = write_csv("Gender,Age\nMale,30\n");
        let batches = read_csv(f.path()).unwrap();
        let err = predict_batches(&context(UnknownPolicy::Warn), &batches).err();
        assert!(err.is_some());
    }

    #[test]
    fn out_of_range_rows_are_refused() {
        let f = write_csv(
            "\
Gender,Age,Height,Weight,family_history_with_overweight,FAVC,FCVC,NCP,CAEC,SMOKE,CH2O,SCC,FAF,TUE,CALC,MTRANS
Female,21,1.62,64.0,yes,no,2,3,Sometimes,no,2,no,0,1,no,Walking
Male,500,9.0,80.0,yes,no,2,3,Sometimes,no,2,no,0,1,no,Walking
Male,30,1.75,NaN,yes,no,2,3,Sometimes,no,2,no,0,1,no,Walking
",
        );
        let batches = read_csv(f.path()).unwrap();
        let out = predict_batches(&context(UnknownPolicy::Warn), &batches).unwrap();

        assert_eq!(out.stats.total_rows, 3);
        assert_eq!(out.stats.failed, 2);
        assert_eq!(out.stats.unreliable, 0);

        let class = column::<Int64Array>(&out.batch, "class_index");
        assert!(class.is_valid(0));
        assert!(class.is_null(1));
        assert!(class.is_null(2));
        assert!(column::<BooleanArray>(&out.batch, "reliable").is_null(2));

        let error = column::<StringArray>(&out.batch, "error");
        assert!(error.is_null(0));
        assert!(error.value(1).contains("age = 500"), "{}", error.value(1));
        assert!(error.value(1).contains("height = 9"));
        assert!(error.value(2).contains("weight = NaN"), "{}", error.value(2));
    }

    #[test]
    fn table_has_prediction_headers() {
        let f = write_csv(CSV);
        let batches = read_csv(f.path()).unwrap();
        let out = predict_batches(&context(UnknownPolicy::Warn), &batches).unwrap();
        let table = format_table(&out.batch).unwrap();
        assert!(table.contains("class_index"));
        assert!(table.contains("reliable"));
        assert!(table.contains("Spaceship"));
    }
}
