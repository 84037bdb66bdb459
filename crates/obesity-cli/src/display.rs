//! Text and JSON rendering for predictions, artifact status and encoding tables.

use std::fmt::Write;

use obesity_ai::{InferenceContext, PredictionResult};
use obesity_core::features::column_names;
use obesity_core::{EncodingRegistry, FEATURE_ORDER, NumericAttribute};
use serde_json::{Value, json};

const LABEL_WIDTH: usize = 26;

// ── Predictions ──

/// A single prediction as a vertical card.
pub fn format_prediction(result: &PredictionResult) -> String {
    let mut out = String::new();
    line(&mut out, "Category", result.label.label());
    line(&mut out, "Class index", result.class_index);
    line(
        &mut out,
        "Reliable",
        if result.is_reliable() { "yes" } else { "no" },
    );

    if !result.unknown_inputs.is_empty() {
        out.push('\n');
        out.push_str("Unknown inputs (encoded as -1)\n");
        for u in &result.unknown_inputs {
            let name = format!("{} ({})", u.attribute, u.attribute.column_name());
            line(&mut out, &name, format!("{:?}", u.value));
        }
    }
    out
}

pub fn format_range_violations(violations: &[(NumericAttribute, f64)]) -> String {
    let parts: Vec<String> = violations
        .iter()
        .map(|(attr, value)| {
            let range = attr.range();
            format!(
                "{attr} = {value} (allowed {}..={})",
                range.start(),
                range.end()
            )
        })
        .collect();
    format!("out of range: {}", parts.join(", "))
}

// ── Artifacts ──

pub fn format_check(ctx: &InferenceContext) -> String {
    let scaler = ctx.scaler();
    let model = ctx.model();

    let mut out = String::new();
    out.push_str("Scaler\n");
    line(&mut out, "  kind", scaler.kind());
    line(&mut out, "  features", scaler.feature_count());
    if let Some(names) = scaler.feature_names() {
        line(&mut out, "  fitted on", names.join(", "));
    }
    out.push_str("Model\n");
    line(&mut out, "  kind", model.kind());
    line(&mut out, "  features", model.feature_count());
    out.push_str("Pipeline\n");
    line(&mut out, "  on unknown", ctx.config().on_unknown);
    line(&mut out, "  encoding tables", ctx.registry().tables().count());
    out.push_str("ok\n");
    out
}

pub fn check_json(ctx: &InferenceContext) -> Value {
    json!({
        "scaler": {
            "kind": ctx.scaler().kind().as_str(),
            "features": ctx.scaler().feature_count(),
            "feature_names": ctx.scaler().feature_names(),
        },
        "model": {
            "kind": ctx.model().kind(),
            "features": ctx.model().feature_count(),
        },
        "on_unknown": ctx.config().on_unknown,
    })
}

// ── Encoding tables ──

pub fn format_tables(registry: &EncodingRegistry) -> String {
    let mut out = String::new();
    for table in registry.tables() {
        let attr = table.attribute();
        let _ = writeln!(out, "{attr} ({})", attr.column_name());
        for (value, code) in table.entries() {
            let _ = writeln!(out, "  {value:<24} {code}");
        }
        out.push('\n');
    }

    out.push_str("Feature order\n");
    for (i, feature) in FEATURE_ORDER.iter().enumerate() {
        let role = if feature.is_numeric() {
            "numeric, scaled"
        } else {
            "categorical"
        };
        let _ = writeln!(out, "  {i:>2}  {:<32} {role}", feature.column_name());
    }
    out
}

pub fn tables_json(registry: &EncodingRegistry) -> Value {
    let tables: serde_json::Map<String, Value> = registry
        .tables()
        .map(|t| {
            let entries: serde_json::Map<String, Value> = t
                .entries()
                .iter()
                .map(|(value, code)| (value.to_string(), json!(code)))
                .collect();
            (t.attribute().column_name().to_string(), Value::Object(entries))
        })
        .collect();
    json!({
        "tables": tables,
        "feature_order": column_names(),
    })
}

fn line(out: &mut String, label: &str, value: impl std::fmt::Display) {
    let _ = writeln!(out, "{label:<LABEL_WIDTH$} {value}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use obesity_core::{CategoricalAttribute, UnknownCategory, decode};

    fn result(class_index: i64, unknown: Vec<UnknownCategory>) -> PredictionResult {
        PredictionResult {
            class_index,
            label: decode(class_index),
            unknown_inputs: unknown,
        }
    }

    #[test]
    fn prediction_card_shows_label_and_index() {
        let text = format_prediction(&result(4, vec![]));
        assert!(text.contains("Obesity Type I"));
        assert!(text.contains("Class index"));
        assert!(text.contains(" 4\n"));
        assert!(text.contains(&format!("{:<LABEL_WIDTH$} yes", "Reliable")));
        assert!(!text.contains("Unknown inputs"));
    }

    #[test]
    fn prediction_card_lists_unknown_inputs() {
        let unknown = vec![UnknownCategory {
            attribute: CategoricalAttribute::Transportation,
            value: "Spaceship".into(),
        }];
        let text = format_prediction(&result(1, unknown));
        assert!(text.contains(&format!("{:<LABEL_WIDTH$} no", "Reliable")));
        assert!(text.contains("MTRANS"));
        assert!(text.contains("\"Spaceship\""));
    }

    #[test]
    fn unrecognized_class_prints_sentinel() {
        let text = format_prediction(&result(12, vec![]));
        assert!(text.contains("Unknown"));
        assert!(text.contains("12"));
    }

    #[test]
    fn range_violation_message() {
        let msg = format_range_violations(&[
            (NumericAttribute::Age, 200.0),
            (NumericAttribute::Weight, 5.0),
        ]);
        assert_eq!(
            msg,
            "out of range: age = 200 (allowed 1..=120), weight = 5 (allowed 20..=200)"
        );
    }

    #[test]
    fn tables_list_every_attribute_and_feature() {
        let registry = EncodingRegistry::new().unwrap();
        let text = format_tables(&registry);
        for attr in CategoricalAttribute::ALL {
            assert!(text.contains(attr.column_name()));
        }
        assert!(text.contains("Public_Transportation"));
        assert!(text.contains(" 0  Age"));
        assert!(text.contains("15  MTRANS"));
    }

    #[test]
    fn tables_json_shape() {
        let registry = EncodingRegistry::new().unwrap();
        let v = tables_json(&registry);
        assert_eq!(v["tables"]["CAEC"]["no"], 3);
        assert_eq!(v["tables"]["family_history_with_overweight"]["yes"], 1);
        assert_eq!(v["feature_order"].as_array().unwrap().len(), 16);
        assert_eq!(v["feature_order"][0], "Age");
    }
}
