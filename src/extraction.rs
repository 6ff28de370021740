use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::operation_status::AnalysisResult;

/// Confidence reported when the result carries no OCR lines to average.
pub const DEFAULT_CONFIDENCE: f64 = 0.8;
/// Summaries below this confidence are flagged for manual review.
pub const UNCERTAIN_BELOW: f64 = 0.7;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Checkbox {
    pub label: String,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberField {
    pub label: String,
    pub value: f64,
}

/// Flattened view of a finished analysis: text lines, checkboxes and numeric fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionSummary {
    pub text: Vec<String>,
    pub checkboxes: Vec<Checkbox>,
    pub numbers: Vec<NumberField>,
    pub confidence: f64,
    pub uncertain: bool,
}

#[derive(Deserialize, Default)]
struct Envelope {
    #[serde(rename = "analyzeResult")]
    analyze_result: Option<DocumentAnalysis>,
    result: Option<ContentAnalysis>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct DocumentAnalysis {
    #[serde(default)]
    read_results: Vec<Page>,
    #[serde(default)]
    document_results: Vec<DocumentResult>,
}

#[derive(Deserialize)]
struct Page {
    #[serde(default)]
    lines: Vec<Line>,
}

#[derive(Deserialize)]
struct Line {
    #[serde(default)]
    text: String,
    confidence: Option<f64>,
}

#[derive(Deserialize, Default)]
struct ContentAnalysis {
    #[serde(default)]
    contents: Vec<Content>,
}

#[derive(Deserialize)]
struct Content {
    markdown: Option<String>,
    #[serde(default)]
    fields: BTreeMap<String, Field>,
}

#[derive(Deserialize, Default)]
struct DocumentResult {
    #[serde(default)]
    fields: BTreeMap<String, Field>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Field {
    #[serde(rename = "type", default)]
    kind: String,
    value_selection_mark: Option<String>,
    value_boolean: Option<bool>,
    value_number: Option<f64>,
    value_integer: Option<i64>,
}

impl ExtractionSummary {
    /// Results that do not match either known layout give an empty summary.
    pub fn from_result(result: &AnalysisResult) -> ExtractionSummary {
        let envelope = Envelope::deserialize(result).unwrap_or_default();
        let document = envelope.analyze_result.unwrap_or_default();
        let content = envelope.result.unwrap_or_default();

        let lines: Vec<&Line> = document.read_results.iter().flat_map(|p| &p.lines).collect();
        let mut text: Vec<String> = lines.iter().map(|l| l.text.clone()).collect();
        if text.is_empty() {
            text = content
                .contents
                .iter()
                .filter_map(|c| c.markdown.as_deref())
                .flat_map(str::lines)
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect();
        }

        let mut checkboxes = Vec::new();
        let mut numbers = Vec::new();
        let field_maps = document
            .document_results
            .iter()
            .map(|d| &d.fields)
            .chain(content.contents.iter().map(|c| &c.fields));
        for (label, field) in field_maps.flatten() {
            match field.kind.as_str() {
                "selectionMark" => checkboxes.push(Checkbox {
                    label: label.clone(),
                    checked: field.value_selection_mark.as_deref() == Some("selected"),
                }),
                "boolean" => checkboxes.push(Checkbox {
                    label: label.clone(),
                    checked: field.value_boolean.unwrap_or(false),
                }),
                "number" | "integer" => {
                    let value = field
                        .value_number
                        .or(field.value_integer.map(|v| v as f64));
                    if let Some(value) = value {
                        numbers.push(NumberField {
                            label: label.clone(),
                            value,
                        });
                    }
                }
                _ => {}
            }
        }

        let confidence = if lines.is_empty() {
            DEFAULT_CONFIDENCE
        } else {
            lines.iter().map(|l| l.confidence.unwrap_or(0.0)).sum::<f64>() / lines.len() as f64
        };

        ExtractionSummary {
            text,
            checkboxes,
            numbers,
            confidence,
            uncertain: confidence < UNCERTAIN_BELOW,
        }
    }
}
