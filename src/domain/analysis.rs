use itertools::Itertools;
use serde::Deserialize;
use serde_json::Value;

pub const PARSE_FAILURE_EVIDENCE: &str = "Model response could not be parsed as JSON.";
pub const EVIDENCE_DELIMITER: &str = " | ";

/// Columns appended to every output row, in order.
pub const ANALYSIS_COLUMNS: [&str; 11] = [
    "products_summary",
    "startup_vertical",
    "startup_sub_vertical",
    "use_case",
    "uses_genai",
    "genai_details",
    "uses_traditional_ml",
    "ml_details",
    "unique_value",
    "site_context_summary",
    "evidence",
];

/// The startup a record describes.
#[derive(Debug, Clone, PartialEq)]
pub struct Subject {
    pub name: String,
    pub url: String,
    pub description: String,
    pub industries: String,
}

/// Structured answer for one startup.
///
/// Values are kept as the model sent them, so a field the model filled with an
/// unexpected type survives untouched; only absent fields receive defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRecord {
    pub startup_name: Value,
    pub url: Value,
    pub products_summary: Value,
    pub startup_vertical: Value,
    pub startup_sub_vertical: Value,
    pub use_case: Value,
    pub uses_genai: Value,
    pub genai_details: Value,
    pub uses_traditional_ml: Value,
    pub ml_details: Value,
    pub unique_value: Value,
    pub site_context_summary: Value,
    pub evidence: Value,
}

#[derive(Debug, Default, Deserialize)]
struct ModelAnswer {
    startup_name: Option<Value>,
    url: Option<Value>,
    products_summary: Option<Value>,
    startup_vertical: Option<Value>,
    startup_sub_vertical: Option<Value>,
    use_case: Option<Value>,
    uses_genai: Option<Value>,
    genai_details: Option<Value>,
    uses_traditional_ml: Option<Value>,
    ml_details: Option<Value>,
    unique_value: Option<Value>,
    site_context_summary: Option<Value>,
    evidence: Option<Value>,
}

fn empty() -> Value {
    Value::String("".to_string())
}

impl AnalysisRecord {
    fn from_answer(answer: ModelAnswer, subject: &Subject) -> Self {
        AnalysisRecord {
            startup_name: answer
                .startup_name
                .unwrap_or_else(|| Value::String(subject.name.clone())),
            url: answer
                .url
                .unwrap_or_else(|| Value::String(subject.url.clone())),
            products_summary: answer.products_summary.unwrap_or_else(empty),
            startup_vertical: answer.startup_vertical.unwrap_or_else(empty),
            startup_sub_vertical: answer.startup_sub_vertical.unwrap_or_else(empty),
            use_case: answer.use_case.unwrap_or_else(empty),
            uses_genai: answer.uses_genai.unwrap_or(Value::Bool(false)),
            genai_details: answer.genai_details.unwrap_or_else(empty),
            uses_traditional_ml: answer.uses_traditional_ml.unwrap_or(Value::Bool(false)),
            ml_details: answer.ml_details.unwrap_or_else(empty),
            unique_value: answer.unique_value.unwrap_or_else(empty),
            site_context_summary: answer.site_context_summary.unwrap_or_else(empty),
            evidence: answer.evidence.unwrap_or_else(|| Value::Array(vec![])),
        }
    }

    /// Degraded record for output that is not a JSON object. The raw text is kept in `use_case`.
    pub fn unparsed(raw_text: &str, subject: &Subject) -> Self {
        AnalysisRecord::from_answer(
            ModelAnswer {
                use_case: Some(Value::String(raw_text.to_string())),
                evidence: Some(Value::String(PARSE_FAILURE_EVIDENCE.to_string())),
                ..Default::default()
            },
            subject,
        )
    }

    /// Parses model output into a record, falling back to [`AnalysisRecord::unparsed`].
    pub fn from_model_text(text: &str, subject: &Subject) -> Self {
        match parse_json_object(text) {
            Some(object) => match serde_json::from_value::<ModelAnswer>(object) {
                Ok(answer) => AnalysisRecord::from_answer(answer, subject),
                Err(e) => {
                    log::error!("Model JSON did not fit the record shape: {:?}", e);
                    AnalysisRecord::unparsed(text, subject)
                }
            },
            None => AnalysisRecord::unparsed(text, subject),
        }
    }

    /// Cells for [`ANALYSIS_COLUMNS`], evidence flattened to one string.
    pub fn to_cells(&self) -> Vec<String> {
        vec![
            cell(&self.products_summary),
            cell(&self.startup_vertical),
            cell(&self.startup_sub_vertical),
            cell(&self.use_case),
            cell(&self.uses_genai),
            cell(&self.genai_details),
            cell(&self.uses_traditional_ml),
            cell(&self.ml_details),
            cell(&self.unique_value),
            cell(&self.site_context_summary),
            flatten_evidence(&self.evidence),
        ]
    }

    /// Cells written when a row fails before a record exists.
    pub fn error_cells(message: &str) -> Vec<String> {
        let error = format!("Error: {}", message);

        ANALYSIS_COLUMNS
            .iter()
            .map(|column| match *column {
                "genai_details" | "evidence" => error.clone(),
                _ => "".to_string(),
            })
            .collect()
    }
}

/// Strips a surrounding markdown code fence, if any.
pub fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let text = match text.strip_prefix("```json") {
        Some(rest) => rest,
        None => text.strip_prefix("```").unwrap_or(text),
    };
    let text = text.strip_suffix("```").unwrap_or(text);

    text.trim()
}

/// The text as a JSON object, or `None` when it is not one.
pub fn parse_json_object(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(strip_code_fence(text)) {
        Ok(value @ Value::Object(_)) => Some(value),
        Ok(_) => None,
        Err(_) => None,
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => "".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn flatten_evidence(evidence: &Value) -> String {
    match evidence {
        Value::Array(items) => items.iter().map(cell).join(EVIDENCE_DELIMITER),
        other => cell(other),
    }
}
