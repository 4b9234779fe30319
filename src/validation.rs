//! Completeness and format checks for medical summaries.
//!
//! A summary is either a JSON object or free text. Each required field is
//! looked up by its structured names first and, failing that, by literal
//! patterns in the lowercased text. The text fallback is loose: any "born"
//! counts as an age.

use serde::Serialize;
use serde_json::{Map, Value};

const MIN_SUMMARY_CHARS: usize = 50;
const MIN_CONTENT_SECTIONS: usize = 3;
const CONTENT_SECTIONS: [&str; 6] = [
    "patient",
    "age",
    "medical",
    "condition",
    "diagnosis",
    "treatment",
];

/// A field every summary must carry.
struct RequiredField {
    label: &'static str,
    field_names: &'static [&'static str],
    text_patterns: &'static [&'static str],
    recommendation: &'static str,
}

impl RequiredField {
    fn present_label(&self) -> String {
        format!("✅ {}", self.label)
    }

    fn missing_label(&self) -> String {
        format!("❌ {}", self.label)
    }
}

const PATIENT_NAME: RequiredField = RequiredField {
    label: "Patient Name",
    field_names: &["patient_name", "name", "full_name", "patient_demographics"],
    text_patterns: &["patient:", "name:", "patient name:", "full name:"],
    recommendation: "Add patient name in fields like 'patient_name', 'name', or 'full_name'",
};

const PATIENT_AGE: RequiredField = RequiredField {
    label: "Patient Age",
    field_names: &["age", "patient_age", "birth_date", "date_of_birth", "birthDate"],
    text_patterns: &["age:", "years old", "y/o", "born", "age "],
    recommendation: "Add patient age in fields like 'age', 'patient_age', or 'birth_date'",
};

const RECENT_MEDICAL_EVENTS: RequiredField = RequiredField {
    label: "Recent Medical Events",
    field_names: &[
        "medical_events",
        "recent_medical_events",
        "conditions",
        "medical_conditions",
        "diagnoses",
        "procedures",
    ],
    text_patterns: &[
        "diagnosis:",
        "condition:",
        "procedure:",
        "treatment:",
        "medical history:",
        "recent events:",
    ],
    recommendation:
        "Add recent medical events in fields like 'medical_events', 'conditions', or 'diagnoses'",
};

const REQUIRED_FIELDS: [&RequiredField; 3] = [&PATIENT_NAME, &PATIENT_AGE, &RECENT_MEDICAL_EVENTS];

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ValidationResult {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub missing_fields: Vec<String>,
    pub present_fields: Vec<String>,
    pub recommendations: Vec<String>,
}

impl ValidationResult {
    fn failed(message: String) -> Self {
        Self {
            is_valid: false,
            error: Some(format!("Validation failed: {}", message)),
            missing_fields: vec!["❌ Validation Error".to_string()],
            present_fields: Vec::new(),
            recommendations: vec!["Please check the summary format and try again".to_string()],
        }
    }

    fn has_present(&self, field: &RequiredField) -> bool {
        self.present_fields.contains(&field.present_label())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FormatResult {
    pub format_valid: bool,
    pub format_issues: Vec<String>,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RequiredFieldsStatus {
    pub patient_name: String,
    pub patient_age: String,
    pub recent_medical_events: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReportBody {
    pub overall_status: String,
    pub completeness_check: ValidationResult,
    pub format_check: FormatResult,
    pub required_fields_status: RequiredFieldsStatus,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ValidationReport {
    pub summary_validation_report: ReportBody,
}

/// How a summary arrived: a JSON object, or text to pattern-match.
enum SummaryPayload {
    Structured(Map<String, Value>),
    Text(String),
}

impl SummaryPayload {
    fn parse(summary: &str) -> Self {
        if summary.trim().starts_with('{') {
            if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(summary) {
                return Self::Structured(map);
            }
        }
        Self::Text(summary.to_string())
    }

    /// Text searched when no structured field matches.
    fn fallback_text(&self) -> Option<&str> {
        match self {
            Self::Structured(map) => map.get("raw_text").and_then(Value::as_str),
            Self::Text(text) => Some(text),
        }
    }

    fn has_field(&self, field: &RequiredField) -> bool {
        if let Self::Structured(map) = self {
            if field
                .field_names
                .iter()
                .any(|name| map.get(*name).is_some_and(is_truthy))
            {
                return true;
            }
        }

        self.fallback_text()
            .map(|text| {
                let text = text.to_lowercase();
                field.text_patterns.iter().any(|p| text.contains(p))
            })
            .unwrap_or(false)
    }
}

/// Non-null, non-false, non-zero and non-empty.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Check that a summary names the patient, their age and recent medical events.
pub fn check_completeness(summary: &str) -> ValidationResult {
    let payload = SummaryPayload::parse(summary);

    let mut result = ValidationResult {
        is_valid: true,
        error: None,
        missing_fields: Vec::new(),
        present_fields: Vec::new(),
        recommendations: Vec::new(),
    };

    for field in REQUIRED_FIELDS {
        if payload.has_field(field) {
            result.present_fields.push(field.present_label());
        } else {
            result.is_valid = false;
            result.missing_fields.push(field.missing_label());
            result.recommendations.push(field.recommendation.to_string());
        }
    }

    result
}

/// Check that a summary is well-formed JSON (when it looks like JSON), long
/// enough, and mentions enough medical content.
pub fn check_format(summary: &str) -> FormatResult {
    let mut result = FormatResult {
        format_valid: true,
        format_issues: Vec::new(),
        suggestions: Vec::new(),
    };

    let trimmed = summary.trim();

    if trimmed.starts_with('{') {
        match serde_json::from_str::<Value>(summary) {
            Ok(_) => result.suggestions.push("✅ Valid JSON format".to_string()),
            Err(e) => {
                result.format_valid = false;
                result.format_issues.push(format!("❌ Invalid JSON: {}", e));
                result
                    .suggestions
                    .push("Ensure the summary is in valid JSON format".to_string());
            }
        }
    }

    if trimmed.chars().count() < MIN_SUMMARY_CHARS {
        result.format_valid = false;
        result.format_issues.push("❌ Summary too short".to_string());
        result
            .suggestions
            .push("Summary should contain meaningful patient information".to_string());
    }

    let text = summary.to_lowercase();
    let found = CONTENT_SECTIONS
        .iter()
        .filter(|section| text.contains(*section))
        .count();

    if found < MIN_CONTENT_SECTIONS {
        result
            .format_issues
            .push("❌ Missing expected medical content sections".to_string());
        result
            .suggestions
            .push("Include patient demographics and medical information".to_string());
    } else {
        result
            .suggestions
            .push(format!("✅ Found {} relevant medical sections", found));
    }

    result
}

fn field_status(completeness: &ValidationResult, field: &RequiredField) -> String {
    if completeness.has_present(field) {
        "✅ Present".to_string()
    } else {
        "❌ Missing".to_string()
    }
}

/// Run both checks and merge them into one report.
pub fn build_report(summary: &str) -> ValidationReport {
    let completeness = check_completeness(summary);
    let format = check_format(summary);

    let overall_status = if completeness.is_valid && format.format_valid {
        "VALID"
    } else {
        "INVALID"
    };

    let required_fields_status = RequiredFieldsStatus {
        patient_name: field_status(&completeness, &PATIENT_NAME),
        patient_age: field_status(&completeness, &PATIENT_AGE),
        recent_medical_events: field_status(&completeness, &RECENT_MEDICAL_EVENTS),
    };

    let recommendations = completeness
        .recommendations
        .iter()
        .chain(format.suggestions.iter())
        .cloned()
        .collect();

    ValidationReport {
        summary_validation_report: ReportBody {
            overall_status: overall_status.to_string(),
            completeness_check: completeness,
            format_check: format,
            required_fields_status,
            recommendations,
        },
    }
}

/// Completeness check rendered as pretty JSON.
pub fn completeness_json(summary: &str) -> String {
    serde_json::to_string_pretty(&check_completeness(summary)).unwrap_or_else(|e| {
        log::error!("Validation: failed to serialize completeness result: {}", e);
        serde_json::to_string(&ValidationResult::failed(e.to_string()))
            .unwrap_or_else(|_| r#"{"is_valid": false}"#.to_string())
    })
}

/// Format check rendered as pretty JSON.
pub fn format_json(summary: &str) -> String {
    serde_json::to_string_pretty(&check_format(summary)).unwrap_or_else(|e| {
        log::error!("Validation: failed to serialize format result: {}", e);
        serde_json::json!({
            "format_valid": false,
            "format_issues": [format!("❌ Format validation error: {}", e)],
            "suggestions": ["Please check the summary format and try again"],
        })
        .to_string()
    })
}

/// Combined report rendered as pretty JSON.
pub fn report_json(summary: &str) -> String {
    serde_json::to_string_pretty(&build_report(summary)).unwrap_or_else(|e| {
        log::error!("Validation: failed to serialize report: {}", e);
        serde_json::json!({
            "summary_validation_report": {
                "overall_status": "ERROR",
                "error": format!("Report generation failed: {}", e),
                "recommendations": ["Please check the summary data and try again"],
            }
        })
        .to_string()
    })
}
