use super::Tool;
use crate::validation;

pub struct ValidateSummaryCompleteness;

#[async_trait::async_trait]
impl Tool for ValidateSummaryCompleteness {
    fn name(&self) -> &str {
        "validate_summary_completeness"
    }

    fn description(&self) -> &str {
        "Validate that a medical summary contains all three required fields: \
         patient name, age, and recent medical events."
    }

    fn parameter(&self) -> &str {
        "summary_data"
    }

    async fn run(&self, summary_data: String) -> String {
        log::info!(
            "ValidateSummaryCompleteness: checking {} chars",
            summary_data.len()
        );
        validation::completeness_json(&summary_data)
    }
}

pub struct ValidateSummaryFormat;

#[async_trait::async_trait]
impl Tool for ValidateSummaryFormat {
    fn name(&self) -> &str {
        "validate_summary_format"
    }

    fn description(&self) -> &str {
        "Check if a medical summary follows the expected data patterns found in patient files."
    }

    fn parameter(&self) -> &str {
        "summary_data"
    }

    async fn run(&self, summary_data: String) -> String {
        validation::format_json(&summary_data)
    }
}

pub struct GenerateValidationReport;

#[async_trait::async_trait]
impl Tool for GenerateValidationReport {
    fn name(&self) -> &str {
        "generate_validation_report"
    }

    fn description(&self) -> &str {
        "Generate a detailed validation report for a medical summary with specific recommendations."
    }

    fn parameter(&self) -> &str {
        "summary_data"
    }

    async fn run(&self, summary_data: String) -> String {
        let report = validation::report_json(&summary_data);
        log::info!("GenerateValidationReport: report ready ({} chars)", report.len());
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[tokio::test]
    async fn test_completeness_tool_output() {
        let output = ValidateSummaryCompleteness
            .run(r#"{"name": "X", "age": 40, "conditions": ["Y"]}"#.to_string())
            .await;
        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["is_valid"], true);
        assert_eq!(value["present_fields"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_format_tool_flags_short_text() {
        let output = ValidateSummaryFormat.run("too short".to_string()).await;
        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["format_valid"], false);
        assert!(value["format_issues"]
            .as_array()
            .unwrap()
            .iter()
            .any(|issue| issue == "❌ Summary too short"));
    }

    #[tokio::test]
    async fn test_report_tool_output() {
        let output = GenerateValidationReport.run(String::new()).await;
        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["summary_validation_report"]["overall_status"], "INVALID");
        assert_eq!(
            value["summary_validation_report"]["required_fields_status"]["patient_name"],
            "❌ Missing"
        );
    }
}
