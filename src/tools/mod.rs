pub mod fhir_summary;
pub mod patient_lookup;
pub mod summary_validation;

pub use fhir_summary::{AnalyzePatientData, GeneratePatientSummary};
pub use patient_lookup::GetPatientById;
pub use summary_validation::{
    GenerateValidationReport, ValidateSummaryCompleteness, ValidateSummaryFormat,
};

use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// A function the hosted agent framework can call.
///
/// Every tool takes a single string argument and answers with a string;
/// failures are reported in-band as `Error: ...` text, never as `Err`.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;

    /// Name of the single string parameter.
    fn parameter(&self) -> &str;

    async fn run(&self, input: String) -> String;

    /// JSON schema of the arguments, as sent with the agent definition.
    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                self.parameter(): { "type": "string" }
            },
            "required": [self.parameter()]
        })
    }
}

pub type ToolSet = Vec<Arc<dyn Tool>>;

/// Function-tool entry in an agent definition request.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionDefinition,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolDefinition {
    pub fn from_tool(tool: &dyn Tool) -> Self {
        Self {
            kind: "function".to_string(),
            function: FunctionDefinition {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters_schema(),
            },
        }
    }
}

/// Catalogue of a tool set for planners:
/// `[{function_name, description, parameters: {<arg>: {type, default}}}]`.
pub fn tools_json_doc(tools: &[Arc<dyn Tool>]) -> String {
    let entries: Vec<Value> = tools
        .iter()
        .map(|tool| {
            json!({
                "function_name": tool.name(),
                "description": tool.description(),
                "parameters": {
                    tool.parameter(): { "type": "string", "default": null }
                }
            })
        })
        .collect();

    Value::Array(entries).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait::async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Repeat the input."
        }

        fn parameter(&self) -> &str {
            "text"
        }

        async fn run(&self, input: String) -> String {
            input
        }
    }

    #[test]
    fn test_parameters_schema() {
        let schema = Echo.parameters_schema();
        assert_eq!(schema["properties"]["text"]["type"], "string");
        assert_eq!(schema["required"], json!(["text"]));
    }

    #[test]
    fn test_tool_definition() {
        let definition = ToolDefinition::from_tool(&Echo);
        let value = serde_json::to_value(&definition).unwrap();
        assert_eq!(value["type"], "function");
        assert_eq!(value["function"]["name"], "echo");
        assert_eq!(value["function"]["description"], "Repeat the input.");
    }

    #[test]
    fn test_tools_json_doc() {
        let tools: ToolSet = vec![Arc::new(Echo)];
        let doc: Value = serde_json::from_str(&tools_json_doc(&tools)).unwrap();
        assert_eq!(
            doc,
            json!([{
                "function_name": "echo",
                "description": "Repeat the input.",
                "parameters": { "text": { "type": "string", "default": null } }
            }])
        );
    }

    #[tokio::test]
    async fn test_run_through_trait_object() {
        let tool: Arc<dyn Tool> = Arc::new(Echo);
        assert_eq!(tool.run("hello".to_string()).await, "hello");
    }
}
