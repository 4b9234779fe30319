use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::tools::ToolDefinition;

/// Shared HTTP client for the hosted agent-definition API.
pub struct AgentServiceClient {
    pub endpoint: String,
    pub model: String,
    api_key: String,
    client: reqwest::Client,
}

/// Body of a create-agent request.
#[derive(Debug, Clone, Serialize)]
pub struct CreateAgentRequest {
    pub name: String,
    pub model: String,
    pub instructions: String,
    pub temperature: f32,
    pub tools: Vec<ToolDefinition>,
}

/// What the service hands back for a created agent.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AgentDefinition {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_created_at")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Services send either Unix seconds or an RFC 3339 string; anything else is dropped.
fn deserialize_created_at<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Timestamp {
        Unix(i64),
        Rfc3339(DateTime<Utc>),
        Other(serde_json::Value),
    }

    Ok(match Option::<Timestamp>::deserialize(deserializer)? {
        Some(Timestamp::Unix(secs)) => DateTime::from_timestamp(secs, 0),
        Some(Timestamp::Rfc3339(time)) => Some(time),
        Some(Timestamp::Other(_)) | None => None,
    })
}

impl AgentServiceClient {
    pub fn new(endpoint: String, model: String, api_key: String) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model,
            api_key,
            client: reqwest::Client::new(),
        }
    }

    /// Register an agent definition with the service.
    pub async fn create_agent(&self, request: &CreateAgentRequest) -> Result<AgentDefinition> {
        let mut builder = self
            .client
            .post(format!("{}/agents", self.endpoint))
            .json(request);

        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }

        let response = builder
            .send()
            .await
            .context("Failed to send request to agent service")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Agent service error ({}): {}", status, error_text);
        }

        let definition: AgentDefinition = response
            .json()
            .await
            .context("Failed to parse agent service response")?;

        log::info!(
            "AgentService: created agent '{}' (id {}, created {})",
            definition.name,
            definition.id,
            definition
                .created_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "unknown".to_string())
        );

        Ok(definition)
    }
}
