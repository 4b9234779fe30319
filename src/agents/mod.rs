pub mod fhir_summary;
pub mod patient;
pub mod summary_validation;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::agent_service::{AgentDefinition, AgentServiceClient, CreateAgentRequest};
use crate::patient_store::PatientStore;
use crate::tools::{self, ToolDefinition, ToolSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AgentType {
    #[serde(rename = "Patient_Agent")]
    Patient,
    #[serde(rename = "Fhir_Summary_Agent")]
    FhirSummary,
    #[serde(rename = "Summary_Validation_Agent")]
    SummaryValidation,
}

impl AgentType {
    pub const ALL: [AgentType; 3] = [
        AgentType::Patient,
        AgentType::FhirSummary,
        AgentType::SummaryValidation,
    ];

    /// Default agent name, also used for routing tool calls.
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentType::Patient => "Patient_Agent",
            AgentType::FhirSummary => "Fhir_Summary_Agent",
            AgentType::SummaryValidation => "Summary_Validation_Agent",
        }
    }

    pub fn default_system_message(&self) -> &'static str {
        match self {
            AgentType::Patient => patient::SYSTEM_MESSAGE,
            AgentType::FhirSummary => fhir_summary::SYSTEM_MESSAGE,
            AgentType::SummaryValidation => summary_validation::SYSTEM_MESSAGE,
        }
    }

    pub fn default_tools(&self, store: &PatientStore) -> ToolSet {
        match self {
            AgentType::Patient => patient::default_tools(store),
            AgentType::FhirSummary => fhir_summary::default_tools(store),
            AgentType::SummaryValidation => summary_validation::default_tools(),
        }
    }

    /// Sampling temperature sent with the definition. Validation runs at zero.
    pub fn temperature(&self) -> f32 {
        match self {
            AgentType::SummaryValidation => 0.0,
            _ => 0.7,
        }
    }
}

/// Overrides for [`Agent::new`]; anything left `None` takes the agent type's default.
#[derive(Default)]
pub struct AgentOptions {
    pub agent_name: Option<String>,
    pub session_id: String,
    pub user_id: String,
    pub tools: Option<ToolSet>,
    pub system_message: Option<String>,
}

/// A tool call relayed by the host framework.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionRequest {
    pub action: String,
    #[serde(default)]
    pub input: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionResponse {
    pub status: String,
    pub agent: String,
    pub action: String,
    pub result: String,
}

impl ActionResponse {
    fn failed(agent: &str, action: &str, result: String) -> Self {
        Self {
            status: "failed".to_string(),
            agent: agent.to_string(),
            action: action.to_string(),
            result,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            log::error!("Agent: failed to serialize action response: {}", e);
            format!(r#"{{"status":"failed","result":"Error: {}"}}"#, e)
        })
    }
}

/// An agent: a named set of tools plus the prompt and hosted definition that go with them.
pub struct Agent {
    pub agent_type: AgentType,
    pub name: String,
    pub session_id: String,
    pub user_id: String,
    pub system_message: String,
    tools: ToolSet,
    definition: Option<AgentDefinition>,
}

impl Agent {
    /// Build an agent locally, filling defaults. No hosted definition is attached.
    pub fn new(agent_type: AgentType, store: &PatientStore, options: AgentOptions) -> Self {
        Self {
            agent_type,
            name: options
                .agent_name
                .unwrap_or_else(|| agent_type.as_str().to_string()),
            session_id: options.session_id,
            user_id: options.user_id,
            system_message: options
                .system_message
                .unwrap_or_else(|| agent_type.default_system_message().to_string()),
            tools: options
                .tools
                .unwrap_or_else(|| agent_type.default_tools(store)),
            definition: None,
        }
    }

    /// Build an agent and register its definition with the hosted service.
    pub async fn create(
        agent_type: AgentType,
        store: &PatientStore,
        options: AgentOptions,
        client: &AgentServiceClient,
    ) -> Result<Self> {
        let mut agent = Self::new(agent_type, store, options);

        let request = agent.definition_request(&client.model);
        let definition = client
            .create_agent(&request)
            .await
            .with_context(|| format!("Failed to create agent definition for {}", agent.name))?;

        agent.definition = Some(definition);
        log::info!(
            "Created {} for session {} user {} ({} tools)",
            agent.name,
            agent.session_id,
            agent.user_id,
            agent.tools.len()
        );

        Ok(agent)
    }

    fn definition_request(&self, model: &str) -> CreateAgentRequest {
        CreateAgentRequest {
            name: self.name.clone(),
            model: model.to_string(),
            instructions: self.system_message.clone(),
            temperature: self.agent_type.temperature(),
            tools: self
                .tools
                .iter()
                .map(|t| ToolDefinition::from_tool(t.as_ref()))
                .collect(),
        }
    }

    pub fn definition(&self) -> Option<&AgentDefinition> {
        self.definition.as_ref()
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn tools_json_doc(&self) -> String {
        tools::tools_json_doc(&self.tools)
    }

    /// Run a tool by name. Unknown names come back as an `Error:` string.
    pub async fn invoke_tool(&self, tool_name: &str, input: String) -> String {
        let Some(tool) = self.tools.iter().find(|t| t.name() == tool_name) else {
            log::warn!("{}: unknown tool '{}'", self.name, tool_name);
            return format!(
                "Error: Unknown tool '{}'. Available tools: {}",
                tool_name,
                self.tool_names().join(", ")
            );
        };

        log::debug!("{}: invoking {}", self.name, tool_name);
        tool.run(input).await
    }

    pub async fn handle_action(&self, request: ActionRequest) -> ActionResponse {
        let result = self.invoke_tool(&request.action, request.input).await;
        let status = if result.starts_with("Error") {
            "failed"
        } else {
            "completed"
        };

        ActionResponse {
            status: status.to_string(),
            agent: self.name.clone(),
            action: request.action,
            result,
        }
    }

    /// JSON-in/JSON-out wrapper around [`Agent::handle_action`].
    pub async fn handle_action_request(&self, request_json: &str) -> String {
        match serde_json::from_str::<ActionRequest>(request_json) {
            Ok(request) => self.handle_action(request).await.to_json(),
            Err(e) => ActionResponse::failed(
                &self.name,
                "",
                format!("Error: Invalid action request: {}", e),
            )
            .to_json(),
        }
    }
}

/// The agents of one session, routable by name.
pub struct AgentSet {
    agents: Vec<Agent>,
}

impl AgentSet {
    pub fn new(agents: Vec<Agent>) -> Self {
        Self { agents }
    }

    /// Create every agent type for a session against the hosted service.
    pub async fn create_all(
        store: &PatientStore,
        client: &AgentServiceClient,
        session_id: &str,
        user_id: &str,
    ) -> Result<Self> {
        let mut agents = Vec::with_capacity(AgentType::ALL.len());
        for agent_type in AgentType::ALL {
            let options = AgentOptions {
                session_id: session_id.to_string(),
                user_id: user_id.to_string(),
                ..Default::default()
            };
            agents.push(Agent::create(agent_type, store, options, client).await?);
        }
        Ok(Self::new(agents))
    }

    pub fn get(&self, name: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.agents.iter().map(|a| a.name.as_str()).collect()
    }

    /// Handle one `{agent, action, input}` line and return one JSON line.
    pub async fn dispatch(&self, line: &str) -> String {
        #[derive(Deserialize)]
        struct Route {
            #[serde(default)]
            agent: String,
            #[serde(default)]
            action: String,
        }

        let route = match serde_json::from_str::<Route>(line) {
            Ok(route) => route,
            Err(e) => {
                return ActionResponse::failed(
                    "",
                    "",
                    format!("Error: Invalid action request: {}", e),
                )
                .to_json();
            }
        };

        match self.get(&route.agent) {
            Some(agent) => agent.handle_action_request(line).await,
            None => ActionResponse::failed(
                &route.agent,
                &route.action,
                format!(
                    "Error: Unknown agent '{}'. Available agents: {}",
                    route.agent,
                    self.names().join(", ")
                ),
            )
            .to_json(),
        }
    }

    /// Answer newline-delimited requests until EOF, one response line each.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .await
                .context("Failed to read action request")?;
            if read == 0 {
                break;
            }

            // Bad UTF-8 is replaced and then rejected as an invalid request
            let line = String::from_utf8_lossy(&buf);
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let response = self.dispatch(line).await;
            writer.write_all(response.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
        Ok(())
    }
}
