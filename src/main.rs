mod agent_service;
mod agents;
mod config;
mod fhir;
mod patient_store;
mod summary;
mod tools;
mod validation;

use agent_service::AgentServiceClient;
use agents::AgentSet;
use anyhow::Result;
use config::Config;
use patient_store::PatientStore;
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Load configuration
    let config = Config::from_file("config.toml")?;

    // Initialize logging; RUST_LOG takes precedence over the configured level
    let filters = std::env::var("RUST_LOG").unwrap_or_else(|_| config.logging.level.clone());
    pretty_env_logger::formatted_builder()
        .parse_filters(&filters)
        .init();
    log::info!("Starting clinical agents tool host...");

    config.check_data_dir()?;
    let store = PatientStore::new(&config.data.patients_dir);
    log::info!("Patient data directory: {}", store.base_dir().display());

    let client = AgentServiceClient::new(
        config.agent_service.endpoint.clone(),
        config.agent_service.model.clone(),
        config.agent_service.api_key.clone(),
    );

    let session_id = uuid::Uuid::new_v4().to_string();
    let agents = AgentSet::create_all(&store, &client, &session_id, &config.session.user_id).await?;

    for agent in agents.iter() {
        let definition_id = agent
            .definition()
            .map(|d| d.id.as_str())
            .unwrap_or("none");
        log::info!(
            "{} ready (definition {}): {}",
            agent.name,
            definition_id,
            agent.tool_names().join(", ")
        );
        log::debug!("{} tool catalogue: {}", agent.name, agent.tools_json_doc());
    }
    log::info!("Session {} ready, reading tool calls from stdin", session_id);

    // One JSON request per line in, one JSON response per line out
    agents
        .serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await?;

    log::info!("Tool host stopped");
    Ok(())
}
