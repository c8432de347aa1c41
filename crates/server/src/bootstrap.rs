use std::sync::Arc;

use intent_agent::gateway::GeminiGateway;
use intent_agent::gemini::GeminiClient;
use intent_agent::llm::GenerationError;
use intent_agent::service::IntentService;
use intent_core::config::{AppConfig, ConfigError};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub service: IntentService,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("gemini client initialization failed: {0}")]
    Client(#[source] GenerationError),
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        backend = ?config.gemini.backend,
        model = %config.gemini.model,
        "starting application bootstrap"
    );

    let client = GeminiClient::from_config(&config.gemini).map_err(BootstrapError::Client)?;
    let gateway = GeminiGateway::new(client, config.gemini.model.clone());
    let service = IntentService::new(Arc::new(gateway));

    info!(
        event_name = "system.bootstrap.ready",
        correlation_id = "bootstrap",
        listen_address = %config.listen_address(),
        "application bootstrap completed"
    );

    Ok(Application { config, service })
}
