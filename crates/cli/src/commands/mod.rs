pub mod analyze;
pub mod config;
pub mod doctor;

use intent_agent::gateway::GeminiGateway;
use intent_agent::gemini::GeminiClient;
use intent_agent::llm::GenerationError;
use intent_agent::service::IntentService;
use intent_core::config::AppConfig;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Same wiring as the server: Gemini client behind the gateway behind the service.
fn build_service(config: &AppConfig) -> Result<IntentService, GenerationError> {
    let client = GeminiClient::from_config(&config.gemini)?;
    let gateway = GeminiGateway::new(client, config.gemini.model.clone());
    Ok(IntentService::new(Arc::new(gateway)))
}

fn current_thread_runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread().enable_all().build()
}
