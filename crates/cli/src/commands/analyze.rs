use intent_core::config::{AppConfig, LoadOptions};
use intent_core::AnalysisRequest;

use crate::commands::{build_service, current_thread_runtime, CommandResult};

const COMMAND: &str = "analyze";

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_ANALYSIS: u8 = 3;
/// EX_USAGE from sysexits.h.
pub const EXIT_EMPTY_TEXT: u8 = 64;

pub fn run(text: &str, domain: &str, context: Vec<String>) -> CommandResult {
    if text.is_empty() {
        return CommandResult::failure(
            COMMAND,
            "invalid_argument",
            "text field is required",
            EXIT_EMPTY_TEXT,
        );
    }

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "config_validation",
                format!("configuration issue: {error}"),
                EXIT_CONFIG,
            );
        }
    };

    let service = match build_service(&config) {
        Ok(service) => service,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "client_init",
                error.to_string(),
                EXIT_CONFIG,
            );
        }
    };

    let runtime = match current_thread_runtime() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                EXIT_ANALYSIS,
            );
        }
    };

    let mut request = AnalysisRequest::new(text, domain);
    request.context_messages = context;

    match runtime.block_on(service.analyze(&request)) {
        Ok(result) => match serde_json::to_string_pretty(&result) {
            Ok(output) => CommandResult { exit_code: 0, output },
            Err(error) => CommandResult::failure(
                COMMAND,
                "serialization",
                error.to_string(),
                EXIT_ANALYSIS,
            ),
        },
        Err(error) => {
            let error_class = if error.is_parse_failure() { "model_reply" } else { "model_call" };
            CommandResult::failure(COMMAND, error_class, error.to_string(), EXIT_ANALYSIS)
        }
    }
}
