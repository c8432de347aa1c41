use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use intent_core::config::{AppConfig, LoadOptions, DEFAULT_CONFIG_FILES};
use secrecy::ExposeSecret;
use toml::Value;

use crate::commands::CommandResult;

struct Field {
    key: &'static str,
    env_keys: &'static [&'static str],
    value: String,
}

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("config validation failed: {error}"),
                2,
            );
        }
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines =
        vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in fields(&config) {
        let source = field_source(
            field.key,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key, &field.value, source));
    }

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

fn fields(config: &AppConfig) -> Vec<Field> {
    let unset = || "<unset>".to_string();

    vec![
        Field {
            key: "server.bind_address",
            env_keys: &["INTENT_SERVER_BIND_ADDRESS"],
            value: config.server.bind_address.clone(),
        },
        Field {
            key: "server.port",
            env_keys: &["INTENT_SERVER_PORT"],
            value: config.server.port.to_string(),
        },
        Field {
            key: "server.graceful_shutdown_secs",
            env_keys: &["INTENT_SERVER_GRACEFUL_SHUTDOWN_SECS"],
            value: config.server.graceful_shutdown_secs.to_string(),
        },
        Field {
            key: "gemini.backend",
            env_keys: &["INTENT_GEMINI_BACKEND"],
            value: format!("{:?}", config.gemini.backend),
        },
        Field {
            key: "gemini.project_id",
            env_keys: &["INTENT_GEMINI_PROJECT_ID"],
            value: config.gemini.project_id.clone().unwrap_or_else(unset),
        },
        Field {
            key: "gemini.location",
            env_keys: &["INTENT_GEMINI_LOCATION"],
            value: config.gemini.location.clone(),
        },
        Field {
            key: "gemini.model",
            env_keys: &["INTENT_GEMINI_MODEL"],
            value: config.gemini.model.clone(),
        },
        Field {
            key: "gemini.api_key",
            env_keys: &["INTENT_GEMINI_API_KEY"],
            value: config
                .gemini
                .api_key
                .as_ref()
                .map(|key| redact_secret(key.expose_secret()))
                .unwrap_or_else(unset),
        },
        Field {
            key: "gemini.base_url",
            env_keys: &["INTENT_GEMINI_BASE_URL"],
            value: config.gemini.base_url.clone().unwrap_or_else(unset),
        },
        Field {
            key: "gemini.timeout_secs",
            env_keys: &["INTENT_GEMINI_TIMEOUT_SECS"],
            value: config.gemini.timeout_secs.to_string(),
        },
        Field {
            key: "logging.level",
            env_keys: &["INTENT_LOGGING_LEVEL", "INTENT_LOG_LEVEL"],
            value: config.logging.level.clone(),
        },
        Field {
            key: "logging.format",
            env_keys: &["INTENT_LOGGING_FORMAT", "INTENT_LOG_FORMAT"],
            value: format!("{:?}", config.logging.format),
        },
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    DEFAULT_CONFIG_FILES.into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

/// Keeps a short recognizable prefix (`AIza`, `ya29`) and hides the rest.
fn redact_secret(secret: &str) -> String {
    let trimmed = secret.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    let prefix: String = trimmed.chars().take(4).collect();
    if trimmed.chars().count() > 12 {
        return format!("{prefix}***");
    }

    "<redacted>".to_string()
}
