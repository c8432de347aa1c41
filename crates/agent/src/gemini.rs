use std::time::Duration;

use async_trait::async_trait;
use intent_core::config::{GeminiBackend, GeminiConfig};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::info;

use crate::llm::{GenerateContentResponse, GenerationError, TextGenerator};

const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

/// REST client for `generateContent` on Vertex AI or the Gemini API.
///
/// Holds no per-call state; the underlying connection pool is shared by clones.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    backend: GeminiBackend,
    base_url: String,
    project_id: String,
    location: String,
    credential: SecretString,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("backend", &self.backend)
            .field("base_url", &self.base_url)
            .field("project_id", &self.project_id)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    pub fn from_config(config: &GeminiConfig) -> Result<Self, GenerationError> {
        let credential = config
            .api_key
            .clone()
            .filter(|key| !key.expose_secret().trim().is_empty())
            .ok_or_else(|| GenerationError::Configuration("gemini.api_key is not set".into()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| GenerationError::Configuration(error.to_string()))?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| default_base_url(config.backend, &config.location));

        info!(
            event_name = "gateway.client.initialized",
            backend = ?config.backend,
            project_id = config.project_id.as_deref().unwrap_or(""),
            location = %config.location,
            model = %config.model,
            "gemini client initialized"
        );

        Ok(Self {
            client,
            backend: config.backend,
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone().unwrap_or_default(),
            location: config.location.clone(),
            credential,
        })
    }

    pub fn endpoint(&self, model: &str) -> String {
        match self.backend {
            GeminiBackend::VertexAi => format!(
                "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:generateContent",
                self.base_url, self.project_id, self.location, model
            ),
            GeminiBackend::GeminiApi => {
                format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
            }
        }
    }
}

fn default_base_url(backend: GeminiBackend, location: &str) -> String {
    match backend {
        GeminiBackend::VertexAi => format!("https://{location}-aiplatform.googleapis.com"),
        GeminiBackend::GeminiApi => "https://generativelanguage.googleapis.com".to_string(),
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate_content(
        &self,
        model: &str,
        prompt: &str,
    ) -> Result<GenerateContentResponse, GenerationError> {
        let body = GenerateContentRequest {
            contents: [RequestContent { role: "user", parts: [RequestPart { text: prompt }] }],
        };

        let request = self.client.post(self.endpoint(model)).json(&body);
        let request = match self.backend {
            GeminiBackend::VertexAi => request.bearer_auth(self.credential.expose_secret()),
            GeminiBackend::GeminiApi => {
                request.header("x-goog-api-key", self.credential.expose_secret())
            }
        };

        let response =
            request.send().await.map_err(|error| GenerationError::Request(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|error| GenerationError::Decode(error.to_string()))
    }
}
