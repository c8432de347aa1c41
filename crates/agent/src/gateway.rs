use std::collections::BTreeMap;
use std::time::Instant;

use async_trait::async_trait;
use intent_core::AnalysisRequest;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::extract::{parse_reply, reply_text};
use crate::llm::{GenerationError, TextGenerator};
use crate::prompt::build_prompt;

pub const HEALTH_PROBE_TEXT: &str = "test";
pub const HEALTH_PROBE_DOMAIN: &str = "health_check";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("model generation failed: {0}")]
    Generation(#[from] GenerationError),
    #[error("no candidates in model response")]
    NoCandidates,
    #[error("no content parts in model response")]
    NoContentParts,
    #[error("empty response text")]
    EmptyResponseText,
    #[error("no JSON object found in model response")]
    NoJsonPayload { raw: String },
    #[error("failed to parse JSON payload: {source}")]
    MalformedPayload {
        payload: String,
        #[source]
        source: serde_json::Error,
    },
}

impl GatewayError {
    /// Whether the failure happened after the model answered.
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, Self::NoJsonPayload { .. } | Self::MalformedPayload { .. })
    }
}

/// The model's reply as it appears on the wire. Codes stay open strings here;
/// the service maps them onto the closed enums.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelReply {
    #[serde(deserialize_with = "null_as_default")]
    pub intent_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub domain_specific_intent: String,
    #[serde(deserialize_with = "null_as_default")]
    pub keywords: Vec<ModelKeyword>,
    pub priority: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub confidence: f64,
    pub emotional_tone: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub urgency_indicators: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub reasoning: String,
    #[serde(deserialize_with = "null_as_default")]
    pub intent_scores: BTreeMap<String, f64>,
    /// Measured by the gateway, never read from the payload.
    #[serde(skip)]
    pub model_call_time_ms: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelKeyword {
    #[serde(deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(deserialize_with = "null_as_default")]
    pub weight: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub category: String,
}

/// Explicit `null` reads as the zero value, same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<ModelReply, GatewayError>;

    /// Runs a real analysis with a fixed placeholder message, so every probe
    /// costs one model call.
    async fn is_healthy(&self) -> bool {
        let probe = AnalysisRequest::new(HEALTH_PROBE_TEXT, HEALTH_PROBE_DOMAIN);
        self.analyze(&probe).await.is_ok()
    }

    fn model_version(&self) -> &str;
}

pub struct GeminiGateway<G> {
    generator: G,
    model: String,
}

impl<G> GeminiGateway<G>
where
    G: TextGenerator,
{
    pub fn new(generator: G, model: impl Into<String>) -> Self {
        Self { generator, model: model.into() }
    }
}

#[async_trait]
impl<G> ModelGateway for GeminiGateway<G>
where
    G: TextGenerator,
{
    async fn analyze(&self, request: &AnalysisRequest) -> Result<ModelReply, GatewayError> {
        let started = Instant::now();

        info!(
            event_name = "gateway.analyze.start",
            domain = %request.domain,
            user_id = %request.user_id,
            model = %self.model,
            "analyzing intent with gemini"
        );

        let prompt = build_prompt(request);
        let response =
            self.generator.generate_content(&self.model, &prompt).await.map_err(|source| {
                error!(
                    event_name = "gateway.analyze.generation_failed",
                    error = %source,
                    "gemini generation failed"
                );
                GatewayError::from(source)
            })?;

        let raw = reply_text(&response).map_err(|error| {
            error!(
                event_name = "gateway.analyze.unusable_response",
                error = %error,
                "gemini response had no usable text"
            );
            error
        })?;
        debug!(
            event_name = "gateway.analyze.raw_response",
            raw_response = %raw,
            "raw gemini response"
        );

        let mut reply = parse_reply(raw).map_err(|error| {
            match &error {
                GatewayError::MalformedPayload { payload, source } => error!(
                    event_name = "gateway.analyze.parse_failed",
                    json_text = %payload,
                    error = %source,
                    "failed to parse JSON response"
                ),
                other => error!(
                    event_name = "gateway.analyze.parse_failed",
                    raw_response = %raw,
                    error = %other,
                    "no JSON payload in gemini response"
                ),
            }
            error
        })?;
        reply.model_call_time_ms = elapsed_ms(started);

        info!(
            event_name = "gateway.analyze.completed",
            intent = %reply.intent_type,
            confidence = reply.confidence,
            duration_ms = reply.model_call_time_ms,
            "intent analysis completed with gemini"
        );

        Ok(reply)
    }

    fn model_version(&self) -> &str {
        &self.model
    }
}

pub(crate) fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use intent_core::AnalysisRequest;

    use crate::llm::{GenerateContentResponse, GenerationError, TextGenerator};

    use super::{GatewayError, GeminiGateway, ModelGateway};

    struct ScriptedGenerator {
        replies: Mutex<VecDeque<Result<GenerateContentResponse, GenerationError>>>,
        prompts: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedGenerator {
        fn new(replies: Vec<Result<GenerateContentResponse, GenerationError>>) -> Self {
            Self { replies: Mutex::new(replies.into()), prompts: Mutex::new(Vec::new()) }
        }

        fn prompts(&self) -> Vec<(String, String)> {
            self.prompts.lock().expect("prompt lock").clone()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate_content(
            &self,
            model: &str,
            prompt: &str,
        ) -> Result<GenerateContentResponse, GenerationError> {
            self.prompts.lock().expect("prompt lock").push((model.to_string(), prompt.to_string()));
            self.replies
                .lock()
                .expect("reply lock")
                .pop_front()
                .unwrap_or_else(|| Err(GenerationError::Request("script exhausted".to_string())))
        }
    }

    #[async_trait]
    impl<'a> TextGenerator for &'a ScriptedGenerator {
        async fn generate_content(
            &self,
            model: &str,
            prompt: &str,
        ) -> Result<GenerateContentResponse, GenerationError> {
            (**self).generate_content(model, prompt).await
        }
    }

    const REPLY: &str = "```json\n{\"intent_type\":\"report_issue\",\"domain_specific_intent\":\"server_hang\",\"priority\":\"P1\",\"confidence\":0.9,\"emotional_tone\":\"urgent\",\"urgency_indicators\":[\"급해요\"],\"reasoning\":\"repeated outage\"}\n```";

    #[tokio::test]
    async fn analyze_sends_prompt_to_configured_model_and_parses_reply() {
        let generator = ScriptedGenerator::new(vec![Ok(GenerateContentResponse::from_text(REPLY))]);
        let gateway = GeminiGateway::new(&generator, "gemini-1.5-pro-001");

        let reply = gateway
            .analyze(&AnalysisRequest::new("서버가 계속 멈춰요, 급해요", "infra"))
            .await
            .expect("analysis should succeed");

        assert_eq!(reply.intent_type, "report_issue");
        assert_eq!(reply.domain_specific_intent, "server_hang");
        assert_eq!(reply.urgency_indicators, vec!["급해요".to_string()]);

        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].0, "gemini-1.5-pro-001");
        assert!(prompts[0].1.contains("서버가 계속 멈춰요, 급해요"));
        assert_eq!(gateway.model_version(), "gemini-1.5-pro-001");
    }

    #[tokio::test]
    async fn generation_failure_is_reported_as_gateway_error() {
        let generator = ScriptedGenerator::new(vec![Err(GenerationError::Status {
            status: 503,
            body: "backend unavailable".to_string(),
        })]);
        let gateway = GeminiGateway::new(&generator, "gemini-1.5-pro-001");

        let error = gateway
            .analyze(&AnalysisRequest::new("hello", "general"))
            .await
            .expect_err("generation failure should propagate");

        assert!(matches!(
            error,
            GatewayError::Generation(GenerationError::Status { status: 503, .. })
        ));
        assert!(!error.is_parse_failure());
    }

    #[tokio::test]
    async fn prose_only_reply_is_a_parse_failure() {
        let generator = ScriptedGenerator::new(vec![Ok(GenerateContentResponse::from_text(
            "Sorry, I cannot help with that.",
        ))]);
        let gateway = GeminiGateway::new(&generator, "gemini-1.5-pro-001");

        let error = gateway
            .analyze(&AnalysisRequest::new("hello", "general"))
            .await
            .expect_err("no payload");

        assert!(matches!(error, GatewayError::NoJsonPayload { .. }));
        assert!(error.is_parse_failure());
    }

    #[tokio::test]
    async fn empty_candidate_list_is_reported() {
        let generator = ScriptedGenerator::new(vec![Ok(GenerateContentResponse::default())]);
        let gateway = GeminiGateway::new(&generator, "gemini-1.5-pro-001");

        let error = gateway
            .analyze(&AnalysisRequest::new("hello", "general"))
            .await
            .expect_err("no candidates");

        assert!(matches!(error, GatewayError::NoCandidates));
    }

    #[tokio::test]
    async fn health_probe_uses_placeholder_request() {
        let generator = ScriptedGenerator::new(vec![
            Ok(GenerateContentResponse::from_text("{\"intent_type\":\"question_general\"}")),
            Err(GenerationError::Request("connection refused".to_string())),
        ]);
        let gateway = GeminiGateway::new(&generator, "gemini-1.5-pro-001");

        assert!(gateway.is_healthy().await);
        assert!(!gateway.is_healthy().await);

        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].1.contains("Message: \"test\""));
        assert!(prompts[0].1.contains("Domain: health_check"));
    }
}
