use std::sync::Arc;
use std::time::Instant;

use intent_core::{
    AnalysisRequest, AnalysisResult, EmotionalTone, Keyword, Priority, ProcessingMetrics,
};
use tracing::{error, info};

use crate::gateway::{elapsed_ms, GatewayError, ModelGateway, ModelKeyword, ModelReply};

/// Translates between the domain request/result and the gateway's wire reply.
#[derive(Clone)]
pub struct IntentService {
    gateway: Arc<dyn ModelGateway>,
}

impl IntentService {
    pub fn new(gateway: Arc<dyn ModelGateway>) -> Self {
        Self { gateway }
    }

    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, GatewayError> {
        let started = Instant::now();

        info!(
            event_name = "service.analyze.start",
            domain = %request.domain,
            user_id = %request.user_id,
            session_id = %request.session_id,
            context_messages = request.context_messages.len(),
            "starting intent analysis"
        );

        let reply = self.gateway.analyze(request).await.map_err(|error| {
            error!(event_name = "service.analyze.failed", error = %error, "gemini analysis failed");
            error
        })?;

        let result = into_result(reply, started, self.gateway.model_version());

        info!(
            event_name = "service.analyze.completed",
            intent = %result.intent_type,
            confidence = result.confidence,
            priority = result.priority.code(),
            processing_time_ms = result.metrics.processing_time_ms,
            "intent analysis completed"
        );

        Ok(result)
    }

    pub async fn is_healthy(&self) -> bool {
        self.gateway.is_healthy().await
    }
}

fn into_result(reply: ModelReply, started: Instant, model_version: &str) -> AnalysisResult {
    let priority = Priority::from_code(reply.priority.as_deref().unwrap_or_default());
    let emotional_tone =
        EmotionalTone::from_code(reply.emotional_tone.as_deref().unwrap_or_default());
    let keywords = reply.keywords.into_iter().map(into_keyword).collect();
    let model_call_time_ms = reply.model_call_time_ms;

    AnalysisResult {
        intent_type: reply.intent_type,
        domain_specific_intent: reply.domain_specific_intent,
        keywords,
        priority,
        confidence: reply.confidence,
        emotional_tone,
        urgency_indicators: reply.urgency_indicators,
        reasoning: reply.reasoning,
        intent_scores: reply.intent_scores,
        metrics: ProcessingMetrics {
            processing_time_ms: elapsed_ms(started),
            model_call_time_ms,
            cache_hit_count: 0,
            model_version: model_version.to_string(),
            cache_hit: false,
        },
    }
}

fn into_keyword(keyword: ModelKeyword) -> Keyword {
    Keyword { text: keyword.text, weight: keyword.weight, category: keyword.category }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use intent_core::{AnalysisRequest, EmotionalTone, Priority};

    use crate::gateway::{GatewayError, ModelGateway, ModelKeyword, ModelReply};
    use crate::llm::GenerationError;

    use super::IntentService;

    struct FakeGateway {
        reply: Mutex<Option<Result<ModelReply, GatewayError>>>,
        calls: AtomicUsize,
    }

    impl FakeGateway {
        fn replying(reply: Result<ModelReply, GatewayError>) -> Arc<Self> {
            Arc::new(Self { reply: Mutex::new(Some(reply)), calls: AtomicUsize::new(0) })
        }
    }

    #[async_trait]
    impl ModelGateway for FakeGateway {
        async fn analyze(&self, _request: &AnalysisRequest) -> Result<ModelReply, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.lock().expect("reply lock").take().unwrap_or(Err(GatewayError::NoCandidates))
        }

        fn model_version(&self) -> &str {
            "gemini-test-001"
        }
    }

    fn reply(priority: Option<&str>, tone: Option<&str>) -> ModelReply {
        ModelReply {
            intent_type: "report_issue".to_string(),
            domain_specific_intent: "server_hang".to_string(),
            keywords: vec![
                ModelKeyword {
                    text: "서버".to_string(),
                    weight: 0.9,
                    category: "technical".to_string(),
                },
                ModelKeyword {
                    text: "급해요".to_string(),
                    weight: 0.7,
                    category: "action".to_string(),
                },
                ModelKeyword {
                    text: "서버".to_string(),
                    weight: 0.4,
                    category: "domain".to_string(),
                },
            ],
            priority: priority.map(str::to_string),
            confidence: 0.88,
            emotional_tone: tone.map(str::to_string),
            urgency_indicators: vec!["급해요".to_string()],
            reasoning: "service keeps stopping".to_string(),
            intent_scores: BTreeMap::from([
                ("report_issue".to_string(), 0.8),
                ("request_help".to_string(), 0.7),
            ]),
            model_call_time_ms: 42,
        }
    }

    #[tokio::test]
    async fn urgent_infra_message_maps_to_urgent_priority_and_tone() {
        let gateway = FakeGateway::replying(Ok(reply(Some("P1"), Some("urgent"))));
        let service = IntentService::new(gateway.clone());

        let result = service
            .analyze(&AnalysisRequest::new("서버가 계속 멈춰요, 급해요", "infra"))
            .await
            .expect("analysis should succeed");

        assert_eq!(result.priority, Priority::Urgent);
        assert_eq!(result.emotional_tone, EmotionalTone::Urgent);
        assert_eq!(result.intent_type, "report_issue");
        assert_eq!(result.urgency_indicators, vec!["급해요".to_string()]);
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_codes_fall_back_to_closed_defaults() {
        let cases = [
            (Some("P7"), Some("furious")),
            (Some(""), Some("")),
            (None, None),
            (Some("high"), Some("URGENT!")),
        ];

        for (priority, tone) in cases {
            let service = IntentService::new(FakeGateway::replying(Ok(reply(priority, tone))));
            let result = service
                .analyze(&AnalysisRequest::new("hello", "general"))
                .await
                .expect("analysis should succeed");

            assert_eq!(result.priority, Priority::Medium, "priority code {priority:?}");
            assert_eq!(result.emotional_tone, EmotionalTone::Neutral, "tone code {tone:?}");
        }
    }

    #[tokio::test]
    async fn keywords_and_scores_are_copied_without_reordering() {
        let service = IntentService::new(FakeGateway::replying(Ok(reply(Some("P2"), None))));

        let result = service
            .analyze(&AnalysisRequest::new("hello", "general"))
            .await
            .expect("analysis should succeed");

        let texts: Vec<&str> =
            result.keywords.iter().map(|keyword| keyword.text.as_str()).collect();
        assert_eq!(texts, vec!["서버", "급해요", "서버"]);
        assert_eq!(result.keywords[2].category, "domain");
        assert_eq!(result.intent_scores.len(), 2);
        assert_eq!(result.intent_scores.get("request_help"), Some(&0.7));
        assert_eq!(result.priority, Priority::High);
    }

    #[tokio::test]
    async fn metrics_carry_model_timing_and_no_cache_activity() {
        let service = IntentService::new(FakeGateway::replying(Ok(reply(None, None))));

        let result = service
            .analyze(&AnalysisRequest::new("hello", "general"))
            .await
            .expect("analysis should succeed");

        assert_eq!(result.metrics.model_call_time_ms, 42);
        assert_eq!(result.metrics.model_version, "gemini-test-001");
        assert_eq!(result.metrics.cache_hit_count, 0);
        assert!(!result.metrics.cache_hit);
    }

    #[tokio::test]
    async fn gateway_errors_propagate_unchanged() {
        let service = IntentService::new(FakeGateway::replying(Err(GatewayError::Generation(
            GenerationError::Request("connection reset".to_string()),
        ))));

        let error = service
            .analyze(&AnalysisRequest::new("hello", "general"))
            .await
            .expect_err("gateway failure should propagate");

        assert!(matches!(
            error,
            GatewayError::Generation(GenerationError::Request(ref message))
                if message == "connection reset"
        ));
    }

    #[tokio::test]
    async fn health_delegates_to_gateway_probe() {
        let healthy = IntentService::new(FakeGateway::replying(Ok(reply(None, None))));
        let unhealthy = IntentService::new(FakeGateway::replying(Err(GatewayError::NoCandidates)));

        assert!(healthy.is_healthy().await);
        assert!(!unhealthy.is_healthy().await);
    }
}
