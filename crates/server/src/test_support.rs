use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use intent_agent::gateway::{GatewayError, ModelGateway, ModelKeyword, ModelReply};
use intent_agent::service::IntentService;
use intent_core::AnalysisRequest;

/// Gateway that replays a fixed script and counts calls.
pub struct FakeGateway {
    replies: Mutex<VecDeque<Result<ModelReply, GatewayError>>>,
    calls: AtomicUsize,
}

impl FakeGateway {
    pub fn replying(replies: Vec<Result<ModelReply, GatewayError>>) -> Arc<Self> {
        Arc::new(Self { replies: Mutex::new(replies.into()), calls: AtomicUsize::new(0) })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn service(self: &Arc<Self>) -> IntentService {
        IntentService::new(self.clone())
    }
}

#[async_trait]
impl ModelGateway for FakeGateway {
    async fn analyze(&self, _request: &AnalysisRequest) -> Result<ModelReply, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .lock()
            .expect("reply lock")
            .pop_front()
            .unwrap_or(Err(GatewayError::NoCandidates))
    }

    fn model_version(&self) -> &str {
        "gemini-test-001"
    }
}

pub fn reply(priority: &str, tone: &str) -> ModelReply {
    ModelReply {
        intent_type: "report_issue".to_string(),
        domain_specific_intent: "server_hang".to_string(),
        keywords: vec![ModelKeyword {
            text: "서버".to_string(),
            weight: 0.9,
            category: "technical".to_string(),
        }],
        priority: Some(priority.to_string()),
        confidence: 0.91,
        emotional_tone: Some(tone.to_string()),
        urgency_indicators: vec!["급해요".to_string()],
        reasoning: "service keeps stopping".to_string(),
        intent_scores: BTreeMap::from([("report_issue".to_string(), 0.91)]),
        model_call_time_ms: 12,
    }
}
