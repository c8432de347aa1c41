//! Wire shapes for the HTTP/JSON surface.
//!
//! Enum names on the wire are upper-case and prefixed (`PRIORITY_URGENT`,
//! `TONE_FRUSTRATED`) so that clients can treat them as opaque tags independent
//! of the short codes the model emits.

use std::collections::BTreeMap;

use chrono::Utc;
use intent_core::{AnalysisRequest, AnalysisResult, EmotionalTone, Keyword, Priority};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AnalyzeIntentRequest {
    pub text: String,
    pub domain: String,
    pub user_id: String,
    pub session_id: String,
    pub context_messages: Vec<String>,
    pub metadata: BTreeMap<String, String>,
}

impl AnalyzeIntentRequest {
    pub fn into_domain(self) -> AnalysisRequest {
        AnalysisRequest {
            text: self.text,
            domain: self.domain,
            user_id: self.user_id,
            session_id: self.session_id,
            context_messages: self.context_messages,
            metadata: self.metadata,
            received_at: Utc::now(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportPriority {
    #[serde(rename = "PRIORITY_LOW")]
    Low,
    #[serde(rename = "PRIORITY_MEDIUM")]
    Medium,
    #[serde(rename = "PRIORITY_HIGH")]
    High,
    #[serde(rename = "PRIORITY_URGENT")]
    Urgent,
    #[serde(rename = "PRIORITY_CRITICAL")]
    Critical,
}

impl From<Priority> for TransportPriority {
    fn from(value: Priority) -> Self {
        match value {
            Priority::Low => Self::Low,
            Priority::Medium => Self::Medium,
            Priority::High => Self::High,
            Priority::Urgent => Self::Urgent,
            Priority::Critical => Self::Critical,
        }
    }
}

impl From<TransportPriority> for Priority {
    fn from(value: TransportPriority) -> Self {
        match value {
            TransportPriority::Low => Self::Low,
            TransportPriority::Medium => Self::Medium,
            TransportPriority::High => Self::High,
            TransportPriority::Urgent => Self::Urgent,
            TransportPriority::Critical => Self::Critical,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportTone {
    #[serde(rename = "TONE_NEUTRAL")]
    Neutral,
    #[serde(rename = "TONE_POSITIVE")]
    Positive,
    #[serde(rename = "TONE_NEGATIVE")]
    Negative,
    #[serde(rename = "TONE_FRUSTRATED")]
    Frustrated,
    #[serde(rename = "TONE_URGENT")]
    Urgent,
    #[serde(rename = "TONE_GRATEFUL")]
    Grateful,
}

impl From<EmotionalTone> for TransportTone {
    fn from(value: EmotionalTone) -> Self {
        match value {
            EmotionalTone::Neutral => Self::Neutral,
            EmotionalTone::Positive => Self::Positive,
            EmotionalTone::Negative => Self::Negative,
            EmotionalTone::Frustrated => Self::Frustrated,
            EmotionalTone::Urgent => Self::Urgent,
            EmotionalTone::Grateful => Self::Grateful,
        }
    }
}

impl From<TransportTone> for EmotionalTone {
    fn from(value: TransportTone) -> Self {
        match value {
            TransportTone::Neutral => Self::Neutral,
            TransportTone::Positive => Self::Positive,
            TransportTone::Negative => Self::Negative,
            TransportTone::Frustrated => Self::Frustrated,
            TransportTone::Urgent => Self::Urgent,
            TransportTone::Grateful => Self::Grateful,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeywordBody {
    pub text: String,
    pub weight: f64,
    pub category: String,
}

impl From<Keyword> for KeywordBody {
    fn from(value: Keyword) -> Self {
        Self { text: value.text, weight: value.weight, category: value.category }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricsBody {
    pub processing_time_ms: u64,
    pub model_call_time_ms: u64,
    pub cache_hit_count: u64,
    pub model_version: String,
    pub cache_hit: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeIntentResponse {
    pub intent_type: String,
    pub domain_specific_intent: String,
    pub keywords: Vec<KeywordBody>,
    pub confidence: f64,
    pub priority: TransportPriority,
    pub emotional_tone: TransportTone,
    pub urgency_indicators: Vec<String>,
    pub intent_scores: BTreeMap<String, f64>,
    pub reasoning: String,
    pub metrics: MetricsBody,
}

impl From<AnalysisResult> for AnalyzeIntentResponse {
    fn from(value: AnalysisResult) -> Self {
        Self {
            intent_type: value.intent_type,
            domain_specific_intent: value.domain_specific_intent,
            keywords: value.keywords.into_iter().map(KeywordBody::from).collect(),
            confidence: value.confidence,
            priority: value.priority.into(),
            emotional_tone: value.emotional_tone.into(),
            urgency_indicators: value.urgency_indicators,
            intent_scores: value.intent_scores,
            reasoning: value.reasoning,
            metrics: MetricsBody {
                processing_time_ms: value.metrics.processing_time_ms,
                model_call_time_ms: value.metrics.model_call_time_ms,
                cache_hit_count: value.metrics.cache_hit_count,
                model_version: value.metrics.model_version,
                cache_hit: value.metrics.cache_hit,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    /// Matches the `correlation_id` on the server's log events for this request.
    pub correlation_id: String,
}
