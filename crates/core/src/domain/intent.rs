use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Intent categories the model is asked to choose from. The set is advisory:
/// `AnalysisResult::intent_type` stays an open string.
pub const INTENT_CATEGORIES: [&str; 6] = [
    "question_how",
    "question_what",
    "request_help",
    "report_issue",
    "ask_status",
    "question_general",
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub text: String,
    pub domain: String,
    pub user_id: String,
    pub session_id: String,
    pub context_messages: Vec<String>,
    pub metadata: BTreeMap<String, String>,
    pub received_at: DateTime<Utc>,
}

impl AnalysisRequest {
    pub fn new(text: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            domain: domain.into(),
            user_id: String::new(),
            session_id: String::new(),
            context_messages: Vec::new(),
            metadata: BTreeMap::new(),
            received_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub text: String,
    pub weight: f64,
    pub category: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 5] =
        [Self::Low, Self::Medium, Self::High, Self::Urgent, Self::Critical];

    /// Short code used in model replies (`P0` is the most severe).
    pub fn code(&self) -> &'static str {
        match self {
            Self::Critical => "P0",
            Self::Urgent => "P1",
            Self::High => "P2",
            Self::Medium => "P3",
            Self::Low => "P4",
        }
    }

    /// Exact match only; anything else (including `p1` or ` P1 `) is `Medium`.
    pub fn from_code(value: &str) -> Self {
        match value {
            "P0" => Self::Critical,
            "P1" => Self::Urgent,
            "P2" => Self::High,
            "P3" => Self::Medium,
            "P4" => Self::Low,
            _ => Self::Medium,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionalTone {
    #[default]
    Neutral,
    Positive,
    Negative,
    Frustrated,
    Urgent,
    Grateful,
}

impl EmotionalTone {
    pub const ALL: [EmotionalTone; 6] = [
        Self::Neutral,
        Self::Positive,
        Self::Negative,
        Self::Frustrated,
        Self::Urgent,
        Self::Grateful,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Frustrated => "frustrated",
            Self::Urgent => "urgent",
            Self::Grateful => "grateful",
        }
    }

    /// Exact match only; unknown, empty or differently cased codes are `Neutral`.
    pub fn from_code(value: &str) -> Self {
        match value {
            "neutral" => Self::Neutral,
            "positive" => Self::Positive,
            "negative" => Self::Negative,
            "frustrated" => Self::Frustrated,
            "urgent" => Self::Urgent,
            "grateful" => Self::Grateful,
            _ => Self::Neutral,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingMetrics {
    pub processing_time_ms: u64,
    pub model_call_time_ms: u64,
    /// Reserved; no cache exists so this is always zero.
    pub cache_hit_count: u64,
    pub model_version: String,
    /// Reserved; always false.
    pub cache_hit: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub intent_type: String,
    pub domain_specific_intent: String,
    pub keywords: Vec<Keyword>,
    pub priority: Priority,
    pub confidence: f64,
    pub emotional_tone: EmotionalTone,
    pub urgency_indicators: Vec<String>,
    pub reasoning: String,
    pub intent_scores: BTreeMap<String, f64>,
    pub metrics: ProcessingMetrics,
}
