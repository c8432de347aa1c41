use intent_core::AnalysisRequest;

const INSTRUCTIONS: &str = r#"Respond with exactly one JSON object in the following format:
{
  "intent_type": "question_how|question_what|request_help|report_issue|ask_status|question_general",
  "domain_specific_intent": "the concrete intent within this domain",
  "keywords": [
    {"text": "keyword", "weight": 0.9, "category": "technical|action|domain"}
  ],
  "priority": "P0|P1|P2|P3|P4",
  "confidence": 0.85,
  "emotional_tone": "neutral|positive|negative|frustrated|urgent|grateful",
  "urgency_indicators": ["asap", "urgent"],
  "reasoning": "why this interpretation was chosen",
  "intent_scores": {
    "question_how": 0.85,
    "question_what": 0.1,
    "request_help": 0.05
  }
}

Guidelines:
- intent_type: the primary intent (how-to question, what question, help request, issue report, status inquiry, general question)
- priority: P0 (critical), P1 (urgent), P2 (high), P3 (medium), P4 (low)
- emotional_tone: the emotional state of the user
- keywords: the important keywords, each with a weight between 0.0 and 1.0
- confidence: confidence in the analysis, between 0.0 and 1.0
- intent_scores: a score between 0.0 and 1.0 for each candidate intent_type"#;

/// Builds the analysis prompt. Only the message text, the domain and the prior
/// context vary; everything else is a fixed template.
pub fn build_prompt(request: &AnalysisRequest) -> String {
    let context = if request.context_messages.is_empty() {
        String::new()
    } else {
        format!("\n\nPrevious conversation:\n{}", request.context_messages.join("\n"))
    };

    format!(
        "Analyze the user's message and identify its intent, priority, emotional tone and keywords.\n\n\
         Message: \"{text}\"\n\
         Domain: {domain}{context}\n\n\
         {INSTRUCTIONS}",
        text = request.text,
        domain = request.domain,
    )
}
