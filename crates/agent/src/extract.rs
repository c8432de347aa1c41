//! Recovery of the structured reply from free-form model output.
//!
//! The payload is located by scanning for the first `{` and the last `}`. This is a
//! heuristic: braces inside surrounding prose (or inside the reasoning text itself when
//! the model emits a trailing comment) will widen the slice and the parse then fails.

use crate::gateway::{GatewayError, ModelReply};
use crate::llm::GenerateContentResponse;

/// Text of the first non-empty part of the first candidate.
pub fn reply_text(response: &GenerateContentResponse) -> Result<&str, GatewayError> {
    let candidate = response.candidates.first().ok_or(GatewayError::NoCandidates)?;
    let parts =
        candidate.content.as_ref().map(|content| content.parts.as_slice()).unwrap_or_default();
    if parts.is_empty() {
        return Err(GatewayError::NoContentParts);
    }

    parts
        .iter()
        .filter_map(|part| part.text.as_deref())
        .find(|text| !text.is_empty())
        .ok_or(GatewayError::EmptyResponseText)
}

/// Substring from the first `{` to the last `}`, inclusive.
pub fn json_payload(raw: &str) -> Result<&str, GatewayError> {
    match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => Ok(&raw[start..=end]),
        _ => Err(GatewayError::NoJsonPayload { raw: raw.to_string() }),
    }
}

pub fn parse_reply(raw: &str) -> Result<ModelReply, GatewayError> {
    let payload = json_payload(raw)?;
    serde_json::from_str::<ModelReply>(payload)
        .map_err(|source| GatewayError::MalformedPayload { payload: payload.to_string(), source })
}
