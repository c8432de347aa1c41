use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use intent_core::{ApplicationError, InterfaceError, ValidationError};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::routes::AppState;
use crate::transport::{AnalyzeIntentRequest, AnalyzeIntentResponse, ErrorBody};

/// Maps an `InterfaceError` onto a status code and the `{code, message, correlation_id}` body.
#[derive(Debug)]
pub struct ApiError(pub InterfaceError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            InterfaceError::InvalidArgument { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            code: self.0.code().to_string(),
            message: self.0.user_message(),
            correlation_id: self.0.correlation_id().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub async fn analyze_intent(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeIntentRequest>,
) -> Result<Json<AnalyzeIntentResponse>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let span = info_span!("analyze_intent", correlation_id = %correlation_id);

    async move {
        if body.text.is_empty() {
            let error = ApplicationError::from(ValidationError::MissingField { field: "text" })
                .into_interface(correlation_id.as_str());
            warn!(
                event_name = "transport.analyze.invalid_argument",
                correlation_id = %correlation_id,
                error = %error,
                "rejecting analysis request"
            );
            return Err(ApiError(error));
        }

        info!(
            event_name = "transport.analyze.received",
            correlation_id = %correlation_id,
            domain = %body.domain,
            user_id = %body.user_id,
            text_chars = body.text.chars().count(),
            "received intent analysis request"
        );

        let request = body.into_domain();
        let result = state.service.analyze(&request).await.map_err(|source| {
            error!(
                event_name = "transport.analyze.failed",
                correlation_id = %correlation_id,
                parse_failure = source.is_parse_failure(),
                error = %source,
                "intent analysis failed"
            );
            ApiError(
                ApplicationError::Gateway(source.to_string())
                    .into_interface(correlation_id.as_str()),
            )
        })?;

        info!(
            event_name = "transport.analyze.completed",
            correlation_id = %correlation_id,
            intent = %result.intent_type,
            confidence = result.confidence,
            priority = result.priority.code(),
            "intent analysis request completed"
        );

        Ok(Json(AnalyzeIntentResponse::from(result)))
    }
    .instrument(span)
    .await
}
