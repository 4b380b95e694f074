use crate::models::qa::{AskRequest, AskResponse};
use crate::services::QaService;
use crate::utils::error::ApiError;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;
use tracing::info;

pub async fn ask_handler(
    State(qa_service): State<Arc<QaService>>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    info!(
        "Ask request: session={:?}, question_len={}",
        request.session_id,
        request.question.len()
    );

    let outcome = qa_service
        .ask(request.session_id.as_deref(), &request.question)
        .await?;

    Ok(Json(AskResponse {
        answer: outcome.answer,
        history: outcome.history,
    }))
}
