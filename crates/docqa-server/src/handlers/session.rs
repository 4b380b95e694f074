use crate::models::qa::HistoryResponse;
use crate::services::QaService;
use crate::utils::error::ApiError;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

pub async fn history_handler(
    State(qa_service): State<Arc<QaService>>,
    Path(session_id): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let history = qa_service.history(&session_id)?;
    Ok(Json(HistoryResponse {
        session_id,
        history,
    }))
}

pub async fn close_session_handler(
    State(qa_service): State<Arc<QaService>>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    qa_service.close_session(&session_id)?;
    Ok(StatusCode::NO_CONTENT)
}
