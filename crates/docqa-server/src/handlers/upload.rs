use crate::models::qa::UploadResponse;
use crate::services::QaService;
use crate::utils::error::ApiError;
use axum::{
    extract::{Multipart, State},
    Json,
};
use std::sync::Arc;
use tracing::info;

pub async fn upload_handler(
    State(qa_service): State<Arc<QaService>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    info!("File upload request received");

    let mut file_data: Option<Vec<u8>> = None;
    let mut filename: Option<String> = None;

    // Parse multipart form
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read field: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        filename = field.file_name().map(|s| s.to_string());
        file_data = Some(
            field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?
                .to_vec(),
        );
    }

    let file_data = file_data.ok_or_else(|| ApiError::BadRequest("file required".to_string()))?;
    let filename = filename.ok_or_else(|| ApiError::BadRequest("filename required".to_string()))?;

    let outcome = qa_service.intake(filename, file_data).await?;

    info!("Document processed into session {}", outcome.session_id);

    Ok(Json(UploadResponse {
        message: "Document uploaded and processed successfully".to_string(),
        session_id: outcome.session_id,
        history: outcome.history,
    }))
}
