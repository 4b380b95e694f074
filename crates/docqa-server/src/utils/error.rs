use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Extraction failure: {0}")]
    ExtractionFailure(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("No document uploaded for this session")]
    EmptyDocument,

    #[error("Question cannot be empty")]
    EmptyQuestion,

    #[error("Collaborator failure: {0}")]
    CollaboratorFailure(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApiError {
    /// Machine-checkable category sent to clients
    pub fn category(&self) -> &'static str {
        match self {
            ApiError::UnsupportedFormat(_) => "UnsupportedFormat",
            ApiError::ExtractionFailure(_) => "ExtractionFailure",
            ApiError::SessionNotFound(_) => "SessionNotFound",
            ApiError::EmptyDocument => "EmptyDocument",
            ApiError::EmptyQuestion => "EmptyQuestion",
            ApiError::CollaboratorFailure(_) => "CollaboratorFailure",
            ApiError::BadRequest(_) => "BadRequest",
            ApiError::InternalError(_) => "InternalError",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::UnsupportedFormat(_)
            | ApiError::EmptyDocument
            | ApiError::EmptyQuestion
            | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ExtractionFailure(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::CollaboratorFailure(_) => StatusCode::BAD_GATEWAY,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_type = self.category();

        if status.is_server_error() {
            tracing::error!(category = error_type, "{}", self);
        } else {
            tracing::warn!(category = error_type, "{}", self);
        }

        let message = match &self {
            ApiError::EmptyDocument | ApiError::EmptyQuestion => self.to_string(),
            ApiError::UnsupportedFormat(msg)
            | ApiError::ExtractionFailure(msg)
            | ApiError::SessionNotFound(msg)
            | ApiError::CollaboratorFailure(msg)
            | ApiError::BadRequest(msg)
            | ApiError::InternalError(msg) => msg.clone(),
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
        });

        (status, body).into_response()
    }
}
