use serde::{Deserialize, Serialize};

use crate::services::session::{QaRecord, SessionId};

// ===== REQUEST MODELS =====

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

// ===== RESPONSE MODELS =====

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub session_id: SessionId,
    pub history: Vec<QaRecord>,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
    pub history: Vec<QaRecord>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub session_id: String,
    pub history: Vec<QaRecord>,
}
