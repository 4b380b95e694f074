use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::document::{DocumentParser, TextChunker};
use crate::services::aggregator::AnswerAggregator;
use crate::services::extractor::AnswerExtractor;
use crate::services::session::{QaRecord, SessionId, SessionStore};
use crate::utils::error::ApiError;

#[derive(Debug, Clone, Serialize)]
pub struct IntakeOutcome {
    pub session_id: SessionId,
    pub history: Vec<QaRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AskOutcome {
    pub answer: String,
    pub history: Vec<QaRecord>,
}

/// Document intake and question answering over per-session documents
pub struct QaService {
    store: SessionStore,
    extractor: Arc<dyn AnswerExtractor>,
    aggregator: AnswerAggregator,
    chunker: TextChunker,
}

impl QaService {
    pub fn new(
        store: SessionStore,
        extractor: Arc<dyn AnswerExtractor>,
        aggregator: AnswerAggregator,
        chunker: TextChunker,
    ) -> Self {
        Self {
            store,
            extractor,
            aggregator,
            chunker,
        }
    }

    pub fn from_settings(settings: &Settings, extractor: Arc<dyn AnswerExtractor>) -> Self {
        Self::new(
            SessionStore::new(&settings.session),
            extractor,
            AnswerAggregator::from_config(&settings.answering),
            TextChunker::new(settings.windowing.max_length),
        )
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Parse an uploaded artifact and open a session over its text
    pub async fn intake(&self, filename: String, data: Vec<u8>) -> Result<IntakeOutcome, ApiError> {
        info!("Processing upload: {} ({} bytes)", filename, data.len());

        let parsed = tokio::task::spawn_blocking(move || DocumentParser::parse(&filename, &data))
            .await
            .map_err(|e| ApiError::ExtractionFailure(format!("Document parser crashed: {}", e)))??;

        debug!(
            "Extracted {} characters ({:?} pages, {})",
            parsed.metadata.char_count, parsed.metadata.pages, parsed.metadata.file_type
        );

        self.intake_text(parsed.content)
    }

    /// Open a session over already-extracted text
    pub fn intake_text(&self, document_text: String) -> Result<IntakeOutcome, ApiError> {
        if document_text.trim().is_empty() {
            warn!("Document contains no text; questions on this session will be rejected");
        }

        let session_id = self.store.create_session(document_text)?;

        Ok(IntakeOutcome {
            session_id,
            history: Vec::new(),
        })
    }

    pub async fn ask(&self, session_id: Option<&str>, question: &str) -> Result<AskOutcome, ApiError> {
        let start_time = Instant::now();

        let session_id = session_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ApiError::SessionNotFound("Invalid or missing session ID".to_string()))?;

        let session = self.store.get_session(session_id)?;

        // Held until the record is appended; waiters are woken in FIFO order
        let _turn = session.turn.lock().await;

        if session.document_text.trim().is_empty() {
            return Err(ApiError::EmptyDocument);
        }
        if question.trim().is_empty() {
            return Err(ApiError::EmptyQuestion);
        }

        // Windows are rebuilt per question, never cached
        let windows = self.chunker.chunk(&session.document_text);
        debug!(
            "Session {}: {} windows (max_length={})",
            session_id,
            windows.len(),
            self.chunker.max_length()
        );

        let best = self
            .aggregator
            .best_answer(question, &windows, self.extractor.as_ref())
            .await?;

        let history = self
            .store
            .append_history(session_id, question, best.answer.clone(), Utc::now())?;

        info!(
            "Session {}: answered in {:?} (score={:.4}, relevant={}, windows={})",
            session_id,
            start_time.elapsed(),
            best.score,
            best.relevant,
            windows.len()
        );

        Ok(AskOutcome {
            answer: best.answer,
            history,
        })
    }

    pub fn history(&self, session_id: &str) -> Result<Vec<QaRecord>, ApiError> {
        self.store.history(session_id)
    }

    pub fn close_session(&self, session_id: &str) -> Result<(), ApiError> {
        self.store.close_session(session_id)
    }
}
