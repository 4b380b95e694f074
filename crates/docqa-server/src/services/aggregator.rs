use serde::Serialize;
use tracing::{debug, error};

use super::extractor::{AnswerExtractor, CandidateAnswer};
use crate::config::AnsweringConfig;
use crate::utils::error::ApiError;

/// Outcome of scanning every window of a document for one question
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalAnswer {
    /// Candidate text, or the no-answer sentinel when below threshold
    pub answer: String,
    pub score: f64,
    /// Window that produced the best candidate, if any beat zero
    pub window_index: Option<usize>,
    pub relevant: bool,
}

/// Keeps the highest-confidence candidate across windows and hides it
/// behind a sentinel when it falls below the relevance threshold.
#[derive(Debug, Clone)]
pub struct AnswerAggregator {
    relevance_threshold: f64,
    no_answer_message: String,
}

impl AnswerAggregator {
    pub fn new(relevance_threshold: f64, no_answer_message: impl Into<String>) -> Self {
        Self {
            relevance_threshold,
            no_answer_message: no_answer_message.into(),
        }
    }

    pub fn from_config(config: &AnsweringConfig) -> Self {
        Self::new(config.relevance_threshold, config.no_answer_message.clone())
    }

    pub fn no_answer_message(&self) -> &str {
        &self.no_answer_message
    }

    /// Ask the extractor once per window, in order. Ties keep the earlier
    /// window. Any extractor failure aborts the whole scan.
    pub async fn best_answer(
        &self,
        question: &str,
        windows: &[String],
        extractor: &dyn AnswerExtractor,
    ) -> Result<FinalAnswer, ApiError> {
        let mut best = CandidateAnswer::empty();
        let mut best_index = None;

        for (index, window) in windows.iter().enumerate() {
            let candidate = extractor.extract(question, window).await.map_err(|e| {
                error!("Extractor failed on window {}/{}: {:#}", index + 1, windows.len(), e);
                ApiError::CollaboratorFailure("Error processing question".to_string())
            })?;

            debug!(
                "Window {}/{} scored {:.4}",
                index + 1,
                windows.len(),
                candidate.score
            );

            // NaN never compares greater, so it can't displace a real score
            if candidate.score.is_finite() && candidate.score > best.score {
                best = candidate;
                best_index = Some(index);
            }
        }

        if best.score < self.relevance_threshold {
            debug!(
                "Best score {:.4} below threshold {:.4}",
                best.score, self.relevance_threshold
            );
            return Ok(FinalAnswer {
                answer: self.no_answer_message.clone(),
                score: best.score,
                window_index: best_index,
                relevant: false,
            });
        }

        Ok(FinalAnswer {
            answer: best.answer,
            score: best.score,
            window_index: best_index,
            relevant: true,
        })
    }
}

impl Default for AnswerAggregator {
    fn default() -> Self {
        Self::from_config(&AnsweringConfig::default())
    }
}
