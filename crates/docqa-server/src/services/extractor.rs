use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::ExtractorConfig;
use crate::utils::limiters::Limiters;

/// A span the model believes answers the question, with its confidence.
/// Scores are only comparable within one question's scan over one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateAnswer {
    pub answer: String,
    pub score: f64,
}

impl CandidateAnswer {
    pub fn new(answer: impl Into<String>, score: f64) -> Self {
        Self {
            answer: answer.into(),
            score,
        }
    }

    pub fn empty() -> Self {
        Self::new(String::new(), 0.0)
    }
}

/// Extractive question-answering model
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AnswerExtractor: Send + Sync {
    async fn extract(&self, question: &str, context: &str) -> Result<CandidateAnswer>;
}

#[derive(Debug, Serialize)]
struct ExtractionRequest<'a> {
    question: &'a str,
    context: &'a str,
}

/// Client for an extractive QA inference server.
///
/// Sends `{"question", "context"}` and expects `{"answer", "score"}` back.
#[derive(Clone)]
pub struct HttpExtractor {
    client: Client,
    url: String,
    limiters: Limiters,
}

impl HttpExtractor {
    pub fn new(config: &ExtractorConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: format!(
                "{}{}",
                config.base_url.trim_end_matches('/'),
                config.endpoint
            ),
            limiters: Limiters::new(config),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl AnswerExtractor for HttpExtractor {
    async fn extract(&self, question: &str, context: &str) -> Result<CandidateAnswer> {
        let (_permit, waited) = Limiters::acquire_timed(
            self.limiters.extraction.clone(),
            self.limiters.acquire_timeout,
            "extract",
        )
        .await?;

        debug!(
            "Extracting answer from {} chars (waited {:?} for permit)",
            context.chars().count(),
            waited
        );

        let response = self
            .client
            .post(&self.url)
            .json(&ExtractionRequest { question, context })
            .send()
            .await
            .context("Failed to connect to extraction server")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Extraction API error ({}): {}", status, body);
        }

        let candidate: CandidateAnswer = response
            .json()
            .await
            .context("Failed to parse extraction response as JSON")?;

        Ok(candidate)
    }
}
