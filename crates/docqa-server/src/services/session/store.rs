use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::identity::{SessionIdGenerator, UuidSessionIdGenerator};
use super::types::{QaRecord, Session, SessionId, SessionSnapshot};
use crate::config::SessionConfig;
use crate::utils::error::ApiError;

/// Attempts at drawing an unused id before giving up
const MAX_ID_ATTEMPTS: usize = 8;

/// Process-wide session map.
///
/// Mutations go through DashMap entry guards, so append-and-truncate on one
/// session is atomic while other sessions are served concurrently.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<DashMap<SessionId, Session>>,
    generator: Arc<dyn SessionIdGenerator>,
    history_cap: usize,
    idle_ttl: Option<Duration>,
}

impl SessionStore {
    pub fn new(config: &SessionConfig) -> Self {
        Self::with_generator(config, Arc::new(UuidSessionIdGenerator))
    }

    pub fn with_generator(config: &SessionConfig, generator: Arc<dyn SessionIdGenerator>) -> Self {
        info!(
            "Initializing session store (history_cap={}, idle_ttl={:?})",
            config.history_cap, config.idle_ttl_seconds
        );
        Self {
            sessions: Arc::new(DashMap::new()),
            generator,
            history_cap: config.history_cap.max(1),
            idle_ttl: config.idle_ttl_seconds.map(Duration::from_secs),
        }
    }

    pub fn history_cap(&self) -> usize {
        self.history_cap
    }

    /// Register a document under a fresh identifier with empty history
    pub fn create_session(&self, document_text: impl Into<Arc<str>>) -> Result<SessionId, ApiError> {
        let document_text: Arc<str> = document_text.into();

        for attempt in 1..=MAX_ID_ATTEMPTS {
            let session_id = self.generator.generate();

            match self.sessions.entry(session_id.clone()) {
                Entry::Occupied(_) => {
                    warn!("Generated session id collided (attempt {})", attempt);
                }
                Entry::Vacant(slot) => {
                    slot.insert(Session::new(session_id.clone(), document_text));
                    info!("Created session {}", session_id);
                    return Ok(session_id);
                }
            }
        }

        Err(ApiError::InternalError(
            "Could not allocate a unique session id".to_string(),
        ))
    }

    pub fn get_session(&self, session_id: &str) -> Result<SessionSnapshot, ApiError> {
        let mut entry = self
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| not_found(session_id))?;

        if entry.is_expired(self.idle_ttl) {
            drop(entry); // Release write lock before removing
            self.evict_if_expired(session_id);
            return Err(not_found(session_id));
        }

        entry.touch();
        Ok(entry.snapshot())
    }

    /// Append one record and return the (possibly truncated) history.
    /// The shard lock is held for the whole append-and-truncate.
    pub fn append_history(
        &self,
        session_id: &str,
        question: impl Into<String>,
        answer: impl Into<String>,
        timestamp: chrono::DateTime<chrono::Utc>,
    ) -> Result<Vec<QaRecord>, ApiError> {
        let mut entry = self
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| not_found(session_id))?;

        if entry.is_expired(self.idle_ttl) {
            drop(entry);
            self.evict_if_expired(session_id);
            return Err(not_found(session_id));
        }

        entry.push_record(QaRecord::new(question, answer, timestamp), self.history_cap);
        entry.touch();

        debug!(
            "Session {} history now {} records",
            session_id,
            entry.history.len()
        );
        Ok(entry.history.clone())
    }

    pub fn history(&self, session_id: &str) -> Result<Vec<QaRecord>, ApiError> {
        self.get_session(session_id).map(|snapshot| snapshot.history)
    }

    pub fn close_session(&self, session_id: &str) -> Result<(), ApiError> {
        self.sessions
            .remove(session_id)
            .map(|_| info!("Closed session {}", session_id))
            .ok_or_else(|| not_found(session_id))
    }

    /// Remove idle sessions, returns how many were dropped
    pub fn cleanup_expired(&self) -> usize {
        let Some(ttl) = self.idle_ttl else {
            return 0;
        };

        let start_len = self.sessions.len();
        self.sessions.retain(|_, session| !session.is_expired(Some(ttl)));
        let count = start_len.saturating_sub(self.sessions.len());

        if count > 0 {
            info!("Cleaned up {} expired sessions", count);
        }

        count
    }

    /// Periodic cleanup task, only started when an idle TTL is configured
    pub fn spawn_sweeper(&self, interval: Duration) -> Option<JoinHandle<()>> {
        self.idle_ttl?;

        let store = self.clone();
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // First tick fires immediately
            loop {
                ticker.tick().await;
                store.cleanup_expired();
            }
        }))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            active_sessions: self.sessions.len(),
            history_records: self.sessions.iter().map(|s| s.history.len()).sum(),
        }
    }

    fn evict_if_expired(&self, session_id: &str) {
        let ttl = self.idle_ttl;
        if self
            .sessions
            .remove_if(session_id, |_, session| session.is_expired(ttl))
            .is_some()
        {
            debug!("Session {} expired, removed from store", session_id);
        }
    }
}

fn not_found(session_id: &str) -> ApiError {
    debug!("Session lookup missed: {}", session_id);
    ApiError::SessionNotFound("Invalid or missing session ID".to_string())
}

/// Store statistics for monitoring
#[derive(Debug, Clone, serde::Serialize)]
pub struct StoreStats {
    pub active_sessions: usize,
    pub history_records: usize,
}
