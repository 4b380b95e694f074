use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Opaque session token. Compared and hashed as a string, never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for SessionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One answered question. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaRecord {
    pub question: String,
    pub answer: String,
    pub timestamp: DateTime<Utc>,
}

impl QaRecord {
    pub fn new(question: impl Into<String>, answer: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            timestamp,
        }
    }
}

/// Complete session state held by the store
#[derive(Debug, Clone)]
pub struct Session {
    pub session_id: SessionId,

    /// Extracted document text, fixed at upload time
    pub document_text: Arc<str>,

    /// Chronological, capped at the configured history length
    pub history: Vec<QaRecord>,

    /// Serializes question turns so history follows arrival order
    pub turn: Arc<Mutex<()>>,

    pub created_at: Instant,

    /// Refreshed on every lookup and append, drives idle expiry
    pub last_activity: Instant,
}

impl Session {
    pub fn new(session_id: SessionId, document_text: impl Into<Arc<str>>) -> Self {
        let now = Instant::now();
        Self {
            session_id,
            document_text: document_text.into(),
            history: Vec::new(),
            turn: Arc::new(Mutex::new(())),
            created_at: now,
            last_activity: now,
        }
    }

    pub fn is_expired(&self, idle_ttl: Option<Duration>) -> bool {
        match idle_ttl {
            Some(ttl) => self.last_activity.elapsed() > ttl,
            None => false,
        }
    }

    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Append and drop the oldest records beyond `cap`
    pub fn push_record(&mut self, record: QaRecord, cap: usize) {
        self.history.push(record);
        if self.history.len() > cap {
            let excess = self.history.len() - cap;
            self.history.drain(..excess);
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id.clone(),
            document_text: self.document_text.clone(),
            history: self.history.clone(),
            turn: self.turn.clone(),
        }
    }
}

/// Point-in-time copy handed out to callers; the document text is shared
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub document_text: Arc<str>,
    pub history: Vec<QaRecord>,
    pub turn: Arc<Mutex<()>>,
}
