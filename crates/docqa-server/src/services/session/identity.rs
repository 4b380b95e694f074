use uuid::Uuid;

use super::types::SessionId;

/// Source of fresh session identifiers
pub trait SessionIdGenerator: Send + Sync {
    fn generate(&self) -> SessionId;
}

/// Random v4 UUIDs, hyphenated
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidSessionIdGenerator;

impl SessionIdGenerator for UuidSessionIdGenerator {
    fn generate(&self) -> SessionId {
        SessionId::new(Uuid::new_v4().to_string())
    }
}
