//! Per-session document state and conversation memory
//!
//! Provides:
//! - Opaque session identifiers
//! - Thread-safe session storage (DashMap) with atomic history append
//! - Bounded history with FIFO truncation
//! - Optional idle expiry with a background sweeper

mod identity;
mod store;
pub mod types;

pub use identity::{SessionIdGenerator, UuidSessionIdGenerator};
pub use store::{SessionStore, StoreStats};
pub use types::{QaRecord, Session, SessionId, SessionSnapshot};
