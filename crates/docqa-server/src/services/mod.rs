pub mod aggregator;
pub mod extractor;
pub mod qa_service;
pub mod session;

pub use aggregator::{AnswerAggregator, FinalAnswer};
pub use extractor::{AnswerExtractor, CandidateAnswer, HttpExtractor};
pub use qa_service::{AskOutcome, IntakeOutcome, QaService};
pub use session::SessionStore;
