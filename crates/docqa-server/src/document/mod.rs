pub mod parser;
pub mod chunker;

pub use parser::{DocumentKind, DocumentParser, ParsedDocument};
pub use chunker::TextChunker;
