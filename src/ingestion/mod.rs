// Ingestion module
// Turns source documents into plain text and fixed-size chunks

pub mod chunking;
pub mod pdf;

pub use chunking::{ChunkingConfig, DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP, split_text};
pub use pdf::{PdfExtractor, TextExtractor, discover_documents};
