// Embeddings module
// Capability interface for turning text into fixed-dimension vectors

use crate::{DocQaError, Result};

/// A single embedding vector
pub type Embedding = Vec<f32>;

/// Embedding model behind a narrow batch interface
pub trait Embedder: Send + Sync {
    /// Embed every text, returning one vector per input in the same order
    fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>>;

    /// Embed a single query string
    #[inline]
    fn embed_query(&self, query: &str) -> Result<Embedding> {
        self.embed(&[query.to_string()])?
            .into_iter()
            .next()
            .ok_or_else(|| DocQaError::Embedding("embedder returned no vector for query".to_string()))
    }

    /// Name of the underlying model, for logs and status output
    fn model_name(&self) -> &str;
}
