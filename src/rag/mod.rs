// Retrieval-augmented answering
// Query embedding, nearest-chunk lookup and grounded generation

pub mod prompt;


use tracing::{debug, info};

pub use crate::config::DEFAULT_TOP_K;
use crate::embeddings::Embedder;
use crate::generation::Generator;
use crate::index::VectorIndex;
use crate::Result;

pub use prompt::{SYSTEM_PROMPT, build_prompt, join_context};

/// A retrieved chunk and its squared L2 distance to the query
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub text: String,
    pub distance: f32,
}

/// Retrieve the `k` chunk texts closest to `query`, nearest first.
///
/// # Errors
///
/// Embedding failures propagate, and a query vector whose dimension differs
/// from the index is [`crate::DocQaError::DimensionMismatch`].
///
/// # Panics
///
/// If the index holds a position with no entry in `chunk_texts`. Pair them
/// through [`crate::index::Corpus`] to rule this out.
#[inline]
pub fn retrieve(
    query: &str,
    embedder: &dyn Embedder,
    index: &VectorIndex,
    chunk_texts: &[String],
    k: usize,
) -> Result<Vec<String>> {
    Ok(retrieve_with_scores(query, embedder, index, chunk_texts, k)?
        .into_iter()
        .map(|chunk| chunk.text)
        .collect())
}

/// Like [`retrieve`], keeping each chunk's distance
///
/// # Errors
///
/// Same as [`retrieve`].
///
/// # Panics
///
/// Same as [`retrieve`].
#[inline]
pub fn retrieve_with_scores(
    query: &str,
    embedder: &dyn Embedder,
    index: &VectorIndex,
    chunk_texts: &[String],
    k: usize,
) -> Result<Vec<ScoredChunk>> {
    debug!("Embedding query with {}", embedder.model_name());
    let query_vector = embedder.embed_query(query)?;

    let hits = index.search(&query_vector, k)?;
    debug!("Retrieved {} of {} requested chunks", hits.len(), k);

    Ok(hits
        .into_iter()
        .map(|hit| {
            let text = chunk_texts.get(hit.position).unwrap_or_else(|| {
                panic!(
                    "index position {} has no chunk text ({} texts)",
                    hit.position,
                    chunk_texts.len()
                )
            });
            ScoredChunk {
                text: text.clone(),
                distance: hit.distance,
            }
        })
        .collect())
}

/// Answer `query` from the `k` nearest chunks with a single generator call.
///
/// The generator output is returned unmodified.
///
/// # Errors
///
/// Retrieval and generation errors propagate; nothing is retried.
///
/// # Panics
///
/// Same as [`retrieve`].
#[inline]
pub fn answer(
    query: &str,
    embedder: &dyn Embedder,
    generator: &dyn Generator,
    index: &VectorIndex,
    chunk_texts: &[String],
    k: usize,
) -> Result<String> {
    let chunks = retrieve(query, embedder, index, chunk_texts, k)?;
    let context = join_context(&chunks);
    let prompt = build_prompt(&context, query);

    info!(
        "Generating answer with {} from {} chunks",
        generator.model_name(),
        chunks.len()
    );
    generator.generate(&prompt)
}
