// Indexing pipeline
// Loads a persisted index or builds one from the source documents


use std::path::{Path, PathBuf};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::embeddings::Embedder;
use crate::index::{Corpus, VectorIndex, storage};
use crate::ingestion::chunking::{ChunkingConfig, split_text};
use crate::ingestion::pdf::{TextExtractor, discover_documents};
use crate::{DocQaError, Result};

/// A source document left out of the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDocument {
    pub path: PathBuf,
    pub reason: String,
}

/// Summary of a `build_or_load` call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexingReport {
    /// The corpus came from persisted artifacts
    pub loaded_from_cache: bool,
    pub documents_found: usize,
    pub documents_indexed: usize,
    pub skipped: Vec<SkippedDocument>,
    pub chunks: usize,
    pub dimension: usize,
}

/// Orchestrates extraction, chunking, embedding and persistence
pub struct IndexingPipeline<'a> {
    embedder: &'a dyn Embedder,
    extractor: &'a dyn TextExtractor,
    show_progress: bool,
}

impl<'a> IndexingPipeline<'a> {
    #[inline]
    pub fn new(embedder: &'a dyn Embedder, extractor: &'a dyn TextExtractor) -> Self {
        Self {
            embedder,
            extractor,
            show_progress: false,
        }
    }

    /// Show a terminal spinner while embedding
    #[inline]
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Load the index persisted in `processed_dir`, or build and persist a new
    /// one from the documents in `source_dir`.
    ///
    /// An unreadable persisted index is rebuilt. Documents that fail
    /// extraction are skipped and listed in the report.
    ///
    /// # Errors
    ///
    /// [`DocQaError::EmptyCorpus`] when no chunks could be produced, in which
    /// case nothing is written. Chunking, embedding and IO errors propagate.
    #[inline]
    pub fn build_or_load(
        &self,
        source_dir: &Path,
        processed_dir: &Path,
        chunking: &ChunkingConfig,
    ) -> Result<(Corpus, IndexingReport)> {
        if storage::artifacts_exist(processed_dir) {
            match storage::load(processed_dir).and_then(|(index, texts)| Corpus::new(index, texts)) {
                Ok(corpus) => {
                    info!(
                        "Loaded persisted index with {} chunks from {}",
                        corpus.len(),
                        processed_dir.display()
                    );
                    let report = IndexingReport {
                        loaded_from_cache: true,
                        chunks: corpus.len(),
                        dimension: corpus.index().dimension(),
                        ..IndexingReport::default()
                    };
                    return Ok((corpus, report));
                }
                Err(DocQaError::CorruptIndex(reason)) => {
                    warn!(
                        "Persisted index in {} is unusable ({}), rebuilding",
                        processed_dir.display(),
                        reason
                    );
                }
                Err(e) => return Err(e),
            }
        } else {
            debug!(
                "No persisted index in {}, building from {}",
                processed_dir.display(),
                source_dir.display()
            );
        }

        self.rebuild(source_dir, processed_dir, chunking)
    }

    /// Build from the source documents and overwrite any persisted index
    #[inline]
    pub fn rebuild(
        &self,
        source_dir: &Path,
        processed_dir: &Path,
        chunking: &ChunkingConfig,
    ) -> Result<(Corpus, IndexingReport)> {
        chunking.validate()?;

        let documents = discover_documents(source_dir, self.extractor)?;
        let mut report = IndexingReport {
            documents_found: documents.len(),
            ..IndexingReport::default()
        };

        let mut chunks = Vec::new();
        for path in documents {
            let text = match self.extractor.extract_text(&path) {
                Ok(text) => text,
                Err(e @ DocQaError::Extraction { .. }) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    report.skipped.push(SkippedDocument {
                        reason: e.to_string(),
                        path,
                    });
                    continue;
                }
                Err(e) => return Err(e),
            };

            let document_chunks = split_text(&text, chunking.chunk_size, chunking.overlap)?;
            debug!(
                "{} produced {} chunks",
                path.display(),
                document_chunks.len()
            );
            report.documents_indexed += 1;
            chunks.extend(document_chunks);
        }

        if chunks.is_empty() {
            return Err(DocQaError::EmptyCorpus(format!(
                "no text could be extracted from documents in {} ({} found, {} skipped)",
                source_dir.display(),
                report.documents_found,
                report.skipped.len()
            )));
        }

        info!(
            "Embedding {} chunks from {} documents with {}",
            chunks.len(),
            report.documents_indexed,
            self.embedder.model_name()
        );
        let embeddings = self.embed_with_progress(&chunks)?;

        if embeddings.len() != chunks.len() {
            return Err(DocQaError::Embedding(format!(
                "embedder returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let index = VectorIndex::build(&embeddings)?;
        storage::save(&index, &chunks, processed_dir)?;

        report.chunks = chunks.len();
        report.dimension = index.dimension();

        let corpus = Corpus::new(index, chunks)?;
        info!(
            "Indexed {} chunks (dimension {}) into {}",
            report.chunks,
            report.dimension,
            processed_dir.display()
        );
        Ok((corpus, report))
    }

    fn embed_with_progress(&self, chunks: &[String]) -> Result<Vec<Vec<f32>>> {
        if !self.show_progress {
            return self.embedder.embed(chunks);
        }

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(format!("Embedding {} chunks", chunks.len()));
        spinner.enable_steady_tick(Duration::from_millis(120));

        let result = self.embedder.embed(chunks);
        spinner.finish_and_clear();
        result
    }
}
