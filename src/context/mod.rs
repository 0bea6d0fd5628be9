// Application context
// Owns the collaborators and the loaded corpus for the lifetime of a session


use std::path::{Path, PathBuf};

use tracing::info;

use crate::Result;
use crate::config::{Config, DEFAULT_TOP_K};
use crate::embeddings::Embedder;
use crate::generation::Generator;
use crate::index::Corpus;
use crate::ingestion::chunking::ChunkingConfig;
use crate::ingestion::pdf::TextExtractor;
use crate::pipeline::{IndexingPipeline, IndexingReport};
use crate::rag::{self, ScoredChunk};

/// Where documents live and how they are chunked and retrieved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextSettings {
    pub source_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub chunking: ChunkingConfig,
    pub top_k: usize,
    pub show_progress: bool,
}

impl ContextSettings {
    #[inline]
    pub fn new<S: Into<PathBuf>, P: Into<PathBuf>>(source_dir: S, processed_dir: P) -> Self {
        Self {
            source_dir: source_dir.into(),
            processed_dir: processed_dir.into(),
            chunking: ChunkingConfig::default(),
            top_k: DEFAULT_TOP_K,
            show_progress: false,
        }
    }

    #[inline]
    pub fn from_config(config: &Config) -> Self {
        Self {
            source_dir: config.source_dir(),
            processed_dir: config.processed_dir(),
            chunking: config.chunking,
            top_k: config.retrieval.top_k,
            show_progress: false,
        }
    }
}

/// A ready-to-query session: collaborators plus the corpus they were built with.
///
/// Construction runs [`IndexingPipeline::build_or_load`] once. Queries borrow
/// the context immutably; [`AppContext::rebuild`] needs `&mut self`, so a
/// rebuild can never overlap a query.
pub struct AppContext {
    settings: ContextSettings,
    embedder: Box<dyn Embedder>,
    generator: Box<dyn Generator>,
    extractor: Box<dyn TextExtractor>,
    corpus: Corpus,
    report: IndexingReport,
}

impl AppContext {
    /// Load or build the corpus described by `settings`
    ///
    /// # Errors
    ///
    /// Any error from [`IndexingPipeline::build_or_load`].
    #[inline]
    pub fn init(
        settings: ContextSettings,
        embedder: Box<dyn Embedder>,
        generator: Box<dyn Generator>,
        extractor: Box<dyn TextExtractor>,
    ) -> Result<Self> {
        let (corpus, report) = IndexingPipeline::new(embedder.as_ref(), extractor.as_ref())
            .with_progress(settings.show_progress)
            .build_or_load(
                &settings.source_dir,
                &settings.processed_dir,
                &settings.chunking,
            )?;

        info!(
            "Context ready: {} chunks, embedding with {}, generating with {}",
            corpus.len(),
            embedder.model_name(),
            generator.model_name()
        );

        Ok(Self {
            settings,
            embedder,
            generator,
            extractor,
            corpus,
            report,
        })
    }

    /// Answer `question` with the configured number of chunks
    ///
    /// # Errors
    ///
    /// Retrieval and generation errors propagate.
    #[inline]
    pub fn ask(&self, question: &str) -> Result<String> {
        self.ask_with_top_k(question, self.settings.top_k)
    }

    /// # Errors
    ///
    /// Retrieval and generation errors propagate.
    #[inline]
    pub fn ask_with_top_k(&self, question: &str, top_k: usize) -> Result<String> {
        let (index, chunks) = (self.corpus.index(), self.corpus.chunks());
        rag::answer(
            question,
            self.embedder.as_ref(),
            self.generator.as_ref(),
            index,
            chunks,
            top_k,
        )
    }

    /// The `top_k` chunks nearest to `query`, with distances
    ///
    /// # Errors
    ///
    /// Embedding errors and query dimension mismatches propagate.
    #[inline]
    pub fn search(&self, query: &str, top_k: usize) -> Result<Vec<ScoredChunk>> {
        rag::retrieve_with_scores(
            query,
            self.embedder.as_ref(),
            self.corpus.index(),
            self.corpus.chunks(),
            top_k,
        )
    }

    /// Discard the current corpus and rebuild it from the source documents
    ///
    /// # Errors
    ///
    /// Any error from [`IndexingPipeline::rebuild`]; the previous corpus is
    /// kept in that case.
    #[inline]
    pub fn rebuild(&mut self) -> Result<&IndexingReport> {
        let (corpus, report) =
            IndexingPipeline::new(self.embedder.as_ref(), self.extractor.as_ref())
                .with_progress(self.settings.show_progress)
                .rebuild(
                    &self.settings.source_dir,
                    &self.settings.processed_dir,
                    &self.settings.chunking,
                )?;

        self.corpus = corpus;
        self.report = report;
        Ok(&self.report)
    }

    #[inline]
    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// What the most recent load or build did
    #[inline]
    pub fn report(&self) -> &IndexingReport {
        &self.report
    }

    #[inline]
    pub fn settings(&self) -> &ContextSettings {
        &self.settings
    }

    #[inline]
    pub fn processed_dir(&self) -> &Path {
        &self.settings.processed_dir
    }
}
