#![expect(
    clippy::tests_outside_test_module,
    reason = "integration tests are only compiled in test mode"
)]

// End-to-end indexing and answering with in-process collaborators

mod common;

use std::fs;
use std::sync::atomic::Ordering;

use tempfile::TempDir;

use common::{EchoContextGenerator, LetterEmbedder, PlainTextExtractor, write_documents};
use doc_qa::DocQaError;
use doc_qa::config::Config;
use doc_qa::context::{AppContext, ContextSettings};
use doc_qa::index::storage;
use doc_qa::ingestion::ChunkingConfig;
use doc_qa::pipeline::IndexingPipeline;
use doc_qa::rag;

fn settings_for(config: &Config) -> ContextSettings {
    ContextSettings::from_config(config)
}

fn open(settings: ContextSettings) -> doc_qa::Result<AppContext> {
    AppContext::init(
        settings,
        Box::new(LetterEmbedder::default()),
        Box::new(EchoContextGenerator::default()),
        Box::new(PlainTextExtractor),
    )
}

#[test]
fn answers_from_the_nearest_document() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let mut config = Config::with_base_dir(temp_dir.path());
    config.retrieval.top_k = 1;
    write_documents(
        &config.source_dir(),
        &[
            ("cats.pdf", "The cat sat on the mat."),
            ("dogs.PDF", "Dogs bark loudly at night."),
            ("notes.txt", "Not a document."),
        ],
    );

    let context = open(settings_for(&config)).expect("context should initialize");

    assert_eq!(context.report().documents_found, 2);
    assert_eq!(
        context.ask("the cat sat on a mat").expect("ask should succeed"),
        "The cat sat on the mat."
    );
    assert!(storage::artifacts_exist(&config.processed_dir()));
}

#[test]
fn persisted_index_is_reused_across_sessions() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config = Config::with_base_dir(temp_dir.path());
    let long_text = "The cat sat on the mat. ".repeat(60);
    write_documents(&config.source_dir(), &[("cats.pdf", long_text.as_str())]);

    let first = open(settings_for(&config)).expect("first session should build");
    assert!(!first.report().loaded_from_cache);
    assert!(first.corpus().len() > 1);

    let embedder = LetterEmbedder::default();
    let (corpus, report) = IndexingPipeline::new(&embedder, &PlainTextExtractor)
        .build_or_load(
            &config.source_dir(),
            &config.processed_dir(),
            &config.chunking,
        )
        .expect("second session should load");

    assert!(report.loaded_from_cache);
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    assert_eq!(corpus.chunks(), first.corpus().chunks());
}

#[test]
fn unreadable_documents_are_reported_not_fatal() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config = Config::with_base_dir(temp_dir.path());
    write_documents(
        &config.source_dir(),
        &[
            ("a.pdf", "%PDF-1.7 binary"),
            ("b.pdf", "Readable text about rivers."),
        ],
    );

    let context = open(settings_for(&config)).expect("context should initialize");
    let report = context.report();

    assert_eq!(report.documents_found, 2);
    assert_eq!(report.documents_indexed, 1);
    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].path.ends_with("a.pdf"));
    assert_eq!(context.corpus().chunks(), ["Readable text about rivers."]);
}

#[test]
fn missing_source_directory_writes_nothing() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config = Config::with_base_dir(temp_dir.path());

    let result = open(settings_for(&config));

    assert!(matches!(result, Err(DocQaError::EmptyCorpus(_))));
    assert!(!config.processed_dir().exists());
}

#[test]
fn damaged_index_file_is_rebuilt_on_next_session() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config = Config::with_base_dir(temp_dir.path());
    write_documents(&config.source_dir(), &[("a.pdf", "Readable text.")]);

    open(settings_for(&config)).expect("first session should build");
    let index_path = storage::index_path(&config.processed_dir());
    let bytes = fs::read(&index_path).expect("index should exist");
    fs::write(&index_path, &bytes[..bytes.len() / 2]).expect("should truncate index");

    assert!(matches!(
        storage::load(&config.processed_dir()),
        Err(DocQaError::CorruptIndex(_))
    ));

    let context = open(settings_for(&config)).expect("second session should rebuild");
    assert!(!context.report().loaded_from_cache);
    assert!(storage::load(&config.processed_dir()).is_ok());
}

#[test]
fn chunking_settings_shape_the_corpus() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let mut config = Config::with_base_dir(temp_dir.path());
    config.chunking = ChunkingConfig {
        chunk_size: 10,
        overlap: 2,
    };
    write_documents(&config.source_dir(), &[("a.pdf", "abcdefghijklmnopqrst")]);

    let context = open(settings_for(&config)).expect("context should initialize");

    assert_eq!(
        context.corpus().chunks(),
        ["abcdefghij", "ijklmnopqr", "qrst"]
    );
}

#[test]
fn prompt_carries_every_retrieved_chunk() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config = Config::with_base_dir(temp_dir.path());
    write_documents(
        &config.source_dir(),
        &[("a.pdf", "alpha"), ("b.pdf", "beta"), ("c.pdf", "gamma")],
    );

    let settings = settings_for(&config);
    let embedder = LetterEmbedder::default();
    let generator = EchoContextGenerator::default();
    let (corpus, _) = IndexingPipeline::new(&embedder, &PlainTextExtractor)
        .build_or_load(&settings.source_dir, &settings.processed_dir, &settings.chunking)
        .expect("build should succeed");

    let answer = rag::answer(
        "alpha",
        &embedder,
        &generator,
        corpus.index(),
        corpus.chunks(),
        rag::DEFAULT_TOP_K,
    )
    .expect("answer should succeed");

    assert_eq!(answer, "alpha");
    let prompts = generator.prompts.lock().expect("prompt log poisoned");
    assert_eq!(prompts.len(), 1);
    for chunk in ["alpha", "beta", "gamma"] {
        assert!(prompts[0].contains(chunk));
    }
    assert!(prompts[0].starts_with(&format!("\n{}", rag::SYSTEM_PROMPT)));
}
