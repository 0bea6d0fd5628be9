use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use console::style;
use dialoguer::Input;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{info, warn};

use crate::config::Config;
use crate::context::{AppContext, ContextSettings};
use crate::index::storage;
use crate::ingestion::pdf::PdfExtractor;
use crate::ollama::OllamaClient;
use crate::pipeline::{IndexingPipeline, IndexingReport};

const BLANK_QUESTION_WARNING: &str = "Enter a question";

fn load_config(config_dir: &Path) -> Result<Config> {
    Config::load(config_dir).context("Failed to load configuration")
}

fn open_context(config: &Config) -> Result<AppContext> {
    let client = OllamaClient::new(&config.ollama).context("Failed to create Ollama client")?;
    let mut settings = ContextSettings::from_config(config);
    settings.show_progress = true;

    AppContext::init(
        settings,
        Box::new(client.clone()),
        Box::new(client),
        Box::new(PdfExtractor),
    )
    .context("Failed to prepare the document index")
}

/// Build the index from the source documents, or load the persisted one
#[inline]
pub fn index_documents(
    config_dir: &Path,
    rebuild: bool,
    source: Option<PathBuf>,
    processed: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config_dir)?;
    let source_dir = source.unwrap_or_else(|| config.source_dir());
    let processed_dir = processed.unwrap_or_else(|| config.processed_dir());

    let client = OllamaClient::new(&config.ollama).context("Failed to create Ollama client")?;
    let pipeline = IndexingPipeline::new(&client, &PdfExtractor).with_progress(true);

    info!(
        "Indexing documents from {} into {}",
        source_dir.display(),
        processed_dir.display()
    );

    let (_, report) = if rebuild {
        pipeline.rebuild(&source_dir, &processed_dir, &config.chunking)
    } else {
        pipeline.build_or_load(&source_dir, &processed_dir, &config.chunking)
    }
    .context("Indexing failed")?;

    print_report(&report, &processed_dir);
    Ok(())
}

fn print_report(report: &IndexingReport, processed_dir: &Path) {
    if report.loaded_from_cache {
        println!(
            "{} Loaded existing index from {}",
            style("✓").green(),
            processed_dir.display()
        );
        println!("  Chunks: {}", report.chunks);
        println!("  Dimension: {}", report.dimension);
        println!("  Use --rebuild to re-index the source documents.");
        return;
    }

    println!(
        "{} Indexed {} of {} documents",
        style("✓").green(),
        report.documents_indexed,
        report.documents_found
    );
    println!("  Chunks: {}", report.chunks);
    println!("  Dimension: {}", report.dimension);
    println!("  Saved to: {}", processed_dir.display());

    if !report.skipped.is_empty() {
        println!();
        println!("{}", style("Skipped documents:").yellow());
        for skipped in &report.skipped {
            println!("  {} ({})", skipped.path.display(), skipped.reason);
        }
    }
}

/// Answer one question, or keep asking until an empty line is entered
#[inline]
pub fn ask(config_dir: &Path, question: Option<String>, top_k: Option<usize>) -> Result<()> {
    let config = load_config(config_dir)?;
    let top_k = top_k.unwrap_or(config.retrieval.top_k);

    if let Some(question) = question {
        let Some(question) = non_blank(&question) else {
            warn_blank_question();
            return Ok(());
        };
        let context = open_context(&config)?;
        return answer_and_print(&context, question, top_k);
    }

    let context = open_context(&config)?;
    eprintln!(
        "{}",
        style(format!(
            "Ready: {} chunks indexed. Press Enter on an empty line to quit.",
            context.corpus().len()
        ))
        .cyan()
    );

    loop {
        let input: String = match Input::new()
            .with_prompt("Question")
            .allow_empty(true)
            .interact_text()
        {
            Ok(input) => input,
            Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => return Err(e).context("Failed to read question"),
        };

        if input.is_empty() {
            break;
        }

        match non_blank(&input) {
            Some(question) => answer_and_print(&context, question, top_k)?,
            None => warn_blank_question(),
        }
    }

    Ok(())
}

fn answer_and_print(context: &AppContext, question: &str, top_k: usize) -> Result<()> {
    let answer = context
        .ask_with_top_k(question, top_k)
        .context("Failed to answer question")?;

    println!();
    println!("{}", style("Answer:").bold().green());
    println!("{}", answer);
    println!();
    Ok(())
}

fn non_blank(question: &str) -> Option<&str> {
    let trimmed = question.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn warn_blank_question() {
    warn!("Ignoring blank question");
    eprintln!("{}", style(BLANK_QUESTION_WARNING).yellow());
}

/// Print the chunks nearest to `query` with their distances
#[inline]
pub fn search(config_dir: &Path, query: &str, top_k: Option<usize>) -> Result<()> {
    let Some(query) = non_blank(query) else {
        warn_blank_question();
        return Ok(());
    };

    let config = load_config(config_dir)?;
    let top_k = top_k.unwrap_or(config.retrieval.top_k);
    let context = open_context(&config)?;

    let results = context
        .search(query, top_k)
        .context("Failed to search the index")?;

    if results.is_empty() {
        println!("No matching chunks found.");
        return Ok(());
    }

    println!("Top {} chunks for: {}", results.len(), style(query).cyan());
    println!();
    for (rank, chunk) in results.iter().enumerate() {
        println!(
            "{} {}",
            style(format!("#{}", rank + 1)).bold(),
            style(format!("(distance {:.4})", chunk.distance)).dim()
        );
        println!("{}", chunk.text);
        println!();
    }

    Ok(())
}

/// Show configuration paths, persisted index statistics and Ollama health
#[inline]
pub fn show_status(config_dir: &Path) -> Result<()> {
    let config = load_config(config_dir)?;
    let source_dir = config.source_dir();
    let processed_dir = config.processed_dir();

    println!("📊 Doc QA Status Report");
    println!("{}", "=".repeat(50));
    println!();

    println!("📁 Paths:");
    println!("   Config: {}", config.config_file_path().display());
    println!("   Documents: {}", source_dir.display());
    println!("   Index: {}", processed_dir.display());
    println!();

    println!("📄 Documents:");
    match crate::ingestion::pdf::discover_documents(&source_dir, &PdfExtractor) {
        Ok(documents) => println!("   {} PDF documents found", documents.len()),
        Err(e) => println!("   ❌ Failed to list documents - {}", e),
    }
    println!();

    println!("🔍 Index:");
    if storage::artifacts_exist(&processed_dir) {
        match storage::load(&processed_dir) {
            Ok((index, texts)) => {
                println!("   ✅ Chunks: {}", texts.len());
                println!("   🔢 Dimension: {}", index.dimension());
            }
            Err(e) => println!("   ⚠️  Unusable, will be rebuilt - {}", e),
        }
        if let Some(modified) = modified_time(&storage::index_path(&processed_dir)) {
            println!("   🕒 Last Built: {}", format_time(modified));
        }
    } else {
        println!("   📭 Not built yet. Run 'doc-qa index' to build it.");
    }
    println!();

    println!("🤖 Ollama Status:");
    match OllamaClient::new(&config.ollama) {
        Ok(client) => match client.health_check() {
            Ok(()) => {
                println!(
                    "   ✅ Ollama: Connected ({}:{})",
                    config.ollama.host, config.ollama.port
                );
            }
            Err(e) => {
                println!("   ⚠️  Ollama: Unhealthy - {:#}", e);
            }
        },
        Err(e) => {
            println!("   ❌ Ollama: Failed to connect - {}", e);
        }
    }
    println!("   📋 Embedding Model: {}", config.ollama.embedding_model);
    println!("   💬 Generation Model: {}", config.ollama.generation_model);
    println!("   🎯 Top-k: {}", config.retrieval.top_k);

    Ok(())
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    match fs::metadata(path).and_then(|metadata| metadata.modified()) {
        Ok(modified) => Some(modified),
        Err(e) => {
            warn!("Could not read modification time of {}: {}", path.display(), e);
            None
        }
    }
}

fn format_time(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
