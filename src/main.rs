use std::path::PathBuf;

use clap::{Parser, Subcommand};
use doc_qa::Result;
use doc_qa::commands::{ask, index_documents, search, show_status};
use doc_qa::config::{check_top_k, get_config_dir, run_interactive_config, show_config};

#[derive(Parser)]
#[command(name = "doc-qa")]
#[command(about = "Ask questions about a folder of PDF documents using a local Ollama model")]
#[command(version)]
struct Cli {
    /// Configuration directory (defaults to $DOC_QA_CONFIG_DIR or ~/.doc-qa)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure Ollama connection and document settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Build the document index, or load it if already built
    Index {
        /// Re-index the source documents even if an index exists
        #[arg(long)]
        rebuild: bool,
        /// Override the directory scanned for PDF documents
        #[arg(long)]
        source: Option<PathBuf>,
        /// Override the directory the index is stored in
        #[arg(long)]
        processed: Option<PathBuf>,
    },
    /// Answer a question from the indexed documents
    Ask {
        /// Question to answer; prompts interactively when omitted
        question: Option<String>,
        /// Number of chunks used as context
        #[arg(long, short = 'k', value_parser = parse_top_k)]
        top_k: Option<usize>,
    },
    /// Show the indexed chunks closest to a query
    Search {
        /// Text to search for
        query: String,
        /// Number of chunks to show
        #[arg(long, short = 'k', value_parser = parse_top_k)]
        top_k: Option<usize>,
    },
    /// Show configuration paths, index statistics and Ollama health
    Status,
}

fn parse_top_k(value: &str) -> std::result::Result<usize, String> {
    let top_k: usize = value
        .parse()
        .map_err(|e| format!("`{}` is not a number: {}", value, e))?;
    check_top_k(top_k).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config_dir = get_config_dir(cli.config_dir.as_deref())?;

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config(&config_dir)?;
            } else {
                run_interactive_config(&config_dir)?;
            }
        }
        Commands::Index {
            rebuild,
            source,
            processed,
        } => {
            index_documents(&config_dir, rebuild, source, processed)?;
        }
        Commands::Ask { question, top_k } => {
            ask(&config_dir, question, top_k)?;
        }
        Commands::Search { query, top_k } => {
            search(&config_dir, &query, top_k)?;
        }
        Commands::Status => {
            show_status(&config_dir)?;
        }
    }

    Ok(())
}
