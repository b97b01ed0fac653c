//! # askdocs CLI
//!
//! Commands for checking the Ollama backend, inspecting the configured
//! corpus, asking one-shot questions, and running an interactive session
//! with conversational memory.
//!
//! ## Usage
//!
//! ```bash
//! askdocs --config ./config/askdocs.toml <command>
//! ```
//!
//! | Command | Description |
//! |---------|-------------|
//! | `askdocs check` | Verify Ollama is running; pull missing models |
//! | `askdocs sources` | List configured corpus entries and their health |
//! | `askdocs ask "<question>"` | Ingest the corpus and answer one question |
//! | `askdocs chat` | Ingest the corpus and start the interactive loop |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use askdocs::{chat, config, sources};

/// askdocs — a local-first RAG question-answering tool with conversational
/// memory, backed by Ollama.
#[derive(Parser)]
#[command(
    name = "askdocs",
    about = "Ask questions about your documents using a local language model",
    version,
    long_about = "askdocs ingests documents (txt/md/pdf/docx) and web pages, chunks and \
    embeds them into an in-memory vector index, and answers questions by retrieving the \
    most relevant chunks and feeding them plus a bounded conversation history to a local \
    Ollama model."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Corpus entries, chunking, retrieval, memory, and Ollama settings are
    /// read from this file. Missing file means built-in defaults with an
    /// empty corpus.
    #[arg(long, global = true, default_value = "./config/askdocs.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Verify the Ollama backend and pull missing models.
    ///
    /// Checks that Ollama is reachable at the configured URL and that both
    /// the generation and embedding models are present locally, downloading
    /// them when absent.
    Check,

    /// List configured corpus entries and their health.
    Sources,

    /// Ingest the corpus and answer a single question.
    ///
    /// Builds the index from the configured corpus, answers, and exits.
    /// No conversational memory is carried.
    Ask {
        /// The question to answer.
        question: String,
    },

    /// Ingest the corpus and start an interactive session.
    ///
    /// Questions carry a bounded conversational memory; when the topic
    /// changes, the memory can be cleared automatically. In-session
    /// commands: `memory`, `clear`, `auto on`, `auto off`, `exit`.
    Chat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = if cli.config.exists() {
        config::load_config(&cli.config)?
    } else {
        config::Config::minimal()
    };

    match cli.command {
        Commands::Check => {
            chat::run_check(&cfg).await?;
        }
        Commands::Sources => {
            sources::list_sources(&cfg)?;
        }
        Commands::Ask { question } => {
            chat::run_ask(&cfg, &question).await?;
        }
        Commands::Chat => {
            chat::run_chat(&cfg).await?;
        }
    }

    Ok(())
}
