//! Session commands: startup checks, corpus ingestion, the interactive
//! loop, and one-shot questions.
//!
//! Readiness failures are fatal at startup; once the session is running, a
//! failing query is reported inline and the loop continues.

use anyhow::{bail, Result};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::Config;
use crate::embedding::OllamaEmbedder;
use crate::generate::{Generator, OllamaGenerator};
use crate::index::MemoryIndex;
use crate::loader;
use crate::rag::RagEngine;

/// Verify Ollama is reachable and the configured model is present,
/// pulling it when missing.
pub async fn run_check(config: &Config) -> Result<()> {
    let generator = OllamaGenerator::new(config);

    if !generator.is_ready().await {
        bail!(
            "Ollama is not running at {}.\n\
             Start it with: ollama serve",
            config.ollama.url
        );
    }
    println!("Ollama is running at {}", config.ollama.url);

    for model in [&config.ollama.model, &config.embedding.model] {
        if generator.model_available(model).await? {
            println!("Model available: {}", model);
        } else {
            println!("Model {} not found locally, pulling (this can take a while)...", model);
            generator.pull_model(model).await?;
            println!("Model pulled: {}", model);
        }
    }

    Ok(())
}

/// Ingest every configured corpus entry into the engine, then build the
/// index. A failing entry aborts that single addition; the rest of the
/// corpus is still ingested.
pub async fn ingest_corpus(config: &Config, engine: &mut RagEngine) -> Result<usize> {
    for file in &config.corpus.files {
        println!("Processing file: {}", file.display());
        match engine.add_document(file).await {
            Ok(0) => println!("  already ingested, skipped"),
            Ok(n) => println!("  {} chunks created", n),
            Err(e) => println!("  error: {}", e),
        }
    }

    for dir in &config.corpus.dirs {
        println!("Scanning directory: {}", dir.root.display());
        let files = loader::scan_dir(dir)?;
        for file in files {
            match engine.add_document(&file).await {
                Ok(0) => {}
                Ok(n) => println!("  {}: {} chunks", file.display(), n),
                Err(e) => println!("  {}: error: {}", file.display(), e),
            }
        }
    }

    for url in &config.corpus.urls {
        println!("Fetching URL: {}", url);
        match engine.add_url(url).await {
            Ok(0) => println!("  already ingested, skipped"),
            Ok(n) => println!("  {} chunks created", n),
            Err(e) => println!("  error: {}", e),
        }
    }

    if engine.pending_chunks() == 0 {
        bail!("no documents were ingested; check [corpus] in the config");
    }

    println!(
        "Building vector index from {} chunks...",
        engine.pending_chunks()
    );
    let indexed = engine.build_index().await?;
    println!("Index ready ({} chunks).", indexed);
    Ok(indexed)
}

fn build_engine(config: &Config) -> RagEngine {
    let embedder = Arc::new(OllamaEmbedder::new(config));
    let index = Box::new(MemoryIndex::new(embedder, config.embedding.batch_size));
    let generator = Arc::new(OllamaGenerator::new(config));
    RagEngine::new(config, index, generator)
}

/// One-shot: ingest, build, answer a single question, exit.
pub async fn run_ask(config: &Config, question: &str) -> Result<()> {
    run_check(config).await?;
    let mut engine = build_engine(config);
    ingest_corpus(config, &mut engine).await?;

    let answer = engine.query(question, false).await;
    println!("\n{}", answer);
    Ok(())
}

/// Interactive loop with conversational memory.
pub async fn run_chat(config: &Config) -> Result<()> {
    run_check(config).await?;
    let mut engine = build_engine(config);
    ingest_corpus(config, &mut engine).await?;

    let mut auto_clear = config.memory.auto_clear;

    println!();
    println!("Interactive mode. Commands:");
    println!("  memory / history   show retained conversation");
    println!("  clear              clear memory");
    println!("  auto on|off        toggle automatic topic-change clearing");
    println!("  exit / quit        leave");
    println!(
        "Automatic topic-change clearing: {}",
        if auto_clear { "ON" } else { "OFF" }
    );

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        println!();
        print!("> ");
        use std::io::Write;
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input.to_lowercase().as_str() {
            "exit" | "quit" => break,
            "memory" | "history" => {
                show_memory(&engine);
                continue;
            }
            "clear" => {
                engine.clear_memory();
                println!("Conversation memory cleared.");
                continue;
            }
            "auto on" => {
                auto_clear = true;
                println!("Automatic topic-change clearing: ON");
                continue;
            }
            "auto off" => {
                auto_clear = false;
                println!("Automatic topic-change clearing: OFF");
                continue;
            }
            _ => {}
        }

        let answer = engine.query(input, auto_clear).await;
        println!("\n{}", answer);
    }

    println!("Bye.");
    Ok(())
}

fn show_memory(engine: &RagEngine) {
    let memory = engine.memory();
    println!("{}", "=".repeat(60));
    println!(
        "Conversation memory: {}/{} turns",
        memory.turn_count(),
        memory.max_turns()
    );
    println!();
    println!("{}", memory.formatted_history());
    println!("{}", "=".repeat(60));
}
