//! # askdocs
//!
//! A local-first RAG question-answering tool with conversational memory,
//! backed by Ollama.
//!
//! askdocs ingests documents (txt/md/pdf/docx) and web pages, splits them
//! into overlapping chunks, embeds them into an in-memory vector index, and
//! answers questions by feeding the top-k most similar chunks — plus a
//! bounded conversation history — to a local language model.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌─────────────┐
//! │   Loaders   │──▶│   Chunker    │──▶│ MemoryIndex │
//! │ file / URL  │   │ size+overlap │   │  (vectors)  │
//! └─────────────┘   └──────────────┘   └──────┬──────┘
//!                                             │ top-k
//!                   ┌──────────────┐   ┌──────▼──────┐
//!                   │ Conversation │──▶│  RagEngine  │──▶ Ollama
//!                   │    memory    │   │ (query flow)│
//!                   └──────────────┘   └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! askdocs check                  # verify Ollama and pull models
//! askdocs sources                # list configured corpus entries
//! askdocs ask "What are the clinic hours?"
//! askdocs chat                   # interactive session with memory
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`loader`] | File loading and directory scanning |
//! | [`web`] | URL fetching |
//! | [`extract`] | PDF/DOCX/HTML text extraction |
//! | [`chunk`] | Overlapping text chunking |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`index`] | Vector index and similarity search |
//! | [`memory`] | Bounded conversational memory |
//! | [`topic`] | Topic-shift heuristic |
//! | [`prompt`] | Prompt assembly |
//! | [`generate`] | Generation backend abstraction |
//! | [`rag`] | Query orchestration |

pub mod chat;
pub mod chunk;
pub mod config;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod generate;
pub mod index;
pub mod loader;
pub mod memory;
pub mod models;
pub mod prompt;
pub mod rag;
pub mod sources;
pub mod topic;
pub mod web;
