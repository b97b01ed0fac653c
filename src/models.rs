//! Core data models used throughout askdocs.
//!
//! These types represent the chunks, retrieval results, and conversation turns
//! that flow through the ingestion and query pipeline.

use uuid::Uuid;

/// Where a document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    File,
    Url,
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceType::File => write!(f, "file"),
            SourceType::Url => write!(f, "url"),
        }
    }
}

/// Provenance metadata attached to every chunk.
#[derive(Debug, Clone)]
pub struct ChunkMeta {
    /// Path or URL the text was loaded from.
    pub source: String,
    pub source_type: SourceType,
    /// Base file name, present for file sources only.
    pub filename: Option<String>,
    /// Position of this chunk within its document, starting at 0.
    pub chunk_index: usize,
    /// Number of chunks the document was split into.
    pub chunk_total: usize,
}

/// A bounded slice of source text with overlap, immutable once created.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub id: String,
    pub content: String,
    pub meta: ChunkMeta,
}

impl Chunk {
    pub fn new(content: String, meta: ChunkMeta) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content,
            meta,
        }
    }
}

/// A chunk paired with its similarity score, best match first in results.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// One message in the conversation. Two turns (user then assistant) form one
/// interaction; turns are never mutated after creation.
#[derive(Debug, Clone)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}
