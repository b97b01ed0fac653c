//! Vector index abstraction and in-memory implementation.
//!
//! [`MemoryIndex`] is brute-force cosine similarity over all stored vectors;
//! the corpus for a single session is small enough that no ANN structure is
//! warranted. Results are sorted by score with a deterministic tie-break on
//! chunk id.

use async_trait::async_trait;
use std::sync::Arc;

use crate::embedding::Embedder;
use crate::error::RagError;
use crate::models::{Chunk, ScoredChunk};

/// Top-k nearest-neighbor store for embedded chunks.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Embed and store a batch of chunks. Replaces any previous contents.
    async fn build(&mut self, chunks: Vec<Chunk>) -> Result<(), RagError>;

    /// Return the `k` chunks most similar to `query`, best match first.
    async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>, RagError>;

    /// Whether `build` has completed at least once.
    fn is_ready(&self) -> bool;
}

struct Entry {
    chunk: Chunk,
    vector: Vec<f32>,
}

/// In-memory vector index backed by an [`Embedder`].
pub struct MemoryIndex {
    embedder: Arc<dyn Embedder>,
    batch_size: usize,
    entries: Vec<Entry>,
    ready: bool,
}

impl MemoryIndex {
    pub fn new(embedder: Arc<dyn Embedder>, batch_size: usize) -> Self {
        Self {
            embedder,
            batch_size: batch_size.max(1),
            entries: Vec::new(),
            ready: false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn build(&mut self, chunks: Vec<Chunk>) -> Result<(), RagError> {
        if chunks.is_empty() {
            return Err(RagError::EmptyCorpus);
        }

        let mut entries = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let vectors = self.embedder.embed(&texts).await?;
            if vectors.len() != batch.len() {
                return Err(RagError::Embedding(format!(
                    "expected {} vectors, got {}",
                    batch.len(),
                    vectors.len()
                )));
            }
            for (chunk, vector) in batch.iter().cloned().zip(vectors) {
                entries.push(Entry { chunk, vector });
            }
        }

        self.entries = entries;
        self.ready = true;
        Ok(())
    }

    async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>, RagError> {
        if !self.ready {
            return Err(RagError::IndexNotReady);
        }

        let query_vec = self
            .embedder
            .embed(&[query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RagError::Embedding("empty embedding response".to_string()))?;

        let mut scored: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|entry| ScoredChunk {
                chunk: entry.chunk.clone(),
                score: cosine_sim(&query_vec, &entry.vector),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.chunk.id.cmp(&b.chunk.id))
        });
        scored.truncate(k);
        Ok(scored)
    }

    fn is_ready(&self) -> bool {
        self.ready
    }
}

/// Cosine similarity; zero for mismatched lengths or zero-magnitude vectors.
pub fn cosine_sim(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag_a < f32::EPSILON || mag_b < f32::EPSILON {
        0.0
    } else {
        dot / (mag_a * mag_b)
    }
}
