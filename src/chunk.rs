//! Overlapping text chunker.
//!
//! Splits document text into [`Chunk`]s of at most `chunk_size` characters
//! with `chunk_overlap` characters carried over between consecutive chunks.
//! Split points prefer paragraph breaks, then line breaks, then sentence
//! ends, then spaces, so chunks stay semantically coherent.
//!
//! Each chunk is tagged with its source metadata plus a contiguous
//! `chunk_index` and the document's `chunk_total`.

use crate::error::RagError;
use crate::models::{Chunk, ChunkMeta, SourceType};

/// Preferred split points, tried in order within each window.
const BREAKS: [&str; 4] = ["\n\n", "\n", ". ", " "];

/// Split `text` into overlapping chunks tagged with provenance metadata.
///
/// Returns [`RagError::EmptyInput`] when the text is blank. Chunk indices
/// are contiguous starting at 0 and every chunk carries the same
/// `chunk_total`.
pub fn chunk_text(
    text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
    source: &str,
    source_type: SourceType,
    filename: Option<String>,
) -> Result<Vec<Chunk>, RagError> {
    if text.trim().is_empty() {
        return Err(RagError::EmptyInput);
    }

    let pieces = split_windows(text.trim(), chunk_size, chunk_overlap);
    let total = pieces.len();

    Ok(pieces
        .into_iter()
        .enumerate()
        .map(|(i, content)| {
            Chunk::new(
                content,
                ChunkMeta {
                    source: source.to_string(),
                    source_type,
                    filename: filename.clone(),
                    chunk_index: i,
                    chunk_total: total,
                },
            )
        })
        .collect())
}

/// Window loop: take up to `chunk_size` characters, cut at the best break
/// point in the window, then step forward by the piece length minus the
/// overlap. Always makes forward progress.
fn split_windows(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let char_starts: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let n_chars = char_starts.len();
    let byte_at = |ci: usize| {
        if ci >= n_chars {
            text.len()
        } else {
            char_starts[ci]
        }
    };

    if n_chars <= chunk_size {
        return vec![text.to_string()];
    }

    let mut pieces = Vec::new();
    let mut start = 0usize; // char index

    while start < n_chars {
        let end = start + chunk_size;
        if end >= n_chars {
            let tail = text[byte_at(start)..].trim();
            if !tail.is_empty() {
                pieces.push(tail.to_string());
            }
            break;
        }

        let window = &text[byte_at(start)..byte_at(end)];
        let cut = find_break(window).unwrap_or(window.len());
        let piece = window[..cut].trim();
        if !piece.is_empty() {
            pieces.push(piece.to_string());
        }

        let consumed_chars = window[..cut].chars().count();
        let step = consumed_chars.saturating_sub(overlap).max(1);
        start += step;
    }

    pieces
}

/// Find the byte offset just past the best break point in the window.
///
/// Only breaks in the second half of the window are considered, so no
/// chunk shrinks below half the configured size.
fn find_break(window: &str) -> Option<usize> {
    let min_pos = window.len() / 2;
    for sep in BREAKS {
        if let Some(pos) = window.rfind(sep) {
            if pos >= min_pos {
                return Some(pos + sep.len());
            }
        }
    }
    None
}
