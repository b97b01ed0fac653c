//! Error taxonomy for the ingestion and query pipeline.
//!
//! Every fallible pipeline operation returns [`RagError`]. Variants map to
//! the stage that failed, so callers can decide whether to skip a document,
//! retry a build, or surface the message to the user.

use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum RagError {
    /// A referenced file does not exist.
    NotFound(String),
    /// The file extension is not one of the supported document formats.
    UnsupportedFormat(String),
    /// A URL could not be fetched.
    Fetch(String),
    /// A document's bytes could not be reduced to text.
    Extract(String),
    /// Document text was empty or whitespace-only.
    EmptyInput,
    /// An index build was requested with no accumulated chunks.
    EmptyCorpus,
    /// A query arrived before the index was built.
    IndexNotReady,
    /// The embedding backend failed or returned a malformed response.
    Embedding(String),
    /// The generation backend failed mid-answer.
    Generation(String),
    /// The model backend is unreachable or the model is not installed.
    ModelUnavailable(String),
}

impl fmt::Display for RagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RagError::NotFound(path) => write!(f, "file not found: {}", path),
            RagError::UnsupportedFormat(ext) => {
                write!(f, "unsupported document format: {}", ext)
            }
            RagError::Fetch(msg) => write!(f, "failed to fetch URL: {}", msg),
            RagError::Extract(msg) => write!(f, "failed to extract text: {}", msg),
            RagError::EmptyInput => write!(f, "document contains no text"),
            RagError::EmptyCorpus => write!(f, "no documents have been ingested"),
            RagError::IndexNotReady => {
                write!(f, "index has not been built; run build_index first")
            }
            RagError::Embedding(msg) => write!(f, "embedding failed: {}", msg),
            RagError::Generation(msg) => write!(f, "generation failed: {}", msg),
            RagError::ModelUnavailable(msg) => write!(f, "model unavailable: {}", msg),
        }
    }
}

impl Error for RagError {}
