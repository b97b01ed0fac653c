use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub corpus: CorpusConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_url")]
    pub url: String,
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            url: default_ollama_url(),
            model: default_model(),
        }
    }
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}
fn default_model() -> String {
    "llama3.2:3b".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_dims")]
    pub dims: usize,
    /// Ollama base URL for embeddings; defaults to `[ollama].url` when absent.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            dims: default_dims(),
            url: None,
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_embedding_model() -> String {
    "nomic-embed-text".to_string()
}
fn default_dims() -> usize {
    768
}
fn default_batch_size() -> usize {
    64
}
fn default_max_retries() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

fn default_chunk_size() -> usize {
    1200
}
fn default_chunk_overlap() -> usize {
    300
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

fn default_top_k() -> usize {
    6
}

#[derive(Debug, Deserialize, Clone)]
pub struct MemoryConfig {
    /// Question/answer pairs retained before FIFO eviction.
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
    /// Clear memory automatically when the topic changes.
    #[serde(default = "default_auto_clear")]
    pub auto_clear: bool,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            auto_clear: default_auto_clear(),
        }
    }
}

fn default_max_turns() -> usize {
    3
}
fn default_auto_clear() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
        }
    }
}

fn default_temperature() -> f32 {
    0.3
}

/// Documents and web pages to ingest at session start.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct CorpusConfig {
    #[serde(default)]
    pub files: Vec<PathBuf>,
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default)]
    pub dirs: Vec<DirEntryConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DirEntryConfig {
    pub root: PathBuf,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
}

fn default_include_globs() -> Vec<String> {
    vec![
        "**/*.md".to_string(),
        "**/*.txt".to_string(),
        "**/*.pdf".to_string(),
        "**/*.docx".to_string(),
    ]
}

impl Config {
    /// Minimal default configuration, used when no config file exists.
    pub fn minimal() -> Self {
        Self {
            ollama: OllamaConfig::default(),
            embedding: EmbeddingConfig::default(),
            chunking: ChunkingConfig::default(),
            retrieval: RetrievalConfig::default(),
            memory: MemoryConfig::default(),
            generation: GenerationConfig::default(),
            corpus: CorpusConfig::default(),
        }
    }

    /// Base URL for the embedding endpoint.
    pub fn embedding_url(&self) -> &str {
        self.embedding.url.as_deref().unwrap_or(&self.ollama.url)
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.chunking.chunk_size == 0 {
        anyhow::bail!("chunking.chunk_size must be > 0");
    }
    if config.chunking.chunk_overlap >= config.chunking.chunk_size {
        anyhow::bail!("chunking.chunk_overlap must be smaller than chunking.chunk_size");
    }
    if config.retrieval.top_k < 1 {
        anyhow::bail!("retrieval.top_k must be >= 1");
    }
    if config.memory.max_turns < 1 {
        anyhow::bail!("memory.max_turns must be >= 1");
    }
    if !(0.0..=2.0).contains(&config.generation.temperature) {
        anyhow::bail!("generation.temperature must be in [0.0, 2.0]");
    }
    if config.embedding.dims == 0 {
        anyhow::bail!("embedding.dims must be > 0");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("askdocs.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        (tmp, path)
    }

    #[test]
    fn empty_file_yields_defaults() {
        let (_tmp, path) = write_config("");
        let config = load_config(&path).unwrap();
        assert_eq!(config.chunking.chunk_size, 1200);
        assert_eq!(config.chunking.chunk_overlap, 300);
        assert_eq!(config.retrieval.top_k, 6);
        assert_eq!(config.memory.max_turns, 3);
        assert_eq!(config.generation.temperature, 0.3);
        assert_eq!(config.ollama.model, "llama3.2:3b");
    }

    #[test]
    fn overlap_must_be_smaller_than_chunk_size() {
        let (_tmp, path) = write_config("[chunking]\nchunk_size = 100\nchunk_overlap = 100\n");
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn zero_top_k_rejected() {
        let (_tmp, path) = write_config("[retrieval]\ntop_k = 0\n");
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn embedding_url_falls_back_to_ollama_url() {
        let (_tmp, path) = write_config("[ollama]\nurl = \"http://10.0.0.2:11434\"\n");
        let config = load_config(&path).unwrap();
        assert_eq!(config.embedding_url(), "http://10.0.0.2:11434");
    }

    #[test]
    fn corpus_entries_parsed() {
        let (_tmp, path) = write_config(
            "[corpus]\nfiles = [\"notes.pdf\"]\nurls = [\"https://example.com/page\"]\n\n[[corpus.dirs]]\nroot = \"docs\"\n",
        );
        let config = load_config(&path).unwrap();
        assert_eq!(config.corpus.files.len(), 1);
        assert_eq!(config.corpus.urls.len(), 1);
        assert_eq!(config.corpus.dirs.len(), 1);
        assert!(config.corpus.dirs[0]
            .include_globs
            .iter()
            .any(|g| g == "**/*.md"));
    }
}
