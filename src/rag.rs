//! Query orchestration and ingestion accumulation.
//!
//! [`RagEngine`] ties the pipeline together. Ingestion accumulates chunks
//! from files and URLs until [`RagEngine::build_index`] hands the whole
//! batch to the vector index. Each query then runs a fixed control flow:
//! memory gate → retrieve → assemble prompt → generate → record.
//!
//! The memory gate is destructive: when auto-clear is on and the question
//! does not relate to the retained history, prior turns are dropped before
//! retrieval and are unrecoverable. Failures on the query path are rendered
//! as a plain-text answer and are never recorded into memory, so one bad
//! question cannot corrupt the session.

use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use crate::chunk::chunk_text;
use crate::config::Config;
use crate::error::RagError;
use crate::generate::Generator;
use crate::index::VectorIndex;
use crate::loader;
use crate::memory::ConversationMemory;
use crate::models::{Chunk, SourceType};
use crate::prompt;
use crate::topic;
use crate::web;

pub struct RagEngine {
    chunk_size: usize,
    chunk_overlap: usize,
    top_k: usize,
    temperature: f32,
    memory: ConversationMemory,
    pending: Vec<Chunk>,
    seen_docs: HashSet<String>,
    index: Box<dyn VectorIndex>,
    generator: Arc<dyn Generator>,
}

impl RagEngine {
    pub fn new(config: &Config, index: Box<dyn VectorIndex>, generator: Arc<dyn Generator>) -> Self {
        Self {
            chunk_size: config.chunking.chunk_size,
            chunk_overlap: config.chunking.chunk_overlap,
            top_k: config.retrieval.top_k,
            temperature: config.generation.temperature,
            memory: ConversationMemory::new(config.memory.max_turns),
            pending: Vec::new(),
            seen_docs: HashSet::new(),
            index,
            generator,
        }
    }

    /// Load a file, chunk it, and accumulate the chunks for the next
    /// [`build_index`](Self::build_index). Returns the number of chunks
    /// added; 0 means the identical content was already ingested.
    pub async fn add_document(&mut self, path: &Path) -> Result<usize, RagError> {
        let text = loader::load_file(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string());
        self.accumulate(
            &text,
            &path.display().to_string(),
            SourceType::File,
            filename,
        )
    }

    /// Fetch a URL, reduce it to text, chunk it, and accumulate the chunks.
    pub async fn add_url(&mut self, url: &str) -> Result<usize, RagError> {
        let text = web::fetch_url(url).await?;
        self.accumulate(&text, url, SourceType::Url, None)
    }

    fn accumulate(
        &mut self,
        text: &str,
        source: &str,
        source_type: SourceType,
        filename: Option<String>,
    ) -> Result<usize, RagError> {
        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        hasher.update(text.as_bytes());
        let dedup_hash = format!("{:x}", hasher.finalize());
        if !self.seen_docs.insert(dedup_hash) {
            return Ok(0);
        }

        let chunks = chunk_text(
            text,
            self.chunk_size,
            self.chunk_overlap,
            source,
            source_type,
            filename,
        )?;
        let added = chunks.len();
        self.pending.extend(chunks);
        Ok(added)
    }

    /// Number of chunks accumulated and not yet indexed.
    pub fn pending_chunks(&self) -> usize {
        self.pending.len()
    }

    /// Embed the accumulated chunks and build the vector index in one batch.
    ///
    /// Fails with [`RagError::EmptyCorpus`] when nothing has been added. On
    /// success the pending list is drained; on failure it is kept so the
    /// build can be retried.
    pub async fn build_index(&mut self) -> Result<usize, RagError> {
        if self.pending.is_empty() {
            return Err(RagError::EmptyCorpus);
        }
        self.index.build(self.pending.clone()).await?;
        let indexed = self.pending.len();
        self.pending.clear();
        Ok(indexed)
    }

    /// Answer a question against the indexed corpus.
    ///
    /// Control flow per call: memory gate, retrieve, assemble, generate,
    /// record. Any retrieval or generation failure is converted into a
    /// user-facing error string; such failures leave memory untouched.
    pub async fn query(&mut self, question: &str, auto_clear: bool) -> String {
        if auto_clear
            && self.memory.turn_count() > 0
            && !topic::is_related(question, self.memory.history())
        {
            println!("Topic change detected, clearing previous conversation.");
            self.memory.clear();
        }

        match self.answer(question).await {
            Ok(answer) => {
                // Refusals and "not found" replies are recorded like any
                // other turn.
                self.memory.add_interaction(question, &answer);
                answer
            }
            Err(e) => format!("Could not answer this question: {}", e),
        }
    }

    async fn answer(&self, question: &str) -> Result<String, RagError> {
        if !self.index.is_ready() {
            return Err(RagError::IndexNotReady);
        }

        let retrieved = self.index.search(question, self.top_k).await?;
        let history = self.memory.formatted_history();
        let context = prompt::render_context(&retrieved);
        let user_prompt = prompt::build_user_prompt(&history, &context, question);

        self.generator
            .generate(&user_prompt, prompt::SYSTEM_PROMPT, self.temperature)
            .await
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn clear_memory(&mut self) {
        self.memory.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::NO_HISTORY;
    use crate::models::{ChunkMeta, ScoredChunk};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Index stub: `build` stores the batch, `search` returns the stored
    /// chunks in insertion order with descending scores.
    struct StubIndex {
        ready: bool,
        stored: Vec<Chunk>,
    }

    impl StubIndex {
        fn empty() -> Self {
            Self {
                ready: false,
                stored: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl VectorIndex for StubIndex {
        async fn build(&mut self, chunks: Vec<Chunk>) -> Result<(), RagError> {
            if chunks.is_empty() {
                return Err(RagError::EmptyCorpus);
            }
            self.stored = chunks;
            self.ready = true;
            Ok(())
        }

        async fn search(&self, _query: &str, k: usize) -> Result<Vec<ScoredChunk>, RagError> {
            if !self.ready {
                return Err(RagError::IndexNotReady);
            }
            Ok(self
                .stored
                .iter()
                .take(k)
                .enumerate()
                .map(|(i, chunk)| ScoredChunk {
                    chunk: chunk.clone(),
                    score: 1.0 - i as f32 * 0.1,
                })
                .collect())
        }

        fn is_ready(&self) -> bool {
            self.ready
        }
    }

    /// Generator stub that records every prompt it sees.
    struct StubGenerator {
        reply: Result<String, String>,
        prompts: Mutex<Vec<String>>,
    }

    impl StubGenerator {
        fn answering(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(message.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn last_prompt(&self) -> String {
            self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    #[async_trait]
    impl Generator for StubGenerator {
        async fn generate(
            &self,
            prompt: &str,
            _system: &str,
            _temperature: f32,
        ) -> Result<String, RagError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(answer) => Ok(answer.clone()),
                Err(message) => Err(RagError::Generation(message.clone())),
            }
        }

        async fn is_ready(&self) -> bool {
            true
        }

        async fn model_available(&self, _model: &str) -> Result<bool, RagError> {
            Ok(true)
        }

        async fn pull_model(&self, _model: &str) -> Result<(), RagError> {
            Ok(())
        }
    }

    fn engine_with(generator: Arc<StubGenerator>) -> RagEngine {
        RagEngine::new(
            &Config::minimal(),
            Box::new(StubIndex::empty()),
            generator,
        )
    }

    fn seed_chunk(engine: &mut RagEngine, content: &str) {
        engine.pending.push(Chunk::new(
            content.to_string(),
            ChunkMeta {
                source: "seed.txt".to_string(),
                source_type: SourceType::File,
                filename: Some("seed.txt".to_string()),
                chunk_index: 0,
                chunk_total: 1,
            },
        ));
    }

    #[tokio::test]
    async fn query_before_build_reports_error_without_touching_memory() {
        let generator = StubGenerator::answering("unused");
        let mut engine = engine_with(generator.clone());

        let answer = engine.query("What are the UBS hours?", false).await;
        assert!(answer.contains("build_index"));
        assert_eq!(engine.memory().turn_count(), 0);
        // The generator was never reached.
        assert!(generator.last_prompt().is_empty());
    }

    #[tokio::test]
    async fn build_with_empty_corpus_fails() {
        let mut engine = engine_with(StubGenerator::answering("x"));
        let err = engine.build_index().await.unwrap_err();
        assert!(matches!(err, RagError::EmptyCorpus));
    }

    #[tokio::test]
    async fn retrieved_chunk_reaches_the_prompt() {
        let generator = StubGenerator::answering("They are open from 8am to 6pm.");
        let mut engine = engine_with(generator.clone());
        seed_chunk(&mut engine, "UBS open 8am-6pm");
        engine.build_index().await.unwrap();

        let answer = engine.query("What are the UBS hours?", false).await;
        assert_eq!(answer, "They are open from 8am to 6pm.");

        let prompt = generator.last_prompt();
        assert!(prompt.contains("UBS open 8am-6pm"));
        assert!(prompt.contains("[Source: seed.txt]"));
        assert!(prompt.contains("What are the UBS hours?"));
    }

    #[tokio::test]
    async fn successful_query_records_one_interaction() {
        let generator = StubGenerator::answering("I could not find that information in the documents.");
        let mut engine = engine_with(generator);
        seed_chunk(&mut engine, "something unrelated");
        engine.build_index().await.unwrap();

        let _ = engine.query("What color is the mayor's car?", false).await;
        // Refusals are recorded like any other turn.
        assert_eq!(engine.memory().turn_count(), 1);
    }

    #[tokio::test]
    async fn generation_failure_is_reported_and_not_recorded() {
        let generator = StubGenerator::failing("model crashed");
        let mut engine = engine_with(generator);
        seed_chunk(&mut engine, "UBS open 8am-6pm");
        engine.build_index().await.unwrap();

        let before = engine.memory().turn_count();
        let answer = engine.query("What are the UBS hours?", false).await;
        assert!(answer.contains("model crashed"));
        assert_eq!(engine.memory().turn_count(), before);
    }

    #[tokio::test]
    async fn auto_clear_drops_history_before_retrieval() {
        let generator = StubGenerator::answering("answer");
        let mut engine = engine_with(generator.clone());
        seed_chunk(&mut engine, "health clinics open 8am-6pm");
        engine.build_index().await.unwrap();

        let _ = engine.query("where are the health clinics?", true).await;
        assert_eq!(engine.memory().turn_count(), 1);

        // Long question, no anaphoric marker: the gate clears memory, so
        // the assembled prompt shows the empty-history sentinel.
        let _ = engine
            .query(
                "how do I train a golden retriever puppy to sit on command reliably",
                true,
            )
            .await;
        let prompt = generator.last_prompt();
        assert!(prompt.contains(NO_HISTORY));
        assert!(!prompt.contains("where are the health clinics?"));
        // Only the new interaction remains.
        assert_eq!(engine.memory().turn_count(), 1);
    }

    #[tokio::test]
    async fn auto_clear_disabled_keeps_history() {
        let generator = StubGenerator::answering("answer");
        let mut engine = engine_with(generator.clone());
        seed_chunk(&mut engine, "health clinics open 8am-6pm");
        engine.build_index().await.unwrap();

        let _ = engine.query("where are the health clinics?", false).await;
        let _ = engine
            .query(
                "how do I train a golden retriever puppy to sit on command reliably",
                false,
            )
            .await;
        let prompt = generator.last_prompt();
        assert!(prompt.contains("where are the health clinics?"));
        assert_eq!(engine.memory().turn_count(), 2);
    }

    #[tokio::test]
    async fn short_related_question_keeps_history_with_auto_clear() {
        let generator = StubGenerator::answering("answer");
        let mut engine = engine_with(generator.clone());
        seed_chunk(&mut engine, "health clinics open 8am-6pm");
        engine.build_index().await.unwrap();

        let _ = engine.query("where are the health clinics?", true).await;
        let _ = engine.query("and what are their hours?", true).await;
        let prompt = generator.last_prompt();
        assert!(prompt.contains("where are the health clinics?"));
        assert_eq!(engine.memory().turn_count(), 2);
    }

    #[tokio::test]
    async fn duplicate_document_content_is_skipped() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("notes.txt");
        std::fs::write(&path, "the clinic schedule for this year").unwrap();

        let mut engine = engine_with(StubGenerator::answering("x"));
        let first = engine.add_document(&path).await.unwrap();
        assert!(first > 0);
        let second = engine.add_document(&path).await.unwrap();
        assert_eq!(second, 0);
        assert_eq!(engine.pending_chunks(), first);
    }

    #[tokio::test]
    async fn ingestion_error_leaves_session_usable() {
        let mut engine = engine_with(StubGenerator::answering("x"));
        let err = engine
            .add_document(Path::new("/missing/file.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::NotFound(_)));
        assert_eq!(engine.pending_chunks(), 0);
    }
}
