//! Chunking entry point: clean → segment → accumulate → assemble.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use smartchunk_core::{ChunkOptions, ChunkingResult, SegmenterMode};
use tracing::{debug, info};

use crate::accumulator::ChunkAccumulator;
use crate::cleaner::{HtmlCleaner, TextCleaner};
use crate::error::ChunkError;
use crate::resources::ChunkerResources;
use crate::segmenter::SentenceSegmenter;

/// Features reported by [`ChunkingService::info`].
const FEATURES: &[&str] = &[
    "Sentence-aware chunking",
    "Token-based splitting",
    "Configurable overlap",
    "Long sentence handling",
    "HTML cleaning",
];

/// Static description of the service and its readiness.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceInfo {
    pub service: &'static str,
    pub ready: bool,
    pub encoding: String,
    /// `None` until the segmenter has been initialized.
    pub segmenter: Option<SegmenterMode>,
    pub features: Vec<&'static str>,
}

/// Stateless chunking front end. Clone freely; clones share resources.
#[derive(Clone)]
pub struct ChunkingService {
    resources: Arc<ChunkerResources>,
    cleaner: Arc<dyn TextCleaner>,
}

impl ChunkingService {
    /// Service over `resources`, cleaning input as HTML.
    pub fn new(resources: Arc<ChunkerResources>) -> Self {
        Self {
            resources,
            cleaner: Arc::new(HtmlCleaner),
        }
    }

    /// Replace the cleaning collaborator.
    pub fn with_cleaner(mut self, cleaner: impl TextCleaner + 'static) -> Self {
        self.cleaner = Arc::new(cleaner);
        self
    }

    pub fn resources(&self) -> &Arc<ChunkerResources> {
        &self.resources
    }

    pub fn is_ready(&self) -> bool {
        self.resources.is_ready()
    }

    /// Chunk `text` with raw limits. Invalid limits fail before any work.
    pub fn chunk(
        &self,
        text: &str,
        chunk_token_limit: i64,
        overlap_tokens: i64,
    ) -> Result<ChunkingResult, ChunkError> {
        let options = ChunkOptions::new(chunk_token_limit, overlap_tokens)?;
        self.chunk_with(text, &options)
    }

    /// Chunk `text` with validated options.
    pub fn chunk_with(&self, text: &str, options: &ChunkOptions) -> Result<ChunkingResult, ChunkError> {
        let started = Instant::now();
        let tokenizer = self.resources.tokenizer()?;
        let segmenter = self.resources.segmenter();

        let cleaned = self.cleaner.clean(text);
        if cleaned.trim().is_empty() {
            debug!(raw_len = text.len(), "nothing to chunk after cleaning");
            return Ok(ChunkingResult::empty(segmenter.mode()));
        }

        let sentences = segmenter.segment(&cleaned);
        let mut accumulator = ChunkAccumulator::new(&cleaned, tokenizer, *options);
        for sentence in &sentences {
            accumulator.push_sentence(sentence);
        }
        let output = accumulator.finish();

        let total_tokens = output.chunks.iter().map(|c| c.token_count).sum();
        info!(
            chars = cleaned.len(),
            sentences = sentences.len(),
            chunks = output.chunks.len(),
            total_tokens,
            limit = options.chunk_token_limit(),
            overlap = options.overlap_tokens(),
            word_fallback = output.word_fallback,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "text chunked"
        );

        Ok(ChunkingResult {
            total_chunks: output.chunks.len(),
            chunks: output.chunks,
            total_tokens,
            word_fallback: output.word_fallback,
            char_fallback: output.char_fallback,
            segmenter: segmenter.mode(),
            cleaned_len: cleaned.len(),
        })
    }

    pub fn info(&self) -> ServiceInfo {
        ServiceInfo {
            service: "SmartChunker",
            ready: self.is_ready(),
            encoding: self.resources.encoding().to_string(),
            segmenter: self.resources.loaded_segmenter().map(SentenceSegmenter::mode),
            features: FEATURES.to_vec(),
        }
    }
}
