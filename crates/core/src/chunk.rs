use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Default token budget per chunk.
pub const DEFAULT_CHUNK_TOKEN_LIMIT: usize = 100;

/// Default overlap carried from one chunk into the next.
pub const DEFAULT_OVERLAP_TOKENS: usize = 20;

/// Boundary tolerance on the configured limit, in percent.
pub const BOUNDARY_BUFFER_PERCENT: usize = 10;

// ── Options ───────────────────────────────────────────────────

/// Validated chunking parameters.
///
/// Construction goes through [`ChunkOptions::new`], so a value of this type
/// always satisfies `0 <= overlap_tokens < chunk_token_limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChunkOptions {
    chunk_token_limit: usize,
    overlap_tokens: usize,
    split_oversized_words: bool,
}

impl ChunkOptions {
    /// Validate raw caller-supplied limits.
    pub fn new(chunk_token_limit: i64, overlap_tokens: i64) -> Result<Self, ConfigurationError> {
        if chunk_token_limit <= 0 {
            return Err(ConfigurationError::NonPositiveLimit(chunk_token_limit));
        }
        if overlap_tokens < 0 {
            return Err(ConfigurationError::NegativeOverlap(overlap_tokens));
        }
        if overlap_tokens >= chunk_token_limit {
            return Err(ConfigurationError::OverlapNotBelowLimit {
                overlap: overlap_tokens,
                limit: chunk_token_limit,
            });
        }
        Ok(Self {
            chunk_token_limit: chunk_token_limit as usize,
            overlap_tokens: overlap_tokens as usize,
            split_oversized_words: false,
        })
    }

    /// Allow single words above the limit to be cut into token/character windows.
    pub fn with_split_oversized_words(mut self, enabled: bool) -> Self {
        self.split_oversized_words = enabled;
        self
    }

    pub fn chunk_token_limit(&self) -> usize {
        self.chunk_token_limit
    }

    pub fn overlap_tokens(&self) -> usize {
        self.overlap_tokens
    }

    pub fn split_oversized_words(&self) -> bool {
        self.split_oversized_words
    }

    /// The limit plus the 10% boundary buffer (`limit + floor(limit / 10)`).
    pub fn buffered_limit(&self) -> usize {
        self.chunk_token_limit + self.chunk_token_limit * BOUNDARY_BUFFER_PERCENT / 100
    }
}

impl Default for ChunkOptions {
    fn default() -> Self {
        Self {
            chunk_token_limit: DEFAULT_CHUNK_TOKEN_LIMIT,
            overlap_tokens: DEFAULT_OVERLAP_TOKENS,
            split_oversized_words: false,
        }
    }
}

// ── Output ────────────────────────────────────────────────────

/// One emitted chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// 0-based position in the output sequence.
    pub chunk_index: usize,
    pub text: String,
    pub token_count: usize,
    /// Byte offset of the first character in the cleaned text.
    pub start: usize,
    /// Byte offset one past the last character in the cleaned text.
    pub end: usize,
    /// Tokens of the leading overlap copied from the previous chunk.
    pub overlap_tokens: usize,
    /// A single indivisible unit above the buffered limit.
    pub oversized: bool,
}

/// Which sentence segmenter produced the sentence stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmenterMode {
    /// UAX #29 sentence bounds refined by the abbreviation model.
    Model,
    /// Punctuation + whitespace + capital letter rule.
    RuleBased,
}

impl std::fmt::Display for SegmenterMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SegmenterMode::Model => write!(f, "model"),
            SegmenterMode::RuleBased => write!(f, "rule_based"),
        }
    }
}

/// Ordered chunks plus aggregate statistics for one chunking call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingResult {
    pub chunks: Vec<Chunk>,
    pub total_chunks: usize,
    /// Sum of per-chunk token counts (overlap counted once per chunk it appears in).
    pub total_tokens: usize,
    /// At least one sentence exceeded the buffered limit and was word-split.
    pub word_fallback: bool,
    /// The character-window strategy had to be used.
    pub char_fallback: bool,
    pub segmenter: SegmenterMode,
    /// Length in bytes of the text after cleaning.
    pub cleaned_len: usize,
}

impl ChunkingResult {
    /// Result for input that is empty after cleaning.
    pub fn empty(segmenter: SegmenterMode) -> Self {
        Self {
            chunks: Vec::new(),
            total_chunks: 0,
            total_tokens: 0,
            word_fallback: false,
            char_fallback: false,
            segmenter,
            cleaned_len: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Chunk texts in order.
    pub fn texts(&self) -> Vec<&str> {
        self.chunks.iter().map(|c| c.text.as_str()).collect()
    }
}
