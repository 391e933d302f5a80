//! Sentence-aware, token-bounded text chunking.
//!
//! Pipeline: [`TextCleaner`] → [`SentenceSegmenter`] → [`ChunkAccumulator`]
//! (with [`Tokenizer`] counts and the [`WordSplitter`] for oversized
//! sentences) → [`ChunkingResult`]. [`ChunkingService`] wires the stages
//! together over a shared [`ChunkerResources`].

pub mod accumulator;
pub mod cleaner;
pub mod error;
pub mod resources;
pub mod segmenter;
pub mod service;
pub mod splitter;
pub mod tokenizer;

pub use accumulator::{AccumulatorOutput, AccumulatorState, ChunkAccumulator};
pub use cleaner::{HtmlCleaner, PassthroughCleaner, TextCleaner};
pub use error::ChunkError;
pub use resources::ChunkerResources;
pub use segmenter::{SegmenterModel, Sentence, SentenceSegmenter};
pub use service::{ChunkingService, ServiceInfo};
pub use splitter::{Piece, SplitOutcome, WordSplitter};
pub use tokenizer::{TokenCounter, TokenId, Tokenizer};

pub use smartchunk_core::{
    Chunk, ChunkOptions, ChunkingResult, ConfigurationError, SegmenterMode,
};
