//! Sentence segmentation over cleaned text.
//!
//! The model path runs UAX #29 sentence bounds (which already keep decimals,
//! lowercase continuations and closing quotes together) and then merges any
//! break that directly follows a known abbreviation or an initial, or that
//! falls inside a whitespace-free token. Without a
//! model the conservative punctuation rule in [`rules`] is used.

mod model;
mod rules;

use std::cell::OnceCell;
use std::sync::Arc;

use smartchunk_core::SegmenterMode;
use unicode_segmentation::UnicodeSegmentation;

use crate::tokenizer::TokenCounter;

pub use model::SegmenterModel;

// ── Sentence ────────────────────────────────────────────────────────────────

/// A sentence span of the cleaned text, with a lazily cached token count.
#[derive(Debug, Clone)]
pub struct Sentence<'a> {
    text: &'a str,
    start: usize,
    end: usize,
    tokens: OnceCell<usize>,
}

impl<'a> Sentence<'a> {
    /// `source[start..end]` as a sentence.
    pub fn new(source: &'a str, start: usize, end: usize) -> Self {
        Self {
            text: &source[start..end],
            start,
            end,
            tokens: OnceCell::new(),
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Byte offset into the cleaned text.
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Token count, computed on first call and cached.
    pub fn token_count(&self, counter: &dyn TokenCounter) -> usize {
        *self.tokens.get_or_init(|| counter.count(self.text))
    }
}

// ── Segmenter ───────────────────────────────────────────────────────────────

/// Splits cleaned text into sentences. Cheap to clone; the model is shared.
#[derive(Debug, Clone)]
pub struct SentenceSegmenter {
    model: Option<Arc<SegmenterModel>>,
}

impl SentenceSegmenter {
    pub fn with_model(model: Arc<SegmenterModel>) -> Self {
        Self { model: Some(model) }
    }

    /// Segmenter for when the model is unavailable.
    pub fn rule_based() -> Self {
        Self { model: None }
    }

    pub fn mode(&self) -> SegmenterMode {
        match self.model {
            Some(_) => SegmenterMode::Model,
            None => SegmenterMode::RuleBased,
        }
    }

    /// Ordered, non-overlapping, trimmed sentences covering every
    /// non-whitespace character of `text`.
    pub fn segment<'a>(&self, text: &'a str) -> Vec<Sentence<'a>> {
        let ranges = match &self.model {
            Some(model) => model_ranges(text, model),
            None => rules::split_sentence_ranges(text),
        };
        ranges
            .into_iter()
            .map(|(start, end)| Sentence::new(text, start, end))
            .collect()
    }
}

fn model_ranges(text: &str, model: &SegmenterModel) -> Vec<(usize, usize)> {
    let mut bounds = Vec::new();
    for (offset, piece) in text.split_sentence_bound_indices() {
        rules::push_trimmed(text, offset, offset + piece.len(), &mut bounds);
    }

    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(bounds.len());
    for (start, end) in bounds {
        match merged.last_mut() {
            // No whitespace between the spans means UAX #29 broke inside a
            // token (`search?q=rust`), which is never a sentence end.
            Some(last)
                if last.1 == start || model.ends_with_abbreviation(&text[last.0..last.1]) =>
            {
                last.1 = end
            }
            _ => merged.push((start, end)),
        }
    }
    merged
}
