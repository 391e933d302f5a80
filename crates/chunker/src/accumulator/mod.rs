//! The chunk accumulator: turns a sentence stream into bounded, overlapping
//! chunks.
//!
//! Every chunk is a single contiguous slice of the cleaned text. Pending
//! content is tracked as a run of units (sentences or splitter pieces) and
//! measured by counting the exact slice it would emit, so a chunk's reported
//! token count is the count that was checked against the limit.

use smartchunk_core::{Chunk, ChunkOptions};
use tracing::{debug, trace};

use crate::segmenter::Sentence;
use crate::splitter::WordSplitter;
use crate::tokenizer::TokenCounter;

/// Where the accumulator is in its emit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccumulatorState {
    /// Nothing pending.
    Empty,
    /// Content pending, within the buffered limit.
    Filling,
    /// Stream exhausted and flushed.
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccumulatorOutput {
    pub chunks: Vec<Chunk>,
    pub word_fallback: bool,
    pub char_fallback: bool,
}

/// A placeable span of the source, with its own token count.
#[derive(Debug, Clone, Copy)]
struct Unit {
    start: usize,
    end: usize,
    tokens: usize,
}

pub struct ChunkAccumulator<'a> {
    source: &'a str,
    counter: &'a dyn TokenCounter,
    options: ChunkOptions,
    splitter: WordSplitter<'a>,
    pending: Vec<Unit>,
    /// Leading pending units copied from the previous chunk.
    seeded: usize,
    chunks: Vec<Chunk>,
    state: AccumulatorState,
    word_fallback: bool,
    char_fallback: bool,
}

impl<'a> ChunkAccumulator<'a> {
    /// `source` is the cleaned text all sentence offsets refer to.
    pub fn new(source: &'a str, counter: &'a dyn TokenCounter, options: ChunkOptions) -> Self {
        Self {
            source,
            counter,
            options,
            splitter: WordSplitter::new(counter, options.split_oversized_words()),
            pending: Vec::new(),
            seeded: 0,
            chunks: Vec::new(),
            state: AccumulatorState::Empty,
            word_fallback: false,
            char_fallback: false,
        }
    }

    pub fn state(&self) -> AccumulatorState {
        self.state
    }

    /// Chunks emitted so far.
    pub fn emitted(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Feed the next sentence. Sentences must arrive in source order.
    pub fn push_sentence(&mut self, sentence: &Sentence<'_>) {
        debug_assert!(self.state != AccumulatorState::Done, "push after finish");
        let tokens = sentence.token_count(self.counter);

        if tokens <= self.options.buffered_limit() {
            self.push_unit(Unit {
                start: sentence.start(),
                end: sentence.end(),
                tokens,
            });
            return;
        }

        debug!(
            tokens,
            limit = self.options.buffered_limit(),
            "oversized sentence, splitting by words"
        );
        self.word_fallback = true;
        self.flush();

        let outcome = self
            .splitter
            .split_to_token_chunks(sentence.text(), self.options.chunk_token_limit());
        self.char_fallback |= outcome.char_fallback;
        for piece in outcome.pieces {
            let start = sentence.start() + piece.start;
            let end = sentence.start() + piece.end;
            let tokens = self.counter.count(&self.source[start..end]);
            self.push_unit(Unit { start, end, tokens });
        }
    }

    /// Flush what remains and return every chunk in order.
    pub fn finish(mut self) -> AccumulatorOutput {
        self.flush();
        self.pending.clear();
        self.seeded = 0;
        self.state = AccumulatorState::Done;
        AccumulatorOutput {
            chunks: self.chunks,
            word_fallback: self.word_fallback,
            char_fallback: self.char_fallback,
        }
    }

    fn push_unit(&mut self, unit: Unit) {
        let buffered = self.options.buffered_limit();

        if unit.tokens > buffered {
            // An indivisible unit: it goes out alone.
            self.flush();
            self.pending.clear();
            self.seeded = 0;
            self.pending.push(unit);
            self.emit(true);
            return;
        }

        if self.has_fresh() {
            if self.tokens_with(unit) <= buffered {
                self.pending.push(unit);
                return;
            }
            self.flush();
        }

        // Only overlap (or nothing) is pending: shed overlap from the left
        // until the new unit fits behind it.
        while self.seeded > 0 && self.tokens_with(unit) > buffered {
            self.pending.remove(0);
            self.seeded -= 1;
        }
        self.pending.push(unit);
        self.state = AccumulatorState::Filling;
    }

    fn has_fresh(&self) -> bool {
        self.pending.len() > self.seeded
    }

    /// Token count of the pending slice extended through `unit`.
    fn tokens_with(&self, unit: Unit) -> usize {
        match self.pending.first() {
            Some(first) => self.counter.count(&self.source[first.start..unit.end]),
            None => unit.tokens,
        }
    }

    /// Emit pending content (if any of it is new) and seed the overlap.
    fn flush(&mut self) {
        if !self.has_fresh() {
            return;
        }
        self.emit(false);
    }

    fn emit(&mut self, oversized: bool) {
        let (Some(first), Some(last)) = (self.pending.first(), self.pending.last()) else {
            return;
        };
        let (start, end) = (first.start, last.end);
        let text = &self.source[start..end];
        let overlap_tokens = match self.seeded {
            0 => 0,
            n => self.counter.count(&self.source[start..self.pending[n - 1].end]),
        };

        let chunk = Chunk {
            chunk_index: self.chunks.len(),
            text: text.to_string(),
            token_count: self.counter.count(text),
            start,
            end,
            overlap_tokens,
            oversized,
        };
        trace!(
            index = chunk.chunk_index,
            tokens = chunk.token_count,
            overlap = overlap_tokens,
            "chunk emitted"
        );
        self.chunks.push(chunk);

        let keep = self.overlap_start();
        self.pending.drain(..keep);
        self.seeded = self.pending.len();
        self.state = if self.pending.is_empty() {
            AccumulatorState::Empty
        } else {
            AccumulatorState::Filling
        };
    }

    /// Index of the first pending unit that belongs to the overlap window:
    /// walk backward while the trailing slice stays within `overlap_tokens`.
    /// The window is a proper suffix, so the next chunk never starts where
    /// this one did.
    fn overlap_start(&self) -> usize {
        let budget = self.options.overlap_tokens();
        let Some(last) = self.pending.last() else {
            return 0;
        };
        if budget == 0 {
            return self.pending.len();
        }

        let mut keep = self.pending.len();
        for (i, unit) in self.pending.iter().enumerate().skip(1).rev() {
            if self.counter.count(&self.source[unit.start..last.end]) > budget {
                break;
            }
            keep = i;
        }
        keep
    }
}
