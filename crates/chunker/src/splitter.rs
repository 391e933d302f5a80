//! Sub-sentence splitting for sentences that alone exceed the budget.
//!
//! Strategies are tried in order and each either yields pieces or defers:
//!
//! 1. [`Strategy::WordBoundary`]: greedy grouping of whitespace-delimited words.
//! 2. [`Strategy::TokenWindow`]: encode, cut the ids every `limit`, decode.
//! 3. [`Strategy::CharWindow`]: greedy character windows. Never defers.
//!
//! A single word above the limit is an indivisible piece unless
//! `split_oversized_words` is enabled, in which case strategies 2 and 3 apply
//! to that word.

use tracing::{debug, warn};

use crate::tokenizer::TokenCounter;

/// A span produced by the splitter, as byte offsets into the splitter input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub start: usize,
    pub end: usize,
    /// The piece could not be brought under the limit.
    pub oversized: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitOutcome {
    pub pieces: Vec<Piece>,
    /// The character-window strategy was needed somewhere.
    pub char_fallback: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    WordBoundary,
    TokenWindow,
    CharWindow,
}

/// Order in which strategies are tried on a multi-word sentence.
const SENTENCE_STRATEGIES: &[Strategy] = &[
    Strategy::WordBoundary,
    Strategy::TokenWindow,
    Strategy::CharWindow,
];

/// Order in which strategies are tried on a single word above the limit.
const WORD_STRATEGIES: &[Strategy] = &[Strategy::TokenWindow, Strategy::CharWindow];

pub struct WordSplitter<'t> {
    counter: &'t dyn TokenCounter,
    split_oversized_words: bool,
}

impl<'t> WordSplitter<'t> {
    pub fn new(counter: &'t dyn TokenCounter, split_oversized_words: bool) -> Self {
        Self {
            counter,
            split_oversized_words,
        }
    }

    /// Split `text` into ordered pieces of at most `limit` tokens each, apart
    /// from indivisible words. Pieces are trimmed and cover every
    /// non-whitespace character.
    pub fn split_to_token_chunks(&self, text: &str, limit: usize) -> SplitOutcome {
        let mut outcome = SplitOutcome::default();
        let limit = limit.max(1);
        let (start, end) = trimmed_bounds(text);
        if start == end {
            return outcome;
        }
        if self.counter.count(&text[start..end]) <= limit {
            outcome.pieces.push(Piece { start, end, oversized: false });
            return outcome;
        }
        self.run_chain(text, start, end, limit, SENTENCE_STRATEGIES, &mut outcome);
        outcome
    }

    fn run_chain(
        &self,
        text: &str,
        start: usize,
        end: usize,
        limit: usize,
        chain: &[Strategy],
        outcome: &mut SplitOutcome,
    ) {
        for &strategy in chain {
            if matches!(strategy, Strategy::TokenWindow | Strategy::CharWindow)
                && !self.split_oversized_words
            {
                continue;
            }
            if self.apply(strategy, text, start, end, limit, outcome) {
                return;
            }
            debug!(?strategy, len = end - start, "split strategy deferred");
        }

        // Nothing could split it: one indivisible piece.
        outcome.pieces.push(Piece { start, end, oversized: true });
    }

    fn apply(
        &self,
        strategy: Strategy,
        text: &str,
        start: usize,
        end: usize,
        limit: usize,
        outcome: &mut SplitOutcome,
    ) -> bool {
        match strategy {
            Strategy::WordBoundary => self.by_words(text, start, end, limit, outcome),
            Strategy::TokenWindow => match self.by_token_windows(&text[start..end], limit) {
                Some(bounds) => {
                    outcome.pieces.extend(bounds.into_iter().map(|(s, e)| Piece {
                        start: start + s,
                        end: start + e,
                        oversized: false,
                    }));
                    true
                }
                None => false,
            },
            Strategy::CharWindow => {
                warn!(len = end - start, limit, "falling back to character split");
                outcome.char_fallback = true;
                for (s, e) in self.by_char_windows(&text[start..end], limit) {
                    outcome.pieces.push(Piece {
                        start: start + s,
                        end: start + e,
                        oversized: false,
                    });
                }
                true
            }
        }
    }

    /// Greedy word grouping. Defers when there is no word boundary at all.
    fn by_words(
        &self,
        text: &str,
        start: usize,
        end: usize,
        limit: usize,
        outcome: &mut SplitOutcome,
    ) -> bool {
        let words = word_bounds(&text[start..end], start);
        if words.len() < 2 {
            return false;
        }

        let mut group: Option<(usize, usize)> = None;
        for (ws, we) in words {
            if self.counter.count(&text[ws..we]) > limit {
                if let Some((gs, ge)) = group.take() {
                    outcome.pieces.push(Piece { start: gs, end: ge, oversized: false });
                }
                self.run_chain(text, ws, we, limit, WORD_STRATEGIES, outcome);
                continue;
            }
            group = match group {
                Some((gs, _)) if self.counter.count(&text[gs..we]) <= limit => Some((gs, we)),
                Some((gs, ge)) => {
                    outcome.pieces.push(Piece { start: gs, end: ge, oversized: false });
                    Some((ws, we))
                }
                None => Some((ws, we)),
            };
        }
        if let Some((gs, ge)) = group {
            outcome.pieces.push(Piece { start: gs, end: ge, oversized: false });
        }
        true
    }

    /// Windows of `limit` token ids. Defers if any window does not decode to
    /// a character-aligned slice of `word`, or re-encodes above the limit.
    fn by_token_windows(&self, word: &str, limit: usize) -> Option<Vec<(usize, usize)>> {
        let ids = self.counter.encode(word)?;
        let mut bounds = Vec::new();
        let mut offset = 0;
        for window in ids.chunks(limit) {
            let piece = self.counter.decode(window)?;
            let end = offset + piece.len();
            if word.get(offset..end) != Some(piece.as_str()) || self.counter.count(&piece) > limit {
                return None;
            }
            bounds.push((offset, end));
            offset = end;
        }
        (offset == word.len()).then_some(bounds)
    }

    /// Longest character windows that stay within `limit` (at least one
    /// character each, so this always makes progress).
    fn by_char_windows(&self, word: &str, limit: usize) -> Vec<(usize, usize)> {
        let boundaries: Vec<usize> = word
            .char_indices()
            .map(|(i, _)| i)
            .skip(1)
            .chain(std::iter::once(word.len()))
            .collect();

        let mut bounds = Vec::new();
        let mut start = 0;
        let mut first = 0; // index into `boundaries` of the smallest end after `start`
        while start < word.len() {
            // Binary search for the furthest end that still fits.
            let (mut lo, mut hi) = (first, boundaries.len() - 1);
            let mut best = first;
            while lo <= hi {
                let mid = lo + (hi - lo) / 2;
                if self.counter.count(&word[start..boundaries[mid]]) <= limit {
                    best = mid;
                    lo = mid + 1;
                } else if mid == 0 {
                    break;
                } else {
                    hi = mid - 1;
                }
            }
            let end = boundaries[best];
            bounds.push((start, end));
            start = end;
            first = best + 1;
        }
        bounds
    }
}

/// Byte range of `text` without leading/trailing whitespace.
fn trimmed_bounds(text: &str) -> (usize, usize) {
    let start = text.len() - text.trim_start().len();
    let end = text.trim_end().len();
    if start >= end {
        (0, 0)
    } else {
        (start, end)
    }
}

/// Whitespace-delimited words of `text`, offset by `base`.
fn word_bounds(text: &str, base: usize) -> Vec<(usize, usize)> {
    let mut words = Vec::new();
    let mut current: Option<usize> = None;
    for (i, c) in text.char_indices() {
        match (c.is_whitespace(), current) {
            (true, Some(s)) => {
                words.push((base + s, base + i));
                current = None;
            }
            (false, None) => current = Some(i),
            _ => {}
        }
    }
    if let Some(s) = current {
        words.push((base + s, base + text.len()));
    }
    words
}
