//! BPE token counting over a fixed tiktoken vocabulary.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use smartchunk_core::config::Encoding;
use tiktoken_rs::CoreBPE;
use tracing::{debug, warn};

use crate::error::ChunkError;

/// A single vocabulary entry id.
pub type TokenId = u32;

/// The seam the accumulator and splitter measure text through.
///
/// `encode`/`decode` are optional: a counter that cannot round-trip ids
/// returns `None`, and callers skip strategies that need them.
pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> usize;

    fn encode(&self, _text: &str) -> Option<Vec<TokenId>> {
        None
    }

    fn decode(&self, _ids: &[TokenId]) -> Option<String> {
        None
    }
}

/// Tokenizer backed by a loaded BPE table. Cheap to clone.
#[derive(Clone)]
pub struct Tokenizer {
    bpe: Arc<CoreBPE>,
    encoding: Encoding,
}

impl fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tokenizer")
            .field("encoding", &self.encoding)
            .finish_non_exhaustive()
    }
}

impl Tokenizer {
    /// Build the BPE table for `encoding`. This is the expensive one-time step;
    /// share the result through [`crate::ChunkerResources`].
    pub fn load(encoding: Encoding) -> Result<Self, ChunkError> {
        let bpe = match encoding {
            Encoding::Cl100kBase => tiktoken_rs::cl100k_base(),
            Encoding::O200kBase => tiktoken_rs::o200k_base(),
            Encoding::P50kBase => tiktoken_rs::p50k_base(),
            Encoding::R50kBase => tiktoken_rs::r50k_base(),
        }
        .map_err(|e| ChunkError::TokenizerUnavailable {
            encoding: encoding.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            bpe: Arc::new(bpe),
            encoding,
        })
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Encode as ordinary text; special-token markers are not interpreted.
    pub fn try_encode(&self, text: &str) -> Result<Vec<TokenId>, ChunkError> {
        // The pretokenizer regex can give up on pathological input; keep that
        // from tearing down the whole call.
        panic::catch_unwind(AssertUnwindSafe(|| self.bpe.encode_ordinary(text)))
            .map_err(|_| ChunkError::Encode(format!("{} bytes rejected by pretokenizer", text.len())))
    }

    pub fn try_decode(&self, ids: &[TokenId]) -> Result<String, ChunkError> {
        self.bpe
            .decode(ids.to_vec())
            .map_err(|e| ChunkError::Decode(e.to_string()))
    }

    /// Token count of `text`.
    ///
    /// If encoding fails the span is treated as one indivisible unit and
    /// measured by its byte length, an upper bound for byte-level BPE.
    pub fn count(&self, text: &str) -> usize {
        match self.try_encode(text) {
            Ok(ids) => ids.len(),
            Err(e) => {
                warn!(error = %e, "token count degraded to byte length");
                text.len()
            }
        }
    }
}

impl TokenCounter for Tokenizer {
    fn count(&self, text: &str) -> usize {
        Tokenizer::count(self, text)
    }

    fn encode(&self, text: &str) -> Option<Vec<TokenId>> {
        self.try_encode(text).ok()
    }

    fn decode(&self, ids: &[TokenId]) -> Option<String> {
        match self.try_decode(ids) {
            Ok(s) => Some(s),
            Err(e) => {
                debug!(error = %e, ids = ids.len(), "decode failed");
                None
            }
        }
    }
}
