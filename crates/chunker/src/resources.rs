//! Process-wide, read-only chunking resources.
//!
//! The BPE table and the segmenter model are each built at most once, under a
//! single-flight lock, and shared by every chunking call afterwards.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::Instant;

use smartchunk_core::config::{Config, Encoding};
use tracing::{info, warn};

use crate::error::ChunkError;
use crate::segmenter::{SegmenterModel, SentenceSegmenter};
use crate::tokenizer::Tokenizer;

static GLOBAL: OnceLock<Arc<ChunkerResources>> = OnceLock::new();

#[derive(Debug)]
pub struct ChunkerResources {
    encoding: Encoding,
    abbreviations_path: Option<PathBuf>,
    tokenizer: OnceLock<Tokenizer>,
    segmenter: OnceLock<SentenceSegmenter>,
    init_lock: Mutex<()>,
}

impl ChunkerResources {
    /// Unloaded resources; nothing is read until first use or [`warm_up`](Self::warm_up).
    pub fn new(encoding: Encoding, abbreviations_path: Option<PathBuf>) -> Self {
        Self {
            encoding,
            abbreviations_path,
            tokenizer: OnceLock::new(),
            segmenter: OnceLock::new(),
            init_lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.tokenizer.encoding,
            config.segmenter.abbreviations_path.clone(),
        )
    }

    /// The shared instance, configured from the environment on first access.
    pub fn global() -> Arc<Self> {
        GLOBAL
            .get_or_init(|| Arc::new(Self::from_config(&Config::from_env())))
            .clone()
    }

    /// Install `config` as the shared instance's configuration. The first
    /// caller wins; later calls return the existing instance unchanged.
    pub fn init_global(config: &Config) -> Arc<Self> {
        GLOBAL
            .get_or_init(|| Arc::new(Self::from_config(config)))
            .clone()
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// The loaded tokenizer. A load failure is returned to the caller and
    /// nothing is cached, so the calling layer may retry.
    pub fn tokenizer(&self) -> Result<&Tokenizer, ChunkError> {
        if let Some(tokenizer) = self.tokenizer.get() {
            return Ok(tokenizer);
        }
        let _guard = self.init_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(tokenizer) = self.tokenizer.get() {
            return Ok(tokenizer);
        }

        let started = Instant::now();
        let tokenizer = Tokenizer::load(self.encoding)?;
        info!(
            encoding = %self.encoding,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "tokenizer vocabulary loaded"
        );
        Ok(self.tokenizer.get_or_init(|| tokenizer))
    }

    /// The sentence segmenter. Never fails: if the model cannot be loaded the
    /// rule-based segmenter is installed instead.
    pub fn segmenter(&self) -> &SentenceSegmenter {
        if let Some(segmenter) = self.segmenter.get() {
            return segmenter;
        }
        let _guard = self.init_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(segmenter) = self.segmenter.get() {
            return segmenter;
        }

        let segmenter = match SegmenterModel::load(self.abbreviations_path.as_deref()) {
            Ok(model) => {
                info!(abbreviations = model.len(), "sentence model loaded");
                SentenceSegmenter::with_model(Arc::new(model))
            }
            Err(e) => {
                warn!(error = %e, "sentence model unavailable, using rule-based segmenter");
                SentenceSegmenter::rule_based()
            }
        };
        self.segmenter.get_or_init(|| segmenter)
    }

    /// The segmenter if it has been initialized; never triggers a load.
    pub fn loaded_segmenter(&self) -> Option<&SentenceSegmenter> {
        self.segmenter.get()
    }

    /// Load everything now (e.g. at process start).
    pub fn warm_up(&self) -> Result<(), ChunkError> {
        self.tokenizer()?;
        self.segmenter();
        Ok(())
    }

    /// Whether both the tokenizer and the segmenter are initialized.
    pub fn is_ready(&self) -> bool {
        self.tokenizer.get().is_some() && self.segmenter.get().is_some()
    }
}

impl Default for ChunkerResources {
    fn default() -> Self {
        Self::new(Encoding::default(), None)
    }
}
