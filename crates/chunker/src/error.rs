use std::path::PathBuf;

use smartchunk_core::ConfigurationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChunkError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("tokenizer vocabulary {encoding} could not be loaded: {reason}")]
    TokenizerUnavailable { encoding: String, reason: String },

    #[error("failed to encode text: {0}")]
    Encode(String),

    #[error("token ids do not decode to valid text: {0}")]
    Decode(String),

    #[error("failed to read abbreviations from {path}: {source}")]
    Abbreviations {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
