use thiserror::Error;

/// Rejected chunking parameters. Raised before any text is processed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("chunk_token_limit must be positive, got {0}")]
    NonPositiveLimit(i64),

    #[error("overlap_tokens must not be negative, got {0}")]
    NegativeOverlap(i64),

    #[error("overlap_tokens ({overlap}) must be smaller than chunk_token_limit ({limit})")]
    OverlapNotBelowLimit { overlap: i64, limit: i64 },

    #[error("unknown tokenizer encoding: {0}")]
    UnknownEncoding(String),
}
