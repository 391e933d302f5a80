use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::chunk::{ChunkOptions, DEFAULT_CHUNK_TOKEN_LIMIT, DEFAULT_OVERLAP_TOKENS};
use crate::error::ConfigurationError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_i64(profile: &str, key: &str, default: i64) -> i64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    match profiled_env_opt(profile, key) {
        Some(v) => matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        None => default,
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub chunking: ChunkingConfig,
    pub tokenizer: TokenizerConfig,
    pub segmenter: SegmenterConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `SMARTCHUNK_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("SMARTCHUNK_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            chunking: ChunkingConfig::from_env_profiled(p),
            tokenizer: TokenizerConfig::from_env_profiled(p),
            segmenter: SegmenterConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  chunking:   limit={}, overlap={}, split_long_words={}",
            self.chunking.chunk_token_limit,
            self.chunking.overlap_tokens,
            self.chunking.split_oversized_words
        );
        tracing::info!("  tokenizer:  encoding={}", self.tokenizer.encoding);
        tracing::info!(
            "  segmenter:  abbreviations={}",
            self.segmenter
                .abbreviations_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(builtin)".to_string())
        );
    }

    /// Return a JSON view for status output.
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "chunking": {
                "chunk_token_limit": self.chunking.chunk_token_limit,
                "overlap_tokens": self.chunking.overlap_tokens,
                "split_oversized_words": self.chunking.split_oversized_words,
            },
            "tokenizer": { "encoding": self.tokenizer.encoding.to_string() },
            "segmenter": { "abbreviations_path": self.segmenter.abbreviations_path },
        })
    }
}

// ── Chunking ──────────────────────────────────────────────────

/// Raw chunking defaults. Values stay signed so that a bad env value is
/// rejected by [`ChunkingConfig::options`] rather than silently clamped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub chunk_token_limit: i64,
    pub overlap_tokens: i64,
    pub split_oversized_words: bool,
}

impl ChunkingConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            chunk_token_limit: profiled_env_i64(p, "CHUNK_TOKEN_LIMIT", DEFAULT_CHUNK_TOKEN_LIMIT as i64),
            overlap_tokens: profiled_env_i64(p, "CHUNK_OVERLAP_TOKENS", DEFAULT_OVERLAP_TOKENS as i64),
            split_oversized_words: profiled_env_bool(p, "CHUNK_SPLIT_LONG_WORDS", false),
        }
    }

    /// Validate into call options.
    pub fn options(&self) -> Result<ChunkOptions, ConfigurationError> {
        Ok(ChunkOptions::new(self.chunk_token_limit, self.overlap_tokens)?
            .with_split_oversized_words(self.split_oversized_words))
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_token_limit: DEFAULT_CHUNK_TOKEN_LIMIT as i64,
            overlap_tokens: DEFAULT_OVERLAP_TOKENS as i64,
            split_oversized_words: false,
        }
    }
}

// ── Tokenizer ─────────────────────────────────────────────────

/// BPE vocabularies the tokenizer can load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// GPT-3.5-turbo / GPT-4 compatible.
    #[default]
    Cl100kBase,
    O200kBase,
    P50kBase,
    R50kBase,
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Cl100kBase => write!(f, "cl100k_base"),
            Encoding::O200kBase => write!(f, "o200k_base"),
            Encoding::P50kBase => write!(f, "p50k_base"),
            Encoding::R50kBase => write!(f, "r50k_base"),
        }
    }
}

impl FromStr for Encoding {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cl100k_base" | "cl100k" => Ok(Encoding::Cl100kBase),
            "o200k_base" | "o200k" => Ok(Encoding::O200kBase),
            "p50k_base" | "p50k" => Ok(Encoding::P50kBase),
            "r50k_base" | "r50k" | "gpt2" => Ok(Encoding::R50kBase),
            other => Err(ConfigurationError::UnknownEncoding(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenizerConfig {
    pub encoding: Encoding,
}

impl TokenizerConfig {
    fn from_env_profiled(p: &str) -> Self {
        let raw = profiled_env_or(p, "TOKENIZER_ENCODING", "cl100k_base");
        let encoding = raw.parse().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to cl100k_base");
            Encoding::Cl100kBase
        });
        Self { encoding }
    }
}

// ── Segmenter ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SegmenterConfig {
    /// Extra abbreviations, one per line, merged into the builtin list.
    pub abbreviations_path: Option<PathBuf>,
}

impl SegmenterConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            abbreviations_path: profiled_env_opt(p, "SEGMENTER_ABBREVIATIONS_PATH").map(PathBuf::from),
        }
    }
}
