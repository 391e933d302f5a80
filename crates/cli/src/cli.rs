use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Sentence-aware, token-bounded text chunker.
///
/// Splits text into overlapping chunks that respect sentence boundaries
/// and stay within a token budget.
#[derive(Parser, Debug)]
#[command(name = "smartchunk", version, about = "Sentence-aware token-bounded text chunker")]
pub struct CliArgs {
    /// Config profile; keys are looked up as {PROFILE}_{KEY} first.
    #[arg(long, env = "SMARTCHUNK_PROFILE", global = true)]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Chunk files (or stdin) and print the results as JSON.
    Chunk(ChunkArgs),
    /// Load resources and print service info. Exits non-zero when not ready.
    Info,
}

#[derive(Args, Debug)]
pub struct ChunkArgs {
    /// Input files. Reads stdin when none are given.
    pub files: Vec<PathBuf>,

    /// Maximum tokens per chunk (overrides CHUNK_TOKEN_LIMIT).
    #[arg(long)]
    pub limit: Option<i64>,

    /// Tokens shared between consecutive chunks (overrides CHUNK_OVERLAP_TOKENS).
    #[arg(long)]
    pub overlap: Option<i64>,

    /// Split single words that exceed the limit.
    #[arg(long)]
    pub split_long_words: bool,

    /// Skip HTML cleaning; chunk the input as-is.
    #[arg(long)]
    pub raw: bool,

    /// Pretty-print JSON output.
    #[arg(long)]
    pub pretty: bool,
}
