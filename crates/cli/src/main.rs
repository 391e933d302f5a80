//! smartchunk: command-line front end for the chunking service.
//!
//! `chunk` reads files (in parallel) or stdin and prints one JSON result per
//! input; `info` warms the shared resources and reports readiness.

mod cli;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{error, info};

use smartchunk_chunker::{
    ChunkOptions, ChunkerResources, ChunkingResult, ChunkingService, PassthroughCleaner, ServiceInfo,
};
use smartchunk_core::config::{load_dotenv, Config};

use crate::cli::{ChunkArgs, CliArgs, Command};

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    load_dotenv();
    let args = CliArgs::parse();

    let config = match args.profile.as_deref() {
        Some(profile) => Config::for_profile(profile),
        None => Config::from_env(),
    };
    config.log_summary();
    let resources = ChunkerResources::init_global(&config);

    match args.command {
        Command::Chunk(chunk_args) => {
            run_chunk(&config, resources, &chunk_args)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Info => run_info(&config, resources),
    }
}

// ── chunk ───────────────────────────────────────────────────────────

/// One file's result, tagged with where it came from.
#[derive(Debug, Serialize)]
struct FileResult {
    source: String,
    #[serde(flatten)]
    result: ChunkingResult,
}

/// Command-line flags take precedence over config values.
fn resolve_options(config: &Config, args: &ChunkArgs) -> Result<ChunkOptions> {
    let limit = args.limit.unwrap_or(config.chunking.chunk_token_limit);
    let overlap = args.overlap.unwrap_or(config.chunking.overlap_tokens);
    let options = ChunkOptions::new(limit, overlap)
        .with_context(|| format!("invalid chunking options (limit={limit}, overlap={overlap})"))?;
    Ok(options.with_split_oversized_words(
        args.split_long_words || config.chunking.split_oversized_words,
    ))
}

fn build_service(resources: Arc<ChunkerResources>, raw: bool) -> ChunkingService {
    let service = ChunkingService::new(resources);
    if raw {
        service.with_cleaner(PassthroughCleaner)
    } else {
        service
    }
}

fn chunk_file(service: &ChunkingService, path: &Path, options: &ChunkOptions) -> Result<FileResult> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let result = service
        .chunk_with(&text, options)
        .with_context(|| format!("failed to chunk {}", path.display()))?;
    Ok(FileResult {
        source: path.display().to_string(),
        result,
    })
}

fn chunk_files(
    service: &ChunkingService,
    files: &[PathBuf],
    options: &ChunkOptions,
) -> Result<Vec<FileResult>> {
    files
        .par_iter()
        .map(|path| chunk_file(service, path, options))
        .collect()
}

fn write_json<T: Serialize>(out: &mut impl Write, value: &T, pretty: bool) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, value)?;
    } else {
        serde_json::to_writer(&mut *out, value)?;
    }
    writeln!(out)?;
    Ok(())
}

fn run_chunk(config: &Config, resources: Arc<ChunkerResources>, args: &ChunkArgs) -> Result<()> {
    let options = resolve_options(config, args)?;
    let service = build_service(resources, args.raw);
    let mut stdout = io::stdout().lock();

    if args.files.is_empty() {
        let text = io::read_to_string(io::stdin()).context("failed to read stdin")?;
        let result = service.chunk_with(&text, &options)?;
        info!(chunks = result.total_chunks, "stdin chunked");
        return write_json(&mut stdout, &result, args.pretty);
    }

    let results = chunk_files(&service, &args.files, &options)?;
    info!(files = results.len(), "files chunked");
    for file in &results {
        write_json(&mut stdout, file, args.pretty)?;
    }
    Ok(())
}

// ── info ────────────────────────────────────────────────────────────

/// Service info plus the effective configuration.
#[derive(Debug, Serialize)]
struct InfoReport {
    #[serde(flatten)]
    info: ServiceInfo,
    config: serde_json::Value,
}

fn info_report(config: &Config, resources: Arc<ChunkerResources>) -> InfoReport {
    if let Err(e) = resources.warm_up() {
        error!(error = %e, "resources failed to load");
    }
    InfoReport {
        info: ChunkingService::new(resources).info(),
        config: config.redacted_summary(),
    }
}

fn run_info(config: &Config, resources: Arc<ChunkerResources>) -> Result<ExitCode> {
    let report = info_report(config, resources);
    write_json(&mut io::stdout().lock(), &report, true)?;

    Ok(if report.info.ready {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(limit: Option<i64>, overlap: Option<i64>) -> ChunkArgs {
        ChunkArgs {
            files: Vec::new(),
            limit,
            overlap,
            split_long_words: false,
            raw: false,
            pretty: false,
        }
    }

    fn config(limit: i64, overlap: i64) -> Config {
        let mut config = Config::for_profile("");
        config.chunking.chunk_token_limit = limit;
        config.chunking.overlap_tokens = overlap;
        config.chunking.split_oversized_words = false;
        config
    }

    #[test]
    fn flags_override_config() {
        let options = resolve_options(&config(100, 20), &args(Some(50), Some(5))).unwrap();
        assert_eq!(options.chunk_token_limit(), 50);
        assert_eq!(options.overlap_tokens(), 5);
    }

    #[test]
    fn config_fills_missing_flags() {
        let options = resolve_options(&config(64, 8), &args(None, None)).unwrap();
        assert_eq!(options.chunk_token_limit(), 64);
        assert_eq!(options.overlap_tokens(), 8);
        assert!(!options.split_oversized_words());
    }

    #[test]
    fn invalid_combination_is_reported() {
        let err = resolve_options(&config(100, 20), &args(Some(10), None)).unwrap_err();
        assert!(format!("{err:#}").contains("limit=10, overlap=20"));
    }

    #[test]
    fn split_flag_enables_word_splitting() {
        let mut a = args(None, None);
        a.split_long_words = true;
        let options = resolve_options(&config(100, 20), &a).unwrap();
        assert!(options.split_oversized_words());
    }

    #[test]
    fn files_are_chunked_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.txt");
        let second = dir.path().join("b.html");
        std::fs::write(&first, "First file. It has two sentences.").unwrap();
        std::fs::write(&second, "<p>Second &amp; last.</p>").unwrap();

        let service = build_service(Arc::new(ChunkerResources::default()), false);
        let options = ChunkOptions::default();
        let results = chunk_files(&service, &[first.clone(), second], &options).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].source, first.display().to_string());
        assert_eq!(results[0].result.texts(), vec!["First file. It has two sentences."]);
        assert_eq!(results[1].result.texts(), vec!["Second & last."]);
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.txt");
        let service = build_service(Arc::new(ChunkerResources::default()), true);
        let err = chunk_files(&service, &[missing], &ChunkOptions::default()).unwrap_err();
        assert!(format!("{err:#}").contains("nope.txt"));
    }

    #[test]
    fn json_output_flattens_result() {
        let service = build_service(Arc::new(ChunkerResources::default()), true);
        let result = service.chunk("Just one.", 100, 20).unwrap();
        let file = FileResult {
            source: "stdin".into(),
            result,
        };
        let mut buf = Vec::new();
        write_json(&mut buf, &file, false).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["source"], "stdin");
        assert_eq!(value["total_chunks"], 1);
        assert_eq!(value["chunks"][0]["text"], "Just one.");
    }

    #[test]
    fn info_report_includes_config() {
        let report = info_report(&config(64, 8), Arc::new(ChunkerResources::default()));
        assert!(report.info.ready);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["service"], "SmartChunker");
        assert_eq!(value["ready"], true);
        assert_eq!(value["config"]["chunking"]["chunk_token_limit"], 64);
        assert_eq!(value["config"]["chunking"]["overlap_tokens"], 8);
    }
}
