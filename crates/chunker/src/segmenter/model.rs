//! Abbreviation model used to veto false sentence breaks.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::ChunkError;

/// Lowercased abbreviations without their final period.
///
/// Words that frequently end a sentence on their own ("etc", "no", "a.m",
/// "p.m") are deliberately absent.
const BUILTIN_ABBREVIATIONS: &[&str] = &[
    // titles
    "mr", "mrs", "ms", "dr", "prof", "rev", "hon", "sr", "jr", "st", "gen", "col", "lt", "sgt",
    "capt", "gov", "sen", "rep", "pres",
    // latin / editorial
    "e.g", "i.e", "cf", "vs", "viz", "al", "approx", "ca",
    // organisations
    "inc", "ltd", "co", "corp", "bros", "dept", "univ", "assn",
    // references
    "fig", "figs", "vol", "vols", "pp", "ch", "sec", "eq", "ed", "eds", "art",
    // months
    "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec",
    // places
    "u.s", "u.k", "u.s.a", "e.u", "mt", "ft", "ave", "blvd", "rd",
    // degrees
    "ph.d", "m.d", "b.a", "m.a", "b.sc", "m.sc",
];

/// The loaded sentence-boundary model.
#[derive(Debug, Clone)]
pub struct SegmenterModel {
    abbreviations: HashSet<String>,
}

impl SegmenterModel {
    /// The builtin English abbreviation list.
    pub fn builtin() -> Self {
        Self {
            abbreviations: BUILTIN_ABBREVIATIONS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Builtin list extended with `path` (one abbreviation per line, `#` comments).
    pub fn load(path: Option<&Path>) -> Result<Self, ChunkError> {
        let mut model = Self::builtin();
        let Some(path) = path else {
            return Ok(model);
        };

        let raw = fs::read_to_string(path).map_err(|source| ChunkError::Abbreviations {
            path: path.to_path_buf(),
            source,
        })?;
        for line in raw.lines() {
            let line = line.split('#').next().unwrap_or("").trim();
            if !line.is_empty() {
                model.abbreviations.insert(normalize(line));
            }
        }
        Ok(model)
    }

    pub fn len(&self) -> usize {
        self.abbreviations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abbreviations.is_empty()
    }

    /// Whether `word` (as written, period included) is a known abbreviation
    /// or a single-letter initial.
    pub fn is_abbreviation(&self, word: &str) -> bool {
        let Some(stem) = word.strip_suffix('.') else {
            return false;
        };
        let stem = stem.trim_start_matches(|c: char| !c.is_alphanumeric());
        let mut chars = stem.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return c.is_alphabetic();
        }
        self.abbreviations.contains(&normalize(stem))
    }

    /// Whether the span ends in an abbreviation, i.e. a break right after it
    /// is probably false.
    pub(crate) fn ends_with_abbreviation(&self, span: &str) -> bool {
        span.split_whitespace()
            .next_back()
            .is_some_and(|last| self.is_abbreviation(last))
    }
}

fn normalize(word: &str) -> String {
    word.trim().trim_end_matches('.').to_lowercase()
}
