//! Vocabulary block parsing: `word = meaning[, meaning...]` lines into pairs

#[cfg(feature = "python")]
use pyo3::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Characters treated as equivalent sense separators
const SENSE_SEPARATORS: [char; 2] = [';', ','];

/// One vocabulary entry with its meanings in input order
#[cfg_attr(feature = "python", pyclass(get_all))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabPair {
    pub word: String,
    pub senses: Vec<String>,
}

impl VocabPair {
    /// Render as `word = sense1, sense2` for the model prompt
    pub fn render(&self) -> String {
        format!("{} = {}", self.word, self.senses.join(", "))
    }
}

#[cfg(feature = "python")]
#[pymethods]
impl VocabPair {
    fn __repr__(&self) -> String {
        format!("VocabPair(word='{}', senses={:?})", self.word, self.senses)
    }
}

/// Parsed pairs plus the 1-based numbers of non-blank lines that were dropped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    pub pairs: Vec<VocabPair>,
    pub skipped_lines: Vec<usize>,
}

/// Parse a single trimmed, non-empty line
fn parse_line(line: &str) -> Option<VocabPair> {
    let (word, meanings) = line.split_once('=')?;
    let word = word.trim();
    if word.is_empty() {
        return None;
    }

    let senses: Vec<String> = meanings
        .trim()
        .split(&SENSE_SEPARATORS[..])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if senses.is_empty() {
        return None;
    }

    Some(VocabPair {
        word: word.to_string(),
        senses,
    })
}

/// Parse a vocabulary block, recording which lines were skipped
pub fn parse_vocab_report(text: &str) -> ParseReport {
    let mut report = ParseReport::default();

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        match parse_line(line) {
            Some(pair) => report.pairs.push(pair),
            None => {
                tracing::debug!(line = idx + 1, "skipping malformed vocabulary line");
                report.skipped_lines.push(idx + 1);
            }
        }
    }

    report
}

/// Parse a vocabulary block; malformed lines are dropped silently
pub fn parse_vocab_block(text: &str) -> Vec<VocabPair> {
    parse_vocab_report(text).pairs
}

/// Uniformly permute the pairs in place
pub fn shuffle_pairs<R: Rng + ?Sized>(pairs: &mut [VocabPair], rng: &mut R) {
    pairs.shuffle(rng);
}

// ============= Python Binding =============

#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(name = "parse_vocab")]
pub fn py_parse_vocab(text: &str) -> Vec<VocabPair> {
    parse_vocab_block(text)
}
