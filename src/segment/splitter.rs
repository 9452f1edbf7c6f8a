//! Sentence boundary detection.
//!
//! Splits a raw text blob into ordered sentences. The boundary rule is
//! heuristic: a sentence-terminal punctuation mark, optionally followed by
//! closing quotes or brackets, ends a sentence even when no whitespace
//! follows it. Abbreviations and decimal points are not special-cased.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::scoring::ScoredCandidate;

/// Terminator run: `.`/`!`/`?` (ASCII or full-width) plus trailing closing
/// quotes/brackets. A boundary falls immediately after the run.
fn boundary_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"[.!?。！？]["'”’»)\]]*"#).expect("valid boundary regex"))
}

/// Split text into sentences, keeping each sentence's terminator attached.
///
/// Empty and whitespace-only segments are dropped. The function is pure:
/// the same input always yields the same sequence.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut start = 0;

    for m in boundary_regex().find_iter(text) {
        let end = m.end();
        let segment = text[start..end].trim();
        if !segment.is_empty() {
            parts.push(segment.to_string());
        }
        start = end;
    }

    let last = text[start..].trim();
    if !last.is_empty() {
        parts.push(last.to_string());
    }

    parts
}

/// One sentence in the canonical intermediate representation.
///
/// `hallucination` and `source_candidates` are created empty and filled in
/// by the downstream scoring stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentenceRecord {
    /// 1-based sentence number
    pub sentence_id: u32,
    /// Sentence text
    pub text: String,
    /// Hallucination flag, populated after verdict combination
    pub hallucination: Option<bool>,
    /// Ranked evidence candidates, populated after scoring
    pub source_candidates: Vec<ScoredCandidate>,
}

impl SentenceRecord {
    pub fn new(sentence_id: u32, text: impl Into<String>) -> Self {
        Self {
            sentence_id,
            text: text.into(),
            hallucination: None,
            source_candidates: Vec::new(),
        }
    }
}

/// Structured view of an answer: the original text plus one record per
/// sentence. This is the representation passed between pipeline stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredAnswer {
    /// The unmodified input text
    pub original_answer: String,
    /// Ordered sentence records with 1-based ids
    pub sentences: Vec<SentenceRecord>,
}

/// Split `text` and wrap each sentence in a [`SentenceRecord`].
pub fn to_structured(text: &str) -> StructuredAnswer {
    let sentences = split_sentences(text)
        .into_iter()
        .enumerate()
        .map(|(i, s)| SentenceRecord::new(i as u32 + 1, s))
        .collect();

    StructuredAnswer {
        original_answer: text.to_string(),
        sentences,
    }
}
