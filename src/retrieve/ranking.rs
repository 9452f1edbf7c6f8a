//! Keyword-match scoring and ranking of candidate sentences.
//!
//! Every candidate sentence is scanned against the expanded keyword list.
//! Within one sentence each synonym group may contribute at most one
//! match: +2 when the matching keyword is an original extraction, +1 when
//! it is a synonym-expansion addition. Sentences with no matching group
//! are discarded; survivors are ranked by score with document order
//! breaking ties.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::synonyms::ExpandedKeywords;

/// How a candidate's sentence text was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryMethod {
    /// Verbatim document sentence
    #[default]
    Verbatim,
    /// Condensed by the summarization service
    Llm,
    /// Local keyword-window extraction after a summarization failure
    KeywordWindow,
}

impl std::fmt::Display for SummaryMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Verbatim => write!(f, "verbatim"),
            Self::Llm => write!(f, "llm"),
            Self::KeywordWindow => write!(f, "keyword_window"),
        }
    }
}

/// One retrieved sentence proposed as evidence for a claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceCandidate {
    /// Sentence text, post-summarization when applicable
    pub sentence: String,
    /// The sentence as it appeared in the document
    pub original_sentence: String,
    /// Canonical source URL
    pub url: String,
    /// Keywords that matched this sentence, in scan order
    pub matched_keywords: Vec<String>,
    /// Keyword-match score (+2 per original group hit, +1 per expansion)
    pub match_score: i32,
    /// Which summarization path produced `sentence`
    pub summary_method: SummaryMethod,
}

/// Score and rank document sentences against an expanded keyword list.
/// Returns at most `top_k` candidates, highest score first, ties in
/// document order.
pub(crate) fn rank_sentences(
    sentences: Vec<String>,
    url: &str,
    keywords: &ExpandedKeywords,
    top_k: usize,
) -> Vec<EvidenceCandidate> {
    let mut scored: Vec<EvidenceCandidate> = Vec::new();

    for sentence in sentences {
        let mut used_groups: HashSet<_> = HashSet::new();
        let mut matched = Vec::new();
        let mut score = 0i32;

        // Originals first so a group's +2 hit wins over its +1 synonyms.
        for word in &keywords.original {
            if sentence.contains(word.as_str()) && used_groups.insert(keywords.group_of(word)) {
                matched.push(word.clone());
                score += 2;
            }
        }
        for word in &keywords.expansions {
            if sentence.contains(word.as_str()) && used_groups.insert(keywords.group_of(word)) {
                matched.push(word.clone());
                score += 1;
            }
        }

        if used_groups.is_empty() {
            continue;
        }

        scored.push(EvidenceCandidate {
            original_sentence: sentence.clone(),
            sentence,
            url: url.to_string(),
            matched_keywords: matched,
            match_score: score,
            summary_method: SummaryMethod::Verbatim,
        });
    }

    // Stable sort: equal scores keep document order.
    scored.sort_by(|a, b| b.match_score.cmp(&a.match_score));
    scored.truncate(top_k);
    scored
}
