//! Evidence retrieval.
//!
//! Given a primary keyword and the extracted keyword set, fetches an
//! encyclopedia document, expands the keywords through the lexical
//! database, and turns the document into a ranked, optionally summarized
//! list of evidence candidates.

pub mod ranking;
pub mod summarize;
pub mod synonyms;
pub mod wiki;

use std::sync::Arc;
use tokio::time::{timeout, Duration};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::segment::split_sentences;

pub use ranking::{EvidenceCandidate, SummaryMethod};
pub use summarize::{LlmSummarizer, Summarizer};
pub use synonyms::{
    expand_keywords, ExpandedKeywords, HttpSynonymProvider, SynonymConfig, SynonymEntry,
    SynonymGroup, SynonymProvider,
};
pub use wiki::{HttpWikiSource, WikiDocument, WikiSource};

/// Tunables for evidence retrieval.
#[derive(Debug, Clone)]
pub struct RetrieverConfig {
    /// Candidates kept after ranking
    pub top_k: usize,
    /// Minimum character length for a document sentence
    pub min_sentence_chars: usize,
    /// Word count above which a candidate is summarized
    pub summary_word_threshold: usize,
    /// Primary keywords longer than this are replaced by the first
    /// extracted keyword before lookup
    pub max_primary_keyword_chars: usize,
    /// Timeout for the document fetch
    pub fetch_timeout_secs: u64,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            min_sentence_chars: 10,
            summary_word_threshold: 30,
            max_primary_keyword_chars: 20,
            fetch_timeout_secs: 60,
        }
    }
}

/// Retrieves and ranks evidence candidates for one claim sentence.
pub struct EvidenceRetriever {
    wiki: Arc<dyn WikiSource>,
    synonyms: Arc<dyn SynonymProvider>,
    summarizer: Arc<dyn Summarizer>,
    config: RetrieverConfig,
}

impl EvidenceRetriever {
    pub fn new(
        wiki: Arc<dyn WikiSource>,
        synonyms: Arc<dyn SynonymProvider>,
        summarizer: Arc<dyn Summarizer>,
        config: RetrieverConfig,
    ) -> Self {
        Self {
            wiki,
            synonyms,
            summarizer,
            config,
        }
    }

    /// Retrieve ranked evidence candidates. Fails only when both document
    /// retrieval paths are exhausted; every other degradation produces a
    /// (possibly empty) candidate list.
    pub async fn retrieve(
        &self,
        primary_keyword: &str,
        keywords: &[String],
    ) -> Result<Vec<EvidenceCandidate>> {
        let search_keyword = self.search_keyword(primary_keyword, keywords);
        let document = self.fetch_document(search_keyword).await?;

        let expanded = expand_keywords(self.synonyms.as_ref(), keywords).await;
        debug!(
            original = expanded.original.len(),
            added = expanded.expansions.len(),
            "expanded keyword set"
        );

        let sentences: Vec<String> = split_sentences(&document.content)
            .into_iter()
            .filter(|s| s.chars().count() >= self.config.min_sentence_chars)
            .collect();

        let mut candidates =
            ranking::rank_sentences(sentences, &document.url, &expanded, self.config.top_k);

        summarize::summarize_candidates(
            self.summarizer.as_ref(),
            &mut candidates,
            self.config.summary_word_threshold,
        )
        .await;

        info!(
            keyword = search_keyword,
            candidates = candidates.len(),
            "evidence retrieval complete"
        );
        Ok(candidates)
    }

    /// Overlong primary keywords are poor page titles; use the first
    /// extracted keyword instead.
    fn search_keyword<'a>(&self, primary: &'a str, keywords: &'a [String]) -> &'a str {
        if primary.chars().count() > self.config.max_primary_keyword_chars {
            if let Some(first) = keywords.first() {
                debug!(%primary, replacement = %first, "primary keyword too long");
                return first;
            }
        }
        primary
    }

    /// Fetch the reference document: summary endpoint first, full-page
    /// extraction when the summary is missing or empty.
    async fn fetch_document(&self, title: &str) -> Result<WikiDocument> {
        let budget = Duration::from_secs(self.config.fetch_timeout_secs);

        let primary = timeout(budget, self.wiki.fetch_summary(title))
            .await
            .map_err(|_| Error::timeout(budget.as_millis() as u64))
            .and_then(|r| r);

        match primary {
            Ok(doc) if !doc.is_empty() => return Ok(doc),
            Ok(_) => debug!(%title, "summary path returned no content"),
            Err(e) => debug!(%title, error = %e, "summary path failed"),
        }

        let fallback = timeout(budget, self.wiki.fetch_full(title))
            .await
            .map_err(|_| Error::timeout(budget.as_millis() as u64))
            .and_then(|r| r)?;

        if fallback.is_empty() {
            return Err(Error::retrieval(format!(
                "no reference content for '{}'",
                title
            )));
        }

        Ok(fallback)
    }
}
