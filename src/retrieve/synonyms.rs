//! Synonym lookup and keyword expansion.
//!
//! A lexical database maps a normalized word to its related forms
//! (synonyms, broader and narrower terms) and a stable identifier for the
//! word's primary sense. Keywords sharing a group identifier are treated
//! as one keyword by the ranking stage so synonymous matches are not
//! double counted.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};

/// Stable identifier of a word's primary sense. Two keywords belong to
/// the same group iff their identifiers are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SynonymGroup(pub String);

impl SynonymGroup {
    /// Group for a word the lexical database does not know: the word is
    /// its own group.
    pub fn fallback(word: &str) -> Self {
        Self(word.to_string())
    }
}

/// Lookup result for one word.
#[derive(Debug, Clone)]
pub struct SynonymEntry {
    /// Related forms, the queried word excluded
    pub synonyms: Vec<String>,
    pub group: SynonymGroup,
}

/// Lexical database backend.
#[async_trait]
pub trait SynonymProvider: Send + Sync {
    /// Look up related forms and the sense group for a word.
    async fn lookup(&self, word: &str) -> Result<SynonymEntry>;
}

/// Expansion of a keyword list with synonym lookups.
#[derive(Debug, Clone, Default)]
pub struct ExpandedKeywords {
    /// The original keywords, order preserved
    pub original: Vec<String>,
    /// Synonym additions not already present among the originals
    pub expansions: Vec<String>,
    /// Sense group for every keyword, original and added
    pub groups: HashMap<String, SynonymGroup>,
}

impl ExpandedKeywords {
    /// Group of a keyword; unknown words are their own group.
    pub fn group_of(&self, word: &str) -> SynonymGroup {
        self.groups
            .get(word)
            .cloned()
            .unwrap_or_else(|| SynonymGroup::fallback(word))
    }
}

/// Expand a keyword list via synonym lookups. Words without content
/// characters (bare numbers, punctuation) are skipped. A failed lookup
/// leaves the word unexpanded in its own group.
pub async fn expand_keywords(
    provider: &dyn SynonymProvider,
    keywords: &[String],
) -> ExpandedKeywords {
    let mut expanded = ExpandedKeywords {
        original: keywords.to_vec(),
        ..Default::default()
    };

    for word in keywords {
        if !bears_content(word) {
            expanded.groups.insert(word.clone(), SynonymGroup::fallback(word));
            continue;
        }

        match provider.lookup(word).await {
            Ok(entry) => {
                for synonym in entry.synonyms {
                    if synonym == *word
                        || expanded.original.contains(&synonym)
                        || expanded.expansions.contains(&synonym)
                    {
                        continue;
                    }
                    expanded.groups.insert(synonym.clone(), entry.group.clone());
                    expanded.expansions.push(synonym);
                }
                expanded.groups.insert(word.clone(), entry.group);
            }
            Err(e) => {
                debug!(%word, error = %e, "synonym lookup failed, keeping word unexpanded");
                expanded.groups.insert(word.clone(), SynonymGroup::fallback(word));
            }
        }
    }

    expanded
}

/// A word bears content when it has at least one alphabetic or Hangul
/// character.
fn bears_content(word: &str) -> bool {
    word.chars().any(|c| c.is_alphabetic())
}

/// Configuration for the HTTP lexical-database client.
#[derive(Debug, Clone)]
pub struct SynonymConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl SynonymConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: 10,
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP client for a WordNet-style lexical database.
///
/// The cross-lingual alias table is a narrow stand-in for a real
/// Korean-English lookup: a Hangul word with an alias is queried by its
/// English form, in the alias's sense group.
pub struct HttpSynonymProvider {
    config: SynonymConfig,
    http: Client,
    ko_aliases: HashMap<&'static str, &'static str>,
}

// Wire types.
#[derive(Debug, Deserialize)]
struct SynonymResponse {
    #[serde(default)]
    synonyms: Vec<String>,
    #[serde(default)]
    group: Option<String>,
}

impl HttpSynonymProvider {
    const SERVICE: &'static str = "synonyms";

    pub fn new(config: SynonymConfig) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            config,
            http,
            ko_aliases: ko_alias_table(),
        }
    }

    /// Lowercase and strip everything but letters, digits, and spaces.
    fn normalize(word: &str) -> String {
        word.to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric() || c.is_whitespace())
            .collect::<String>()
            .trim()
            .to_string()
    }
}

#[async_trait]
impl SynonymProvider for HttpSynonymProvider {
    async fn lookup(&self, word: &str) -> Result<SynonymEntry> {
        let normalized = Self::normalize(word);
        // Hangul words go through the alias table; the database itself is
        // English-keyed.
        let query = self
            .ko_aliases
            .get(normalized.as_str())
            .map(|alias| alias.to_string())
            .unwrap_or(normalized);

        if query.is_empty() {
            return Ok(SynonymEntry {
                synonyms: Vec::new(),
                group: SynonymGroup::fallback(word),
            });
        }

        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| Error::Config(format!("invalid synonym base url: {}", e)))?;
        url.query_pairs_mut().append_pair("word", &query);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::transport(Self::SERVICE, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::transport(
                Self::SERVICE,
                format!("lookup failed ({})", status),
            ));
        }

        let body: SynonymResponse = response
            .json()
            .await
            .map_err(|e| Error::parse(Self::SERVICE, format!("Failed to parse response: {}", e)))?;

        let group = body
            .group
            .map(SynonymGroup)
            .unwrap_or_else(|| SynonymGroup::fallback(word));

        Ok(SynonymEntry {
            synonyms: body.synonyms.into_iter().filter(|s| s != word).collect(),
            group,
        })
    }
}

/// Placeholder Korean-to-English aliases for historical-domain keywords.
fn ko_alias_table() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("왕", "king"),
        ("왕조", "dynasty"),
        ("건국", "foundation"),
        ("통치", "rule"),
        ("정복", "conquest"),
        ("전쟁", "war"),
        ("평화", "peace"),
        ("정치", "politics"),
        ("정부", "government"),
        ("군주", "monarch"),
        ("제국", "empire"),
        ("왕국", "kingdom"),
        ("통치자", "ruler"),
        ("권력", "power"),
        ("지도자", "leader"),
        ("영웅", "hero"),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TableProvider {
        entries: HashMap<String, SynonymEntry>,
    }

    #[async_trait]
    impl SynonymProvider for TableProvider {
        async fn lookup(&self, word: &str) -> Result<SynonymEntry> {
            self.entries
                .get(word)
                .cloned()
                .ok_or_else(|| Error::transport("synonyms", "not found"))
        }
    }

    fn provider() -> TableProvider {
        let mut entries = HashMap::new();
        entries.insert(
            "왕".to_string(),
            SynonymEntry {
                synonyms: vec!["군주".to_string(), "임금".to_string()],
                group: SynonymGroup("synset_king.n.01".to_string()),
            },
        );
        TableProvider { entries }
    }

    #[tokio::test]
    async fn test_expansion_adds_new_synonyms() {
        let keywords = vec!["왕".to_string(), "군주".to_string()];
        let expanded = expand_keywords(&provider(), &keywords).await;

        // 군주 was already an original keyword, only 임금 is new.
        assert_eq!(expanded.expansions, vec!["임금".to_string()]);
        assert_eq!(
            expanded.group_of("왕"),
            SynonymGroup("synset_king.n.01".to_string())
        );
        assert_eq!(
            expanded.group_of("임금"),
            SynonymGroup("synset_king.n.01".to_string())
        );
    }

    #[tokio::test]
    async fn test_failed_lookup_keeps_word() {
        let keywords = vec!["미상단어".to_string()];
        let expanded = expand_keywords(&provider(), &keywords).await;

        assert!(expanded.expansions.is_empty());
        assert_eq!(expanded.group_of("미상단어"), SynonymGroup::fallback("미상단어"));
    }

    #[tokio::test]
    async fn test_numeric_words_skipped() {
        let keywords = vec!["1397".to_string()];
        let expanded = expand_keywords(&provider(), &keywords).await;
        assert!(expanded.expansions.is_empty());
    }

    #[test]
    fn test_normalize() {
        assert_eq!(HttpSynonymProvider::normalize("King-Sejong!"), "kingsejong");
        assert_eq!(HttpSynonymProvider::normalize("  왕  "), "왕");
    }
}
