//! Core types for keyword and SVO extraction.

use serde::{Deserialize, Serialize};

/// Language of a sentence under analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    Korean,
    English,
}

impl Language {
    /// Detect the language of `text` from its script distribution:
    /// a majority of Hangul characters means Korean, otherwise English.
    pub fn detect(text: &str) -> Self {
        let mut hangul = 0usize;
        let mut latin = 0usize;
        for c in text.chars() {
            if ('가'..='힣').contains(&c) {
                hangul += 1;
            } else if c.is_ascii_alphabetic() {
                latin += 1;
            }
        }
        if hangul >= latin && hangul > 0 {
            Self::Korean
        } else {
            Self::English
        }
    }

    /// Placeholder used when no subject could be extracted.
    pub fn placeholder_subject(&self) -> &'static str {
        match self {
            Self::Korean => "주어",
            Self::English => "Subject",
        }
    }

    /// Placeholder used when no verb could be extracted.
    pub fn placeholder_verb(&self) -> &'static str {
        match self {
            Self::Korean => "동사",
            Self::English => "Verb",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Korean => write!(f, "ko"),
            Self::English => write!(f, "en"),
        }
    }
}

/// Class of the predicate an SVO triple was built around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PredicateType {
    /// Main verb (VV)
    Verb,
    /// Adjectival predicate (VA)
    Adjective,
    /// Auxiliary verb (VX)
    Auxiliary,
    /// Copula (VCP), including noun-equational sentences
    Copula,
}

impl PredicateType {
    /// Map a morphological tag to a predicate type, when it names one.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "VV" => Some(Self::Verb),
            "VA" => Some(Self::Adjective),
            "VX" => Some(Self::Auxiliary),
            "VCP" | "VCN" => Some(Self::Copula),
            _ => None,
        }
    }
}

impl std::fmt::Display for PredicateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Verb => write!(f, "VV"),
            Self::Adjective => write!(f, "VA"),
            Self::Auxiliary => write!(f, "VX"),
            Self::Copula => write!(f, "VCP"),
        }
    }
}

/// Which strategy produced an [`SvoResult`]. Kept for traceability when
/// several strategies are tried and the first success wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    DependencyParse,
    SemanticRoles,
    Morphology,
    RemoteLlm,
    /// Every strategy failed; the result carries placeholders only
    Fallback,
}

impl std::fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DependencyParse => write!(f, "dependency_parse"),
            Self::SemanticRoles => write!(f, "semantic_roles"),
            Self::Morphology => write!(f, "morphology"),
            Self::RemoteLlm => write!(f, "remote_llm"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// Extracted Subject-Verb-Object structure for one sentence.
///
/// Invariants: `subject` and `verb` are never empty (placeholders are
/// substituted when extraction finds nothing) and `has_object` is true
/// exactly when `object` is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvoResult {
    pub subject: String,
    pub verb: String,
    /// Absent objects are a first-class value, not an error
    pub object: Option<String>,
    pub predicate_type: PredicateType,
    pub has_object: bool,
    pub method: ExtractionMethod,
    /// Diagnostic annotation when extraction fell back to placeholders
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SvoResult {
    /// Build a result, enforcing the placeholder and `has_object`
    /// invariants. Empty subjects/verbs become language-appropriate
    /// placeholders; empty objects become explicit absence.
    pub fn new(
        subject: impl Into<String>,
        verb: impl Into<String>,
        object: Option<String>,
        predicate_type: PredicateType,
        method: ExtractionMethod,
        language: Language,
    ) -> Self {
        let subject = non_empty_or(subject.into(), language.placeholder_subject());
        let verb = non_empty_or(verb.into(), language.placeholder_verb());
        let object = object.filter(|o| !o.trim().is_empty());
        let has_object = object.is_some();

        Self {
            subject,
            verb,
            object,
            predicate_type,
            has_object,
            method,
            error: None,
        }
    }

    /// Placeholder result for when every strategy failed.
    pub fn placeholder(language: Language) -> Self {
        Self {
            subject: language.placeholder_subject().to_string(),
            verb: language.placeholder_verb().to_string(),
            object: None,
            predicate_type: PredicateType::Verb,
            has_object: false,
            method: ExtractionMethod::Fallback,
            error: None,
        }
    }

    /// Attach a diagnostic error annotation.
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }
}

fn non_empty_or(value: String, placeholder: &str) -> String {
    if value.trim().is_empty() {
        placeholder.to_string()
    } else {
        value
    }
}

/// A content-bearing keyword with its part-of-speech tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Keyword {
    pub word: String,
    pub pos: String,
}

impl Keyword {
    pub fn new(word: impl Into<String>, pos: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            pos: pos.into(),
        }
    }
}

/// Ordered set of keywords. Insertion order is order of appearance;
/// duplicate (word, pos) pairs are dropped on insert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordSet {
    entries: Vec<Keyword>,
}

impl KeywordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a keyword; returns false if the (word, pos) pair was
    /// already present.
    pub fn insert(&mut self, keyword: Keyword) -> bool {
        if self.entries.contains(&keyword) {
            return false;
        }
        self.entries.push(keyword);
        true
    }

    /// Keep only the first `n` keywords.
    pub fn truncate(&mut self, n: usize) {
        self.entries.truncate(n);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Keyword> {
        self.entries.iter()
    }

    /// The keyword surface forms, in insertion order.
    pub fn words(&self) -> Vec<String> {
        self.entries.iter().map(|k| k.word.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<Keyword> for KeywordSet {
    fn from_iter<T: IntoIterator<Item = Keyword>>(iter: T) -> Self {
        let mut set = Self::new();
        for k in iter {
            set.insert(k);
        }
        set
    }
}
