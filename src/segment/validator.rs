//! Sentence quality validation and normalization.
//!
//! Filters sentences unsuitable for analysis (too short, too long,
//! greetings, exclamations, degenerate patterns) and deduplicates
//! near-identical sentences. Rejection rules are checked in a fixed order;
//! the first matching rule wins.

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::splitter::split_sentences;

/// Why a sentence was rejected by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// Empty or whitespace-only
    Empty,
    /// Cleaned text shorter than the minimum length
    TooShort,
    /// Cleaned text longer than the maximum length
    TooLong,
    /// Matches an uninformative-content pattern
    InvalidPattern,
    /// Short greeting phrase
    Greeting,
    /// Short exclamation phrase
    Exclamation,
    /// No content-script characters or excessive special characters
    InvalidStructure,
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::TooShort => write!(f, "too_short"),
            Self::TooLong => write!(f, "too_long"),
            Self::InvalidPattern => write!(f, "invalid_pattern"),
            Self::Greeting => write!(f, "greeting"),
            Self::Exclamation => write!(f, "exclamation"),
            Self::InvalidStructure => write!(f, "invalid_structure"),
        }
    }
}

/// Result of validating a single sentence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationOutcome {
    /// Whether the sentence passed every check
    pub is_valid: bool,
    /// First rejection rule that matched, if any
    pub reason: Option<RejectionReason>,
    /// Trimmed, whitespace-collapsed, punctuation-normalized text
    pub cleaned_text: String,
}

impl ValidationOutcome {
    /// Tag naming the sentence type: "valid", or the rejection reason.
    pub fn sentence_type(&self) -> String {
        match self.reason {
            Some(reason) => reason.to_string(),
            None => "valid".to_string(),
        }
    }
}

/// An invalid sentence with its diagnosis, as reported by [`SentenceValidator::validate_text`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvalidSentence {
    /// The sentence as produced by the splitter
    pub original: String,
    /// Cleaned form at the time of rejection
    pub cleaned: String,
    /// Rejection rule that matched
    pub reason: RejectionReason,
}

/// Aggregate counts for a validated text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    /// valid / total * 100, or 0 when total is 0
    pub valid_rate: f64,
}

/// Result of validating a whole text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextValidation {
    pub valid_sentences: Vec<String>,
    pub invalid_sentences: Vec<InvalidSentence>,
    pub summary: ValidationSummary,
}

/// Sentence quality validator.
///
/// Thresholds and phrase lists are fields so callers can tune them; the
/// defaults follow the analysis domain (Korean claims with occasional
/// English).
pub struct SentenceValidator {
    min_length: usize,
    max_length: usize,
    greeting_max_length: usize,
    exclamation_max_length: usize,
    invalid_patterns: Vec<Regex>,
    greeting_phrases: Vec<&'static str>,
    exclamation_phrases: Vec<&'static str>,
    special_char_regex: Regex,
    hangul_regex: Regex,
}

impl Default for SentenceValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl SentenceValidator {
    pub fn new() -> Self {
        let invalid_patterns = vec![
            // symbols only
            Regex::new(r"^[^\w가-힣]*$").expect("valid pattern"),
            // digits and number punctuation only
            Regex::new(r"^[0-9\s\-\.]+$").expect("valid pattern"),
            // Latin-only content in a non-Latin target domain
            Regex::new(r"^[A-Za-z\s]+$").expect("valid pattern"),
            // Hangul and whitespace with no other supporting content
            Regex::new(r"^[가-힣\s]*$").expect("valid pattern"),
        ];

        Self {
            min_length: 5,
            max_length: 200,
            greeting_max_length: 20,
            exclamation_max_length: 15,
            invalid_patterns,
            greeting_phrases: vec![
                "안녕하세요",
                "안녕하십니까",
                "반갑습니다",
                "고맙습니다",
                "감사합니다",
                "죄송합니다",
                "미안합니다",
                "좋은 하루",
                "좋은 밤",
                "잘 가세요",
                "안녕히 가세요",
                "안녕히 계세요",
            ],
            exclamation_phrases: vec![
                "정말 좋네요",
                "정말 예쁘네요",
                "정말 멋지네요",
                "너무 좋아요",
                "너무 예뻐요",
                "너무 멋져요",
                "와!",
                "우와!",
                "대박!",
                "짱!",
            ],
            special_char_regex: Regex::new(r"[^\w가-힣\s]").expect("valid pattern"),
            hangul_regex: Regex::new(r"[가-힣]").expect("valid pattern"),
        }
    }

    /// Override the minimum cleaned length.
    pub fn with_min_length(mut self, len: usize) -> Self {
        self.min_length = len;
        self
    }

    /// Override the maximum cleaned length.
    pub fn with_max_length(mut self, len: usize) -> Self {
        self.max_length = len;
        self
    }

    /// Validate a single sentence. Rules are checked in order; the first
    /// match determines the outcome.
    pub fn validate(&self, sentence: &str) -> ValidationOutcome {
        if sentence.trim().is_empty() {
            return ValidationOutcome {
                is_valid: false,
                reason: Some(RejectionReason::Empty),
                cleaned_text: String::new(),
            };
        }

        let cleaned = self.clean(sentence);
        let char_len = cleaned.chars().count();

        if char_len < self.min_length {
            return self.rejected(RejectionReason::TooShort, cleaned);
        }
        if char_len > self.max_length {
            return self.rejected(RejectionReason::TooLong, cleaned);
        }

        if self.invalid_patterns.iter().any(|p| p.is_match(&cleaned)) {
            return self.rejected(RejectionReason::InvalidPattern, cleaned);
        }

        if char_len < self.greeting_max_length
            && self.greeting_phrases.iter().any(|p| cleaned.contains(p))
        {
            return self.rejected(RejectionReason::Greeting, cleaned);
        }

        if char_len < self.exclamation_max_length
            && self.exclamation_phrases.iter().any(|p| cleaned.contains(p))
        {
            return self.rejected(RejectionReason::Exclamation, cleaned);
        }

        if !self.has_valid_structure(&cleaned) {
            return self.rejected(RejectionReason::InvalidStructure, cleaned);
        }

        ValidationOutcome {
            is_valid: true,
            reason: None,
            cleaned_text: cleaned,
        }
    }

    /// Split `text` into sentences and validate each one.
    pub fn validate_text(&self, text: &str) -> TextValidation {
        let sentences = split_sentences(text);
        let total = sentences.len();

        let mut valid_sentences = Vec::new();
        let mut invalid_sentences = Vec::new();

        for sentence in sentences {
            let outcome = self.validate(&sentence);
            if outcome.is_valid {
                valid_sentences.push(outcome.cleaned_text);
            } else {
                invalid_sentences.push(InvalidSentence {
                    original: sentence,
                    cleaned: outcome.cleaned_text,
                    reason: outcome.reason.unwrap_or(RejectionReason::InvalidStructure),
                });
            }
        }

        let valid = valid_sentences.len();
        let summary = ValidationSummary {
            total,
            valid,
            invalid: total - valid,
            valid_rate: if total > 0 {
                valid as f64 / total as f64 * 100.0
            } else {
                0.0
            },
        };

        TextValidation {
            valid_sentences,
            invalid_sentences,
            summary,
        }
    }

    /// Remove sentences whose normalized form has already been seen.
    /// First occurrence wins; order is preserved.
    pub fn remove_duplicates(&self, sentences: &[String]) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut unique = Vec::new();

        for sentence in sentences {
            let normalized = self.normalize_for_comparison(sentence);
            if seen.insert(normalized) {
                unique.push(sentence.clone());
            }
        }

        unique
    }

    fn rejected(&self, reason: RejectionReason, cleaned: String) -> ValidationOutcome {
        ValidationOutcome {
            is_valid: false,
            reason: Some(reason),
            cleaned_text: cleaned,
        }
    }

    /// Trim, collapse whitespace runs, normalize full-width terminators.
    fn clean(&self, sentence: &str) -> String {
        let mut cleaned = String::with_capacity(sentence.len());
        let mut last_was_space = true;

        for c in sentence.trim().chars() {
            let c = match c {
                '。' | '．' => '.',
                '！' => '!',
                '？' => '?',
                other => other,
            };
            if c.is_whitespace() {
                if !last_was_space {
                    cleaned.push(' ');
                    last_was_space = true;
                }
            } else {
                cleaned.push(c);
                last_was_space = false;
            }
        }

        cleaned.trim_end().to_string()
    }

    fn has_valid_structure(&self, cleaned: &str) -> bool {
        if !self.hangul_regex.is_match(cleaned) {
            return false;
        }

        let total = cleaned.chars().count();
        if total == 0 {
            return false;
        }
        let special = self.special_char_regex.find_iter(cleaned).count();
        special as f64 / total as f64 <= 0.5
    }

    fn normalize_for_comparison(&self, sentence: &str) -> String {
        let lowered = sentence.to_lowercase();
        let mut normalized = String::with_capacity(lowered.len());
        let mut last_was_space = true;

        for c in lowered.chars() {
            if matches!(c, '.' | '!' | '?' | '。' | '！' | '？' | ',' | '，' | '．') {
                continue;
            }
            if c.is_whitespace() {
                if !last_was_space {
                    normalized.push(' ');
                    last_was_space = true;
                }
            } else {
                normalized.push(c);
                last_was_space = false;
            }
        }

        normalized.trim_end().to_string()
    }
}
