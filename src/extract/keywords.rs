//! Content-keyword extraction.
//!
//! Filters closed-class tokens out of an annotated sentence, keeping
//! content-bearing words with their part-of-speech tags in order of
//! appearance. The result is truncated to the whitespace word count of
//! the cleaned sentence.

use super::annotator::Annotation;
use super::types::{Keyword, KeywordSet, Language};

/// Korean morphological tags that never carry content: case particles,
/// verbal endings, derivational suffixes, symbols, and unanalyzed forms.
const EXCLUDED_TAGS_KO: &[&str] = &[
    "JKS", "JKC", "JKG", "JKO", "JKB", "JKV", "JKQ", "JX", "JC", // particles
    "EP", "EF", "EC", "ETN", "ETM", // endings
    "XSN", "XSV", "XSA", "XSM", // suffixes
    "SF", "SP", "SS", "SE", "SO", "SW", // symbols
    "UN", "UV", "UE", // unanalyzed
];

/// English coarse tags for closed-class words.
const EXCLUDED_POS_EN: &[&str] = &["DET", "CCONJ", "SCONJ", "AUX", "PART", "PUNCT", "SPACE"];

/// Common English stop words not already caught by part-of-speech.
const STOP_WORDS_EN: &[&str] = &[
    "i", "you", "he", "she", "it", "we", "they", "this", "that", "these", "those", "there",
    "here", "what", "which", "who", "whom", "not", "no", "so", "very", "just", "also", "then",
    "than", "too", "of", "in", "on", "at", "by", "for", "with", "about", "as", "into", "from",
    "up", "down", "out", "over", "under",
];

/// Strip characters other than word characters, whitespace, and the four
/// sentence punctuation marks, then collapse whitespace runs.
pub(crate) fn clean_text(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    let mut last_was_space = true;

    for c in text.chars() {
        let keep = c.is_alphanumeric() || c == '_' || matches!(c, '.' | ',' | '?' | '!');
        if keep {
            cleaned.push(c);
            last_was_space = false;
        } else if c.is_whitespace() && !last_was_space {
            cleaned.push(' ');
            last_was_space = true;
        }
    }

    cleaned.trim_end().to_string()
}

/// Extract content keywords from an annotated sentence.
pub(crate) fn extract_keywords(
    annotation: &Annotation,
    sentence: &str,
    language: Language,
) -> KeywordSet {
    let cleaned = clean_text(sentence);
    let word_count = cleaned.split_whitespace().count();

    let mut keywords: KeywordSet = match language {
        Language::Korean => annotation
            .morphemes
            .iter()
            .filter(|m| !m.lemma.is_empty() && !EXCLUDED_TAGS_KO.contains(&m.tag.as_str()))
            .map(|m| Keyword::new(&m.lemma, &m.tag))
            .collect(),
        Language::English => annotation
            .tokens
            .iter()
            .filter(|t| {
                !t.text.is_empty()
                    && !EXCLUDED_POS_EN.contains(&t.pos.as_str())
                    && !STOP_WORDS_EN.contains(&t.text.to_lowercase().as_str())
            })
            .map(|t| Keyword::new(&t.text, &t.pos))
            .collect(),
    };

    keywords.truncate(word_count);
    keywords
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::annotator::{Morpheme, Token};

    fn morpheme(lemma: &str, tag: &str) -> Morpheme {
        Morpheme {
            lemma: lemma.to_string(),
            tag: tag.to_string(),
            position: 0,
        }
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("세종대왕은   1392년에 (조선을) 건국했다."), "세종대왕은 1392년에 조선을 건국했다.");
    }

    #[test]
    fn test_korean_particles_excluded() {
        let annotation = Annotation {
            morphemes: vec![
                morpheme("세종대왕", "NNP"),
                morpheme("은", "JX"),
                morpheme("1392", "SN"),
                morpheme("년", "NNB"),
                morpheme("에", "JKB"),
                morpheme("조선", "NNP"),
                morpheme("을", "JKO"),
                morpheme("건국", "NNG"),
                morpheme("하", "XSV"),
                morpheme("었", "EP"),
                morpheme("다", "EF"),
            ],
            ..Default::default()
        };

        let keywords = extract_keywords(&annotation, "세종대왕은 1392년에 조선을 건국했다.", Language::Korean);
        let words = keywords.words();

        assert!(words.contains(&"세종대왕".to_string()));
        assert!(words.contains(&"조선".to_string()));
        assert!(words.contains(&"건국".to_string()));
        assert!(!words.contains(&"은".to_string()));
        assert!(!words.contains(&"을".to_string()));
    }

    #[test]
    fn test_truncated_to_word_count() {
        let annotation = Annotation {
            morphemes: (0..10)
                .map(|i| morpheme(&format!("단어{}", i), "NNG"))
                .collect(),
            ..Default::default()
        };

        // Two whitespace-delimited words in the cleaned sentence.
        let keywords = extract_keywords(&annotation, "두 단어", Language::Korean);
        assert_eq!(keywords.len(), 2);
    }

    #[test]
    fn test_english_stop_words_excluded() {
        let tokens = ["The", "weather", "is", "beautiful", "today"]
            .iter()
            .zip(["DET", "NOUN", "AUX", "ADJ", "NOUN"])
            .map(|(text, pos)| Token {
                text: text.to_string(),
                pos: pos.to_string(),
                lemma: text.to_lowercase(),
                dep: String::new(),
                head: 0,
            })
            .collect();

        let annotation = Annotation {
            tokens,
            ..Default::default()
        };

        let keywords = extract_keywords(&annotation, "The weather is beautiful today", Language::English);
        let words = keywords.words();

        assert_eq!(words, vec!["weather", "beautiful", "today"]);
    }
}
