//! Candidate summarization.
//!
//! Candidate sentences over a word-count threshold are condensed by an
//! external summarization model, bounded to a short output. When the
//! service fails, a local keyword-window extraction stands in: a span of
//! characters around the earliest matched keyword, snapped to sentence
//! punctuation.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use crate::error::{Error, Result};
use crate::llm::{ChatMessage, CompletionRequest, LlmClient};

use super::ranking::{EvidenceCandidate, SummaryMethod};

/// Text summarization backend.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Produce a short summary of `text`, keeping the given keywords in
    /// view.
    async fn summarize(&self, text: &str, keywords: &[String]) -> Result<String>;
}

/// Summarizer backed by a chat model.
pub struct LlmSummarizer {
    client: Arc<dyn LlmClient>,
}

impl LlmSummarizer {
    const SYSTEM_PROMPT: &'static str = "You are a text summarization expert. \
        Summarize key content concisely and accurately in English.";

    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    fn build_prompt(text: &str, keywords: &[String]) -> String {
        let keyword_info = if keywords.is_empty() {
            String::new()
        } else {
            format!("\nRelevant keywords: {}", keywords.join(", "))
        };

        format!(
            "Summarize the following text concisely.{}\n\nOriginal text: {}\n\n\
             Summary rules:\n\
             1. Include only key information\n\
             2. Use one natural sentence\n\
             3. Keep within 50 characters\n\
             4. Include relevant keyword information\n\
             5. Include only accurate facts\n\nSummary:",
            keyword_info, text
        )
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize(&self, text: &str, keywords: &[String]) -> Result<String> {
        let request = CompletionRequest::new()
            .with_message(ChatMessage::system(Self::SYSTEM_PROMPT))
            .with_message(ChatMessage::user(Self::build_prompt(text, keywords)))
            .with_temperature(0.3)
            .with_max_tokens(100);

        let response = self.client.complete(request).await?;
        let summary = response.content.trim().to_string();

        if summary.is_empty() {
            return Err(Error::parse("summarizer", "empty summary"));
        }

        Ok(summary)
    }
}

/// Characters kept on each side of the matched keyword by the window
/// fallback.
const WINDOW_RADIUS: usize = 60;

/// Sentence punctuation the window snaps to.
fn is_boundary(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | ',' | '。' | '！' | '？' | '，')
}

/// Extract a window of characters around the earliest matched keyword,
/// snapped outward to sentence punctuation. Falls back to a prefix of the
/// sentence when no keyword occurs.
pub(crate) fn keyword_window(sentence: &str, matched_keywords: &[String]) -> String {
    let chars: Vec<char> = sentence.chars().collect();
    if chars.is_empty() {
        return String::new();
    }

    // Earliest occurrence of any matched keyword, in char positions.
    let hit = matched_keywords
        .iter()
        .filter_map(|kw| sentence.find(kw.as_str()).map(|byte| (byte, kw.chars().count())))
        .min_by_key(|(byte, _)| *byte);

    let (start_char, kw_len) = match hit {
        Some((byte, len)) => (sentence[..byte].chars().count(), len),
        None => (0, 0),
    };

    // Expand from the hit in both directions, stopping early at boundary
    // punctuation and never exceeding the radius.
    let mut start = start_char;
    while start > 0 && start_char - start < WINDOW_RADIUS && !is_boundary(chars[start - 1]) {
        start -= 1;
    }
    let kw_end = (start_char + kw_len).min(chars.len());
    let mut end = kw_end;
    while end < chars.len() && end - kw_end < WINDOW_RADIUS {
        let c = chars[end];
        end += 1;
        if is_boundary(c) {
            break;
        }
    }

    chars[start..end].iter().collect::<String>().trim().to_string()
}

/// Apply summarization to ranked candidates. Candidates at or below
/// `word_threshold` words stay verbatim; longer ones are condensed, with
/// the keyword window standing in when the service fails.
pub(crate) async fn summarize_candidates(
    summarizer: &dyn Summarizer,
    candidates: &mut [EvidenceCandidate],
    word_threshold: usize,
) {
    for candidate in candidates.iter_mut() {
        let word_count = candidate.original_sentence.split_whitespace().count();
        if word_count <= word_threshold {
            continue;
        }

        match summarizer
            .summarize(&candidate.original_sentence, &candidate.matched_keywords)
            .await
        {
            Ok(summary) => {
                candidate.sentence = summary;
                candidate.summary_method = SummaryMethod::Llm;
            }
            Err(e) => {
                warn!(error = %e, "summarization failed, using keyword window");
                candidate.sentence =
                    keyword_window(&candidate.original_sentence, &candidate.matched_keywords);
                candidate.summary_method = SummaryMethod::KeywordWindow;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_window_around_hit() {
        let long: String = format!(
            "{}거나, 세종대왕은 한글을 창제한 왕이다, {}",
            "앞부분 내용이 길게 이어지".repeat(3),
            "뒷부분 내용이 길게 이어진다".repeat(3),
        );
        let window = keyword_window(&long, &["세종대왕".to_string()]);

        assert!(window.contains("세종대왕"));
        assert!(window.chars().count() < long.chars().count());
    }

    #[test]
    fn test_keyword_window_snaps_to_punctuation() {
        let text = "첫 구절이다, 세종대왕 이야기이다, 마지막 구절이다";
        let window = keyword_window(text, &["세종대왕".to_string()]);
        assert_eq!(window, "세종대왕 이야기이다,");
    }

    #[test]
    fn test_keyword_window_without_hit_is_prefix() {
        let text = "키워드가 없는 문장이다";
        let window = keyword_window(text, &["세종대왕".to_string()]);
        assert!(text.starts_with(&window) || window == text);
    }

    #[test]
    fn test_keyword_window_empty_sentence() {
        assert_eq!(keyword_window("", &[]), "");
    }

    struct FailingSummarizer;

    #[async_trait]
    impl Summarizer for FailingSummarizer {
        async fn summarize(&self, _text: &str, _keywords: &[String]) -> Result<String> {
            Err(Error::transport("summarizer", "unreachable"))
        }
    }

    struct EchoSummarizer;

    #[async_trait]
    impl Summarizer for EchoSummarizer {
        async fn summarize(&self, _text: &str, _keywords: &[String]) -> Result<String> {
            Ok("짧은 요약.".to_string())
        }
    }

    fn candidate(sentence: &str) -> EvidenceCandidate {
        EvidenceCandidate {
            sentence: sentence.to_string(),
            original_sentence: sentence.to_string(),
            url: String::new(),
            matched_keywords: vec!["세종대왕".to_string()],
            match_score: 2,
            summary_method: SummaryMethod::Verbatim,
        }
    }

    #[tokio::test]
    async fn test_short_candidates_left_verbatim() {
        let mut candidates = vec![candidate("세종대왕은 왕이다.")];
        summarize_candidates(&EchoSummarizer, &mut candidates, 30).await;

        assert_eq!(candidates[0].summary_method, SummaryMethod::Verbatim);
        assert_eq!(candidates[0].sentence, "세종대왕은 왕이다.");
    }

    #[tokio::test]
    async fn test_long_candidates_summarized() {
        let long = "세종대왕 단어 ".repeat(20);
        let mut candidates = vec![candidate(&long)];
        summarize_candidates(&EchoSummarizer, &mut candidates, 30).await;

        assert_eq!(candidates[0].summary_method, SummaryMethod::Llm);
        assert_eq!(candidates[0].sentence, "짧은 요약.");
        // The original is preserved for auditability.
        assert_eq!(candidates[0].original_sentence, long);
    }

    #[tokio::test]
    async fn test_summarization_failure_uses_window() {
        let long = "세종대왕 단어 ".repeat(20);
        let mut candidates = vec![candidate(&long)];
        summarize_candidates(&FailingSummarizer, &mut candidates, 30).await;

        assert_eq!(candidates[0].summary_method, SummaryMethod::KeywordWindow);
        assert!(candidates[0].sentence.contains("세종대왕"));
    }
}
