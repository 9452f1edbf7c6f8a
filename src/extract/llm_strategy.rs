//! Remote-LLM SVO strategy.
//!
//! Asks a chat model for a strict-JSON SVO analysis of one sentence. The
//! model may wrap the JSON in prose, so the first balanced `{...}` span is
//! extracted before parsing. Malformed or absent JSON yields a placeholder
//! result carrying the raw response for diagnostics; this strategy never
//! surfaces an error.

use serde::Deserialize;
use tracing::warn;

use crate::llm::{ChatMessage, CompletionRequest, LlmClient};

use super::types::{ExtractionMethod, Language, PredicateType, SvoResult};

const SYSTEM_PROMPT_KO: &str = "너는 문장의 주어-동사-목적어 구조를 분석하는 도구야. \
    반드시 JSON 객체 하나만 출력해.";
const SYSTEM_PROMPT_EN: &str = "You analyze the subject-verb-object structure of a sentence. \
    Output exactly one JSON object and nothing else.";

#[derive(Debug, Deserialize)]
struct LlmSvo {
    subject: Option<String>,
    verb: Option<String>,
    object: Option<String>,
    #[serde(default)]
    predicate_type: Option<String>,
}

fn build_prompt(sentence: &str, language: Language) -> String {
    match language {
        Language::Korean => format!(
            "다음 문장의 SVO를 추출해. 형식: {{\"subject\": \"...\", \"verb\": \"...\", \
             \"object\": \"...\" 또는 null, \"predicate_type\": \"VV|VA|VX|VCP\", \
             \"has_object\": true|false}}\n\n문장: {}",
            sentence
        ),
        Language::English => format!(
            "Extract the SVO of this sentence. Format: {{\"subject\": \"...\", \
             \"verb\": \"...\", \"object\": \"...\" or null, \"predicate_type\": \
             \"VV|VA|VX|VCP\", \"has_object\": true|false}}\n\nSentence: {}",
            sentence
        ),
    }
}

/// Extract the first balanced `{...}` span from text that may contain
/// leading or trailing prose.
pub(crate) fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Run the remote-LLM strategy for one sentence. Always returns a
/// well-formed result.
pub(crate) async fn extract_svo(
    client: &dyn LlmClient,
    sentence: &str,
    language: Language,
) -> SvoResult {
    let system = match language {
        Language::Korean => SYSTEM_PROMPT_KO,
        Language::English => SYSTEM_PROMPT_EN,
    };

    let request = CompletionRequest::new()
        .with_message(ChatMessage::system(system))
        .with_message(ChatMessage::user(build_prompt(sentence, language)))
        .with_temperature(0.0)
        .with_max_tokens(200);

    let content = match client.complete(request).await {
        Ok(response) => response.content,
        Err(e) => {
            warn!(error = %e, "LLM SVO extraction failed");
            return SvoResult::placeholder(language)
                .with_error(format!("llm completion failed: {}", e));
        }
    };

    let Some(json) = first_json_object(&content) else {
        return SvoResult::placeholder(language)
            .with_error(format!("no JSON object in response: {}", content));
    };

    match serde_json::from_str::<LlmSvo>(json) {
        Ok(parsed) => {
            let predicate_type = parsed
                .predicate_type
                .as_deref()
                .and_then(PredicateType::from_tag)
                .unwrap_or(PredicateType::Verb);

            SvoResult::new(
                parsed.subject.unwrap_or_default(),
                parsed.verb.unwrap_or_default(),
                parsed.object,
                predicate_type,
                ExtractionMethod::RemoteLlm,
                language,
            )
        }
        Err(e) => SvoResult::placeholder(language)
            .with_error(format!("malformed JSON ({}): {}", e, content)),
    }
}
