//! Keyword and SVO extraction.
//!
//! One extraction capability with several interchangeable strategies
//! behind it: dependency parsing, semantic-role labeling (with its own
//! fallback ladder), morphological analysis, and a remote LLM. Strategy
//! selection is a parameter, not a separate subsystem.
//!
//! Extraction never fails past this boundary: every failure path resolves
//! to a well-formed placeholder [`SvoResult`] carrying an error
//! annotation.

pub mod annotator;
mod dependency;
mod keywords;
mod llm_strategy;
mod morphology;
mod srl;
pub mod types;

use std::sync::Arc;
use tracing::warn;

use crate::llm::LlmClient;

pub use annotator::{
    Annotation, Annotator, AnnotatorConfig, HttpAnnotator, Morpheme, SrlArgument, SrlFrame, Token,
};
pub use types::{ExtractionMethod, Keyword, KeywordSet, Language, PredicateType, SvoResult};

/// Extraction strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Dependency relations from a parser
    DependencyParse,
    /// Predicate-argument roles from a remote annotation service,
    /// falling back to morphology, then dependency labels
    SemanticRoles,
    /// Particle-driven morpheme analysis
    Morphology,
    /// Strict-JSON prompt against a chat model
    RemoteLlm,
}

/// Facade over the extraction strategies.
pub struct SvoExtractor {
    annotator: Arc<dyn Annotator>,
    llm: Arc<dyn LlmClient>,
}

impl SvoExtractor {
    pub fn new(annotator: Arc<dyn Annotator>, llm: Arc<dyn LlmClient>) -> Self {
        Self { annotator, llm }
    }

    /// Extract the primary SVO triple of a sentence.
    pub async fn extract(&self, sentence: &str, language: Language, strategy: Strategy) -> SvoResult {
        self.extract_all(sentence, language, strategy)
            .await
            .into_iter()
            .next()
            .unwrap_or_else(|| SvoResult::placeholder(language))
    }

    /// Extract every SVO triple of a sentence. Most sentences yield one;
    /// noun-equational chains yield one per copula. The result is never
    /// empty.
    pub async fn extract_all(
        &self,
        sentence: &str,
        language: Language,
        strategy: Strategy,
    ) -> Vec<SvoResult> {
        if strategy == Strategy::RemoteLlm {
            return vec![llm_strategy::extract_svo(self.llm.as_ref(), sentence, language).await];
        }

        let annotation = match self.annotator.annotate(sentence, language).await {
            Ok(annotation) => annotation,
            Err(e) => {
                warn!(error = %e, "annotation failed, returning placeholder");
                return vec![SvoResult::placeholder(language)
                    .with_error(format!("annotation failed: {}", e))];
            }
        };

        let results = match strategy {
            Strategy::DependencyParse => {
                dependency::extract_svo(&annotation, language).into_iter().collect()
            }
            Strategy::SemanticRoles => {
                srl::extract_with_fallback(&annotation, language).into_iter().collect()
            }
            Strategy::Morphology => morphology::extract_svo(&annotation.morphemes, language),
            Strategy::RemoteLlm => unreachable!("handled above"),
        };

        if results.is_empty() {
            vec![SvoResult::placeholder(language).with_error("empty annotation")]
        } else {
            results
        }
    }

    /// Extract content keywords with their part-of-speech tags. An
    /// annotation failure yields an empty set, not an error.
    pub async fn extract_keywords(&self, sentence: &str, language: Language) -> KeywordSet {
        match self.annotator.annotate(sentence, language).await {
            Ok(annotation) => keywords::extract_keywords(&annotation, sentence, language),
            Err(e) => {
                warn!(error = %e, "annotation failed, returning empty keyword set");
                KeywordSet::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use async_trait::async_trait;

    struct StaticAnnotator {
        annotation: Annotation,
        fail: bool,
    }

    #[async_trait]
    impl Annotator for StaticAnnotator {
        async fn annotate(&self, _text: &str, _language: Language) -> Result<Annotation> {
            if self.fail {
                Err(Error::transport("annotator", "unreachable"))
            } else {
                Ok(self.annotation.clone())
            }
        }
    }

    struct StaticLlm {
        response: String,
    }

    #[async_trait]
    impl crate::llm::LlmClient for StaticLlm {
        async fn complete(
            &self,
            _request: crate::llm::CompletionRequest,
        ) -> Result<crate::llm::CompletionResponse> {
            Ok(crate::llm::CompletionResponse {
                model: "test".to_string(),
                content: self.response.clone(),
            })
        }

        async fn embed(
            &self,
            _request: crate::llm::EmbeddingRequest,
        ) -> Result<crate::llm::EmbeddingResponse> {
            Err(Error::Internal("not used".to_string()))
        }
    }

    fn extractor_with(annotation: Annotation, fail: bool, llm_response: &str) -> SvoExtractor {
        SvoExtractor::new(
            Arc::new(StaticAnnotator { annotation, fail }),
            Arc::new(StaticLlm {
                response: llm_response.to_string(),
            }),
        )
    }

    fn student_reads_annotation() -> Annotation {
        Annotation {
            morphemes: vec![
                Morpheme {
                    lemma: "학생".to_string(),
                    tag: "NNG".to_string(),
                    position: 0,
                },
                Morpheme {
                    lemma: "읽".to_string(),
                    tag: "VV".to_string(),
                    position: 17,
                },
            ],
            frames: vec![SrlFrame {
                predicate: "읽다".to_string(),
                arguments: vec![
                    SrlArgument {
                        role: "ARG0".to_string(),
                        text: "학생이".to_string(),
                    },
                    SrlArgument {
                        role: "ARG1".to_string(),
                        text: "책을".to_string(),
                    },
                ],
            }],
            ..Default::default()
        }
    }

    // 학생이 책을 읽는다: semantic roles give the full triple.
    #[tokio::test]
    async fn test_semantic_roles_extraction() {
        let extractor = extractor_with(student_reads_annotation(), false, "");
        let svo = extractor
            .extract("학생이 책을 읽는다.", Language::Korean, Strategy::SemanticRoles)
            .await;

        assert!(svo.subject.contains("학생"));
        assert!(svo.verb == "읽다" || svo.verb == "읽는다");
        assert!(svo.object.as_deref().unwrap_or("").contains("책"));
        assert!(svo.has_object);
    }

    #[tokio::test]
    async fn test_annotation_failure_yields_placeholder() {
        let extractor = extractor_with(Annotation::default(), true, "");
        let svo = extractor
            .extract("학생이 책을 읽는다.", Language::Korean, Strategy::SemanticRoles)
            .await;

        assert_eq!(svo.subject, "주어");
        assert_eq!(svo.verb, "동사");
        assert!(!svo.has_object);
        assert!(svo.error.is_some());
    }

    #[tokio::test]
    async fn test_remote_llm_strategy() {
        let extractor = extractor_with(
            Annotation::default(),
            true, // annotator unused for this strategy
            r#"{"subject": "학생", "verb": "읽다", "object": "책", "predicate_type": "VV", "has_object": true}"#,
        );
        let svo = extractor
            .extract("학생이 책을 읽는다.", Language::Korean, Strategy::RemoteLlm)
            .await;

        assert_eq!(svo.subject, "학생");
        assert_eq!(svo.method, ExtractionMethod::RemoteLlm);
        assert!(svo.has_object);
    }

    #[tokio::test]
    async fn test_remote_llm_malformed_json() {
        let extractor = extractor_with(Annotation::default(), true, "I cannot analyze that.");
        let svo = extractor
            .extract("학생이 책을 읽는다.", Language::Korean, Strategy::RemoteLlm)
            .await;

        assert_eq!(svo.method, ExtractionMethod::Fallback);
        assert!(svo.error.as_deref().unwrap_or("").contains("no JSON object"));
    }

    #[tokio::test]
    async fn test_keyword_extraction_failure_is_empty() {
        let extractor = extractor_with(Annotation::default(), true, "");
        let keywords = extractor.extract_keywords("학생이 책을 읽는다.", Language::Korean).await;
        assert!(keywords.is_empty());
    }
}
