//! Claim-analysis orchestration.
//!
//! One [`Pipeline`] call owns the full flow for a claim: segmentation,
//! validation, SVO/keyword extraction, evidence retrieval, similarity
//! scoring, NLI judgment, and verdict combination. External-service
//! handles live in a process-wide [`ServiceContext`], constructed once
//! and shared by reference; nothing is rebuilt per call.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::time::{timeout, Duration};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::extract::{Annotator, Language, Strategy, SvoExtractor, SvoResult};
use crate::history::SqliteHistoryStore;
use crate::llm::LlmClient;
use crate::retrieve::{
    EvidenceRetriever, LlmSummarizer, RetrieverConfig, Summarizer, SynonymProvider, WikiSource,
};
use crate::scoring::{
    sort_by_final_score, Embedder, NliJudge, NliJudgment, ScoredCandidate, SimilarityScorer,
    VerdictPolicy,
};
use crate::segment::{SentenceValidator, ValidationSummary};

/// Tunables for one pipeline instance.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Extraction strategy for SVO analysis
    pub strategy: Strategy,
    /// Candidates kept for NLI judgment after similarity ranking
    pub nli_top_k: usize,
    /// Timeout applied to each inference-class call (embedding, NLI)
    pub inference_timeout_secs: u64,
    pub retriever: RetrieverConfig,
    pub verdict: VerdictPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::SemanticRoles,
            nli_top_k: 5,
            inference_timeout_secs: 10,
            retriever: RetrieverConfig::default(),
            verdict: VerdictPolicy::default(),
        }
    }
}

/// Process-wide handles to every external collaborator. Built once,
/// shared by `Arc` reference across requests; all handles are read-only
/// and thread-safe.
pub struct ServiceContext {
    pub annotator: Arc<dyn Annotator>,
    pub llm: Arc<dyn LlmClient>,
    pub embedder: Arc<dyn Embedder>,
    pub nli: Arc<dyn NliJudge>,
    pub wiki: Arc<dyn WikiSource>,
    pub synonyms: Arc<dyn SynonymProvider>,
    /// Optional write-only audit store
    pub history: Option<Arc<SqliteHistoryStore>>,
    /// Summarizer override; defaults to the LLM-backed summarizer
    pub summarizer: Option<Arc<dyn Summarizer>>,
}

impl ServiceContext {
    pub fn new(
        annotator: Arc<dyn Annotator>,
        llm: Arc<dyn LlmClient>,
        embedder: Arc<dyn Embedder>,
        nli: Arc<dyn NliJudge>,
        wiki: Arc<dyn WikiSource>,
        synonyms: Arc<dyn SynonymProvider>,
    ) -> Self {
        Self {
            annotator,
            llm,
            embedder,
            nli,
            wiki,
            synonyms,
            history: None,
            summarizer: None,
        }
    }

    pub fn with_history(mut self, store: Arc<SqliteHistoryStore>) -> Self {
        self.history = Some(store);
        self
    }

    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }
}

/// Analysis result for one sentence of the claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentenceAnalysis {
    /// 1-based position among the valid sentences
    pub sentence_id: u32,
    pub text: String,
    pub svo: SvoResult,
    pub keywords: Vec<String>,
    /// Ranked, judged evidence; empty when retrieval found nothing
    pub candidates: Vec<ScoredCandidate>,
    /// Verdict from the best candidate; `None` without evidence
    pub hallucination: Option<bool>,
    /// Diagnostic for a terminal retrieval failure on this sentence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Full analysis of one claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimAnalysis {
    pub id: Uuid,
    pub language: Language,
    pub original_text: String,
    pub sentences: Vec<SentenceAnalysis>,
    pub summary: ValidationSummary,
    pub completed_at: DateTime<Utc>,
}

impl ClaimAnalysis {
    /// Render the analysis in the splitter's structured representation,
    /// with the placeholder fields filled in.
    pub fn to_structured(&self) -> crate::segment::StructuredAnswer {
        let sentences = self
            .sentences
            .iter()
            .map(|s| {
                let mut record = crate::segment::SentenceRecord::new(s.sentence_id, &s.text);
                record.hallucination = s.hallucination;
                record.source_candidates = s.candidates.clone();
                record
            })
            .collect();

        crate::segment::StructuredAnswer {
            original_answer: self.original_text.clone(),
            sentences,
        }
    }
}

/// The hallucination-detection pipeline.
pub struct Pipeline {
    context: Arc<ServiceContext>,
    config: PipelineConfig,
    validator: SentenceValidator,
    extractor: SvoExtractor,
    retriever: EvidenceRetriever,
    scorer: SimilarityScorer,
}

impl Pipeline {
    pub fn new(context: Arc<ServiceContext>, config: PipelineConfig) -> Self {
        let extractor = SvoExtractor::new(context.annotator.clone(), context.llm.clone());
        let summarizer = context
            .summarizer
            .clone()
            .unwrap_or_else(|| Arc::new(LlmSummarizer::new(context.llm.clone())));
        let retriever = EvidenceRetriever::new(
            context.wiki.clone(),
            context.synonyms.clone(),
            summarizer,
            config.retriever.clone(),
        );
        let scorer = SimilarityScorer::new(context.embedder.clone());

        Self {
            context,
            config,
            validator: SentenceValidator::new(),
            extractor,
            retriever,
            scorer,
        }
    }

    /// Analyze a claim end to end. Degenerate input yields an empty,
    /// well-formed result; per-sentence failures are recorded on the
    /// sentence, never raised.
    pub async fn analyze(&self, text: &str) -> Result<ClaimAnalysis> {
        let id = Uuid::new_v4();
        let language = Language::detect(text);
        info!(%id, %language, "starting claim analysis");

        let validation = self.validator.validate_text(text);
        let sentences = self.validator.remove_duplicates(&validation.valid_sentences);

        let mut analyses = Vec::with_capacity(sentences.len());
        for (idx, sentence) in sentences.iter().enumerate() {
            let analysis = self.analyze_sentence(idx as u32 + 1, sentence, language).await;
            analyses.push(analysis);
        }

        Ok(ClaimAnalysis {
            id,
            language,
            original_text: text.to_string(),
            sentences: analyses,
            summary: validation.summary,
            completed_at: Utc::now(),
        })
    }

    /// Analyze a single validated sentence.
    pub async fn analyze_sentence(
        &self,
        sentence_id: u32,
        sentence: &str,
        language: Language,
    ) -> SentenceAnalysis {
        let svo = self
            .extractor
            .extract(sentence, language, self.config.strategy)
            .await;
        let keywords = self.extractor.extract_keywords(sentence, language).await.words();

        if let Some(history) = &self.context.history {
            if let Err(e) = history.record(sentence, language, &svo) {
                warn!(error = %e, "failed to record analysis history");
            }
        }

        let primary_keyword = keywords.first().cloned().unwrap_or_else(|| svo.subject.clone());

        let candidates = match self.retriever.retrieve(&primary_keyword, &keywords).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(error = %e, "evidence retrieval failed for sentence");
                return SentenceAnalysis {
                    sentence_id,
                    text: sentence.to_string(),
                    svo,
                    keywords,
                    candidates: Vec::new(),
                    hallucination: None,
                    error: Some(e.to_string()),
                };
            }
        };

        let scored = self.score_candidates(sentence, candidates).await;
        let hallucination = scored
            .first()
            .map(|top| top.final_score < self.config.verdict.hallucination_threshold);

        SentenceAnalysis {
            sentence_id,
            text: sentence.to_string(),
            svo,
            keywords,
            candidates: scored,
            hallucination,
            error: None,
        }
    }

    /// Similarity-score all candidates, keep the top K, judge those with
    /// NLI, and combine. Candidates are independent and read-only, so the
    /// NLI calls run concurrently.
    async fn score_candidates(
        &self,
        claim: &str,
        candidates: Vec<crate::retrieve::EvidenceCandidate>,
    ) -> Vec<ScoredCandidate> {
        if candidates.is_empty() {
            return Vec::new();
        }

        let budget = Duration::from_secs(self.config.inference_timeout_secs);
        let texts: Vec<String> = candidates.iter().map(|c| c.sentence.clone()).collect();

        let similarities = match timeout(budget, self.scorer.score_all(claim, &texts)).await {
            Ok(Ok(similarities)) => similarities,
            Ok(Err(e)) => {
                warn!(error = %e, "similarity scoring failed, using zero scores");
                vec![0.0; candidates.len()]
            }
            Err(_) => {
                warn!("similarity scoring timed out, using zero scores");
                vec![0.0; candidates.len()]
            }
        };

        // Top K by similarity, stable on ties by retrieval order.
        let mut order: Vec<usize> = (0..candidates.len()).collect();
        order.sort_by(|&a, &b| {
            similarities[b]
                .partial_cmp(&similarities[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        order.truncate(self.config.nli_top_k);

        let judgments: Vec<NliJudgment> = join_all(order.iter().map(|&idx| {
            let nli = self.context.nli.clone();
            let premise = claim.to_string();
            let hypothesis = texts[idx].clone();
            async move {
                timeout(budget, nli.judge(&premise, &hypothesis))
                    .await
                    .unwrap_or_else(|_| {
                        warn!("NLI judgment timed out");
                        NliJudgment::error()
                    })
            }
        }))
        .await;

        let mut scored: Vec<ScoredCandidate> = order
            .into_iter()
            .zip(judgments)
            .map(|(idx, judgment)| {
                ScoredCandidate::new(
                    candidates[idx].clone(),
                    idx,
                    similarities[idx],
                    judgment,
                    &self.config.verdict,
                )
            })
            .collect();

        sort_by_final_score(&mut scored);
        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::extract::{Annotation, Morpheme, SrlArgument, SrlFrame};
    use crate::llm::{CompletionRequest, CompletionResponse, EmbeddingRequest, EmbeddingResponse};
    use crate::retrieve::{SynonymEntry, SynonymGroup, WikiDocument};
    use crate::scoring::NliLabel;
    use async_trait::async_trait;

    struct FakeAnnotator;

    #[async_trait]
    impl Annotator for FakeAnnotator {
        async fn annotate(&self, _text: &str, _language: Language) -> Result<Annotation> {
            Ok(Annotation {
                morphemes: vec![
                    Morpheme {
                        lemma: "세종대왕".to_string(),
                        tag: "NNP".to_string(),
                        position: 0,
                    },
                    Morpheme {
                        lemma: "태어나".to_string(),
                        tag: "VV".to_string(),
                        position: 20,
                    },
                ],
                frames: vec![SrlFrame {
                    predicate: "태어나다".to_string(),
                    arguments: vec![SrlArgument {
                        role: "ARG0".to_string(),
                        text: "세종대왕은".to_string(),
                    }],
                }],
                ..Default::default()
            })
        }
    }

    struct FakeLlm;

    #[async_trait]
    impl LlmClient for FakeLlm {
        async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse> {
            Ok(CompletionResponse {
                model: "fake".to_string(),
                content: "요약.".to_string(),
            })
        }

        async fn embed(&self, _request: EmbeddingRequest) -> Result<EmbeddingResponse> {
            Err(Error::Internal("unused".to_string()))
        }
    }

    struct FakeEmbedder;

    #[async_trait]
    impl Embedder for FakeEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| {
                    let mut v = vec![0.0f32; 32];
                    for c in t.chars() {
                        v[(c as usize) % 32] += 1.0;
                    }
                    v
                })
                .collect())
        }
    }

    struct FakeNli {
        label: NliLabel,
    }

    #[async_trait]
    impl NliJudge for FakeNli {
        async fn judge(&self, _premise: &str, _hypothesis: &str) -> NliJudgment {
            NliJudgment::new(self.label, 0.9)
        }
    }

    struct FakeWiki;

    #[async_trait]
    impl WikiSource for FakeWiki {
        async fn fetch_summary(&self, _title: &str) -> Result<WikiDocument> {
            Ok(WikiDocument {
                content: "세종대왕은 1397년에 태어났다. 세종대왕은 한글을 창제하였다.".to_string(),
                url: "https://ko.wikipedia.org/wiki/세종".to_string(),
            })
        }

        async fn fetch_full(&self, _title: &str) -> Result<WikiDocument> {
            Err(Error::transport("wikipedia", "unused"))
        }
    }

    struct FakeSynonyms;

    #[async_trait]
    impl SynonymProvider for FakeSynonyms {
        async fn lookup(&self, word: &str) -> Result<SynonymEntry> {
            Ok(SynonymEntry {
                synonyms: Vec::new(),
                group: SynonymGroup::fallback(word),
            })
        }
    }

    fn pipeline(nli_label: NliLabel) -> Pipeline {
        let context = ServiceContext::new(
            Arc::new(FakeAnnotator),
            Arc::new(FakeLlm),
            Arc::new(FakeEmbedder),
            Arc::new(FakeNli { label: nli_label }),
            Arc::new(FakeWiki),
            Arc::new(FakeSynonyms),
        )
        .with_history(Arc::new(SqliteHistoryStore::in_memory().expect("store")));

        Pipeline::new(Arc::new(context), PipelineConfig::default())
    }

    #[tokio::test]
    async fn test_end_to_end_analysis() {
        let pipeline = pipeline(NliLabel::Entailment);
        let analysis = pipeline.analyze("세종대왕은 1397년에 태어났다.").await.expect("analysis");

        assert_eq!(analysis.language, Language::Korean);
        assert_eq!(analysis.sentences.len(), 1);

        let sentence = &analysis.sentences[0];
        assert!(sentence.svo.subject.contains("세종대왕"));
        assert!(!sentence.candidates.is_empty());
        // The exact claim sentence exists in the reference document.
        assert_eq!(sentence.candidates[0].similarity, 1.0);
        assert_eq!(sentence.hallucination, Some(false));
    }

    #[tokio::test]
    async fn test_contradiction_flags_hallucination() {
        let pipeline = pipeline(NliLabel::Contradiction);
        let analysis = pipeline.analyze("세종대왕은 1397년에 태어났다.").await.expect("analysis");

        let sentence = &analysis.sentences[0];
        // similarity 1.0 halved by the contradiction deduction: 0.5 < 0.7.
        assert_eq!(sentence.hallucination, Some(true));
        for candidate in &sentence.candidates {
            assert!(candidate.final_score <= candidate.similarity);
        }
    }

    #[tokio::test]
    async fn test_empty_claim_yields_empty_result() {
        let pipeline = pipeline(NliLabel::Entailment);
        let analysis = pipeline.analyze("   ").await.expect("analysis");

        assert!(analysis.sentences.is_empty());
        assert_eq!(analysis.summary.total, 0);
    }

    #[tokio::test]
    async fn test_duplicate_sentences_analyzed_once() {
        let pipeline = pipeline(NliLabel::Entailment);
        let analysis = pipeline
            .analyze("세종대왕은 1397년에 태어났다. 세종대왕은 1397년에 태어났다.")
            .await
            .expect("analysis");

        assert_eq!(analysis.sentences.len(), 1);
        assert_eq!(analysis.summary.total, 2);
    }

    #[tokio::test]
    async fn test_structured_view_filled() {
        let pipeline = pipeline(NliLabel::Entailment);
        let analysis = pipeline.analyze("세종대왕은 1397년에 태어났다.").await.expect("analysis");

        let structured = analysis.to_structured();
        assert_eq!(structured.sentences.len(), 1);
        assert_eq!(structured.sentences[0].sentence_id, 1);
        assert!(structured.sentences[0].hallucination.is_some());
        assert!(!structured.sentences[0].source_candidates.is_empty());
    }

    #[tokio::test]
    async fn test_history_recorded() {
        let store = Arc::new(SqliteHistoryStore::in_memory().expect("store"));
        let context = ServiceContext::new(
            Arc::new(FakeAnnotator),
            Arc::new(FakeLlm),
            Arc::new(FakeEmbedder),
            Arc::new(FakeNli {
                label: NliLabel::Entailment,
            }),
            Arc::new(FakeWiki),
            Arc::new(FakeSynonyms),
        )
        .with_history(store.clone());

        let pipeline = Pipeline::new(Arc::new(context), PipelineConfig::default());
        pipeline.analyze("세종대왕은 1397년에 태어났다.").await.expect("analysis");

        assert_eq!(store.len().expect("len"), 1);
    }
}
