//! # verity-core
//!
//! An evidence-grounded hallucination-detection pipeline for AI-generated
//! text. Given a claim, the pipeline splits it into sentences, extracts
//! keywords and a rough Subject-Verb-Object structure, retrieves evidence
//! candidates from an external encyclopedia, scores semantic similarity,
//! applies a natural-language-inference judgment, and combines the
//! signals into a final hallucination verdict per candidate.
//!
//! ## Core Components
//!
//! - **segment**: sentence splitting and quality validation
//! - **extract**: keyword/SVO extraction behind interchangeable strategies
//! - **retrieve**: evidence retrieval, synonym expansion, ranking
//! - **scoring**: embedding similarity, NLI judgment, verdict combination
//! - **pipeline**: per-claim orchestration over a shared service context
//!
//! ## Example
//!
//! ```rust,ignore
//! use verity_core::{Pipeline, PipelineConfig, ServiceContext};
//! use std::sync::Arc;
//!
//! let context = Arc::new(ServiceContext::new(
//!     annotator, llm, embedder, nli, wiki, synonyms,
//! ));
//! let pipeline = Pipeline::new(context, PipelineConfig::default());
//!
//! let analysis = pipeline.analyze("세종대왕은 1397년에 태어났다.").await?;
//! for sentence in &analysis.sentences {
//!     println!("{}: {:?}", sentence.text, sentence.hallucination);
//! }
//! ```

pub mod error;
pub mod extract;
pub mod history;
pub mod llm;
pub mod pipeline;
pub mod retrieve;
pub mod scoring;
pub mod segment;

// Re-exports for convenience
pub use error::{Error, Result};
pub use extract::{
    Annotation, Annotator, AnnotatorConfig, ExtractionMethod, HttpAnnotator, Keyword, KeywordSet,
    Language, PredicateType, Strategy, SvoExtractor, SvoResult,
};
pub use history::SqliteHistoryStore;
pub use llm::{
    ChatMessage, ChatRole, CompletionRequest, CompletionResponse, EmbeddingRequest,
    EmbeddingResponse, LlmClient, LlmConfig, OpenAiClient,
};
pub use pipeline::{ClaimAnalysis, Pipeline, PipelineConfig, SentenceAnalysis, ServiceContext};
pub use retrieve::{
    expand_keywords, EvidenceCandidate, EvidenceRetriever, ExpandedKeywords, HttpSynonymProvider,
    HttpWikiSource, LlmSummarizer, RetrieverConfig, SummaryMethod, Summarizer, SynonymConfig,
    SynonymEntry, SynonymGroup, SynonymProvider, WikiDocument, WikiSource,
};
pub use scoring::{
    sort_by_final_score, Embedder, HttpNliJudge, LlmEmbedder, NliConfig, NliJudge, NliJudgment,
    NliLabel, ScoredCandidate, SimilarityScorer, VerdictPolicy, JUDGMENT_LOW, JUDGMENT_POSSIBLE,
};
pub use segment::{
    split_sentences, to_structured, InvalidSentence, RejectionReason, SentenceRecord,
    SentenceValidator, StructuredAnswer, TextValidation, ValidationOutcome, ValidationSummary,
};
