//! Semantic similarity scoring.
//!
//! Scores claim/candidate pairs by cosine similarity of sentence
//! embeddings from a multilingual embedding model. Deterministic for a
//! fixed model and inputs.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::llm::{EmbeddingRequest, LlmClient};

/// Sentence-embedding backend: one fixed-size vector per input string.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Embedder backed by the LLM client's embeddings endpoint.
pub struct LlmEmbedder {
    client: Arc<dyn LlmClient>,
    model: Option<String>,
}

impl LlmEmbedder {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            model: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

#[async_trait]
impl Embedder for LlmEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let response = self
            .client
            .embed(EmbeddingRequest {
                model: self.model.clone(),
                texts: texts.to_vec(),
            })
            .await?;

        if response.embeddings.len() != texts.len() {
            return Err(Error::parse(
                "embedder",
                format!(
                    "expected {} embeddings, got {}",
                    texts.len(),
                    response.embeddings.len()
                ),
            ));
        }

        Ok(response.embeddings)
    }
}

/// Cosine similarity clamped to [0, 1]. Identical vectors score exactly
/// 1.0; zero vectors score 0.0.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += *x as f64 * *y as f64;
        norm_a += *x as f64 * *x as f64;
        norm_b += *y as f64 * *y as f64;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(0.0, 1.0)
}

/// Similarity scorer over an embedding backend.
pub struct SimilarityScorer {
    embedder: Arc<dyn Embedder>,
}

impl SimilarityScorer {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }

    /// Similarity of one pair, in [0, 1].
    pub async fn score(&self, claim: &str, candidate: &str) -> Result<f64> {
        let embeddings = self
            .embedder
            .embed(&[claim.to_string(), candidate.to_string()])
            .await?;
        Ok(cosine_similarity(&embeddings[0], &embeddings[1]))
    }

    /// Similarity of the claim against every candidate, in candidate
    /// order. One embedding call covers the claim and all candidates.
    pub async fn score_all(&self, claim: &str, candidates: &[String]) -> Result<Vec<f64>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let mut texts = Vec::with_capacity(candidates.len() + 1);
        texts.push(claim.to_string());
        texts.extend_from_slice(candidates);

        let embeddings = self.embedder.embed(&texts).await?;
        let claim_embedding = &embeddings[0];

        Ok(embeddings[1..]
            .iter()
            .map(|e| cosine_similarity(claim_embedding, e))
            .collect())
    }

    /// Indices of the top-k candidates by similarity, descending, stable
    /// on ties by candidate input order.
    pub async fn rank(
        &self,
        query: &str,
        candidates: &[String],
        k: usize,
    ) -> Result<Vec<(usize, f64)>> {
        let scores = self.score_all(query, candidates).await?;

        let mut ranked: Vec<(usize, f64)> = scores.into_iter().enumerate().collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(k);
        Ok(ranked)
    }
}
