//! Natural-language-inference judgment.
//!
//! Classifies a (premise, hypothesis) pair as entailment, neutral, or
//! contradiction with a confidence score. Failures are reported as the
//! `Error` label with zero confidence, never as an error value: a missing
//! NLI signal degrades the verdict, it does not abort the claim.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Three-way inference label, plus the failure marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NliLabel {
    Entailment,
    Neutral,
    Contradiction,
    /// Classification failed or the service was unreachable
    Error,
}

impl NliLabel {
    /// Parse a service label, case-insensitively. Unknown labels map to
    /// `Error`.
    pub fn parse(label: &str) -> Self {
        match label.to_lowercase().as_str() {
            "entailment" => Self::Entailment,
            "neutral" => Self::Neutral,
            "contradiction" => Self::Contradiction,
            _ => Self::Error,
        }
    }
}

impl std::fmt::Display for NliLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Entailment => write!(f, "entailment"),
            Self::Neutral => write!(f, "neutral"),
            Self::Contradiction => write!(f, "contradiction"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One NLI classification with its confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NliJudgment {
    pub label: NliLabel,
    /// Classifier confidence in [0, 1]; 0.0 for the `Error` label
    pub confidence: f64,
}

impl NliJudgment {
    pub fn new(label: NliLabel, confidence: f64) -> Self {
        Self {
            label,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// The judgment returned when classification fails.
    pub fn error() -> Self {
        Self {
            label: NliLabel::Error,
            confidence: 0.0,
        }
    }
}

/// NLI classification backend.
#[async_trait]
pub trait NliJudge: Send + Sync {
    /// Judge a (premise, hypothesis) pair. Infallible by contract: any
    /// failure is the `Error` judgment.
    async fn judge(&self, premise: &str, hypothesis: &str) -> NliJudgment;
}

/// Configuration for the HTTP NLI client.
#[derive(Debug, Clone)]
pub struct NliConfig {
    /// Inference endpoint, e.g. `http://localhost:8004/nli`
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl NliConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout_secs: 10,
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP client for an NLI inference server.
pub struct HttpNliJudge {
    config: NliConfig,
    http: Client,
}

#[derive(Debug, Serialize)]
struct NliRequest<'a> {
    premise: &'a str,
    hypothesis: &'a str,
}

#[derive(Debug, Deserialize)]
struct NliResponse {
    label: String,
    score: f64,
}

impl HttpNliJudge {
    pub fn new(config: NliConfig) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self { config, http }
    }

    async fn request(&self, premise: &str, hypothesis: &str) -> Option<NliJudgment> {
        let response = self
            .http
            .post(&self.config.endpoint)
            .json(&NliRequest {
                premise,
                hypothesis,
            })
            .send()
            .await
            .ok()?;

        if !response.status().is_success() {
            return None;
        }

        let body: NliResponse = response.json().await.ok()?;
        Some(NliJudgment::new(NliLabel::parse(&body.label), body.score))
    }
}

#[async_trait]
impl NliJudge for HttpNliJudge {
    async fn judge(&self, premise: &str, hypothesis: &str) -> NliJudgment {
        match self.request(premise, hypothesis).await {
            Some(judgment) => judgment,
            None => {
                warn!("NLI classification failed, returning error judgment");
                NliJudgment::error()
            }
        }
    }
}
