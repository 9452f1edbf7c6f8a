//! Linguistic annotation service interface.
//!
//! The extraction strategies consume token-level annotations (morphemes,
//! dependency arcs, semantic-role frames) produced by an external
//! analyzer. The wire shape follows a WiseNLU-style service: one POST per
//! text with an analysis code, a credential header, and a nested
//! `return_object` payload.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};

use super::types::Language;

/// A single morpheme with its tag, in sentence order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Morpheme {
    pub lemma: String,
    /// Morphological tag (NNG, JKS, VV, VCP, EC, ...)
    pub tag: String,
    pub position: usize,
}

/// A word-level token with dependency information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    /// Coarse part-of-speech (NOUN, VERB, DET, ...)
    pub pos: String,
    pub lemma: String,
    /// Dependency relation to the head (nsubj, dobj, ROOT, NP_SBJ, ...)
    pub dep: String,
    /// Index of the head token within the same annotation
    pub head: usize,
}

/// One predicate-argument frame from semantic-role labeling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SrlFrame {
    pub predicate: String,
    pub arguments: Vec<SrlArgument>,
}

/// A labeled argument of a predicate (ARG0, ARG1, ARG2, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SrlArgument {
    pub role: String,
    pub text: String,
}

/// Full annotation of one sentence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub morphemes: Vec<Morpheme>,
    pub tokens: Vec<Token>,
    pub frames: Vec<SrlFrame>,
}

impl Annotation {
    /// True when the analyzer returned nothing usable.
    pub fn is_empty(&self) -> bool {
        self.morphemes.is_empty() && self.tokens.is_empty() && self.frames.is_empty()
    }
}

/// Linguistic annotation backend.
#[async_trait]
pub trait Annotator: Send + Sync {
    /// Annotate a single sentence.
    async fn annotate(&self, text: &str, language: Language) -> Result<Annotation>;
}

/// Configuration for the HTTP annotation client.
#[derive(Debug, Clone)]
pub struct AnnotatorConfig {
    /// Credential sent in the Authorization header
    pub api_key: String,
    /// Primary endpoint
    pub base_url: String,
    /// Alternate endpoint tried when the primary returns an empty result
    pub fallback_url: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl AnnotatorConfig {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            fallback_url: None,
            timeout_secs: 10,
        }
    }

    pub fn with_fallback_url(mut self, url: impl Into<String>) -> Self {
        self.fallback_url = Some(url.into());
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP client for a WiseNLU-style annotation service.
pub struct HttpAnnotator {
    config: AnnotatorConfig,
    http: Client,
}

// Wire types for the annotation service.
#[derive(Debug, Serialize)]
struct AnnotateRequest<'a> {
    argument: AnnotateArgument<'a>,
}

#[derive(Debug, Serialize)]
struct AnnotateArgument<'a> {
    text: &'a str,
    analysis_code: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    return_object: Option<ReturnObject>,
}

#[derive(Debug, Deserialize)]
struct ReturnObject {
    #[serde(default)]
    sentence: Vec<WireSentence>,
}

#[derive(Debug, Deserialize)]
struct WireSentence {
    #[serde(default)]
    morp: Vec<WireMorpheme>,
    #[serde(default)]
    word: Vec<WireWord>,
    #[serde(rename = "SRL", default)]
    srl: Vec<WireSrl>,
    #[serde(default)]
    dependency: Vec<WireDependency>,
}

#[derive(Debug, Deserialize)]
struct WireMorpheme {
    lemma: String,
    #[serde(rename = "type")]
    tag: String,
    #[serde(default)]
    position: usize,
}

#[derive(Debug, Deserialize)]
struct WireWord {
    text: String,
}

#[derive(Debug, Deserialize)]
struct WireSrl {
    #[serde(default)]
    verb: String,
    #[serde(default)]
    argument: Vec<WireSrlArgument>,
}

#[derive(Debug, Deserialize)]
struct WireSrlArgument {
    #[serde(rename = "type")]
    role: String,
    text: String,
}

#[derive(Debug, Deserialize)]
struct WireDependency {
    text: String,
    label: String,
    #[serde(default)]
    head: i64,
    #[serde(default)]
    id: i64,
}

impl HttpAnnotator {
    const SERVICE: &'static str = "annotator";
    const ANALYSIS_CODE: &'static str = "morp,srl";

    pub fn new(config: AnnotatorConfig) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self { config, http }
    }

    async fn request(&self, url: &str, text: &str) -> Result<AnnotateResponse> {
        let request = AnnotateRequest {
            argument: AnnotateArgument {
                text,
                analysis_code: Self::ANALYSIS_CODE,
            },
        };

        let response = self
            .http
            .post(url)
            .header("Authorization", &self.config.api_key)
            .header("content-type", "application/json; charset=UTF-8")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::transport(Self::SERVICE, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(Self::SERVICE, format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Error::transport(
                Self::SERVICE,
                format!("annotation service error ({}): {}", status, body),
            ));
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::parse(Self::SERVICE, format!("Failed to parse response: {}", e)))
    }

    fn into_annotation(response: AnnotateResponse) -> Annotation {
        let mut annotation = Annotation::default();

        let Some(return_object) = response.return_object else {
            return annotation;
        };

        for sentence in return_object.sentence {
            for m in sentence.morp {
                annotation.morphemes.push(Morpheme {
                    lemma: m.lemma,
                    tag: m.tag,
                    position: m.position,
                });
            }

            // Word nodes with dependency labels become coarse tokens;
            // the analyzer reports heads by node id, -1 for the root.
            let base = annotation.tokens.len();
            if !sentence.dependency.is_empty() {
                for dep in &sentence.dependency {
                    let head = if dep.head >= 0 {
                        base + dep.head as usize
                    } else {
                        base + dep.id.max(0) as usize
                    };
                    annotation.tokens.push(Token {
                        text: dep.text.clone(),
                        pos: String::new(),
                        lemma: dep.text.clone(),
                        dep: dep.label.clone(),
                        head,
                    });
                }
            } else {
                for word in &sentence.word {
                    annotation.tokens.push(Token {
                        text: word.text.clone(),
                        pos: String::new(),
                        lemma: word.text.clone(),
                        dep: String::new(),
                        head: base,
                    });
                }
            }

            for srl in sentence.srl {
                annotation.frames.push(SrlFrame {
                    predicate: srl.verb,
                    arguments: srl
                        .argument
                        .into_iter()
                        .map(|a| SrlArgument {
                            role: a.role,
                            text: a.text,
                        })
                        .collect(),
                });
            }
        }

        annotation
    }
}

#[async_trait]
impl Annotator for HttpAnnotator {
    async fn annotate(&self, text: &str, language: Language) -> Result<Annotation> {
        debug!(%language, "requesting annotation");

        let response = self.request(&self.config.base_url, text).await?;
        let annotation = Self::into_annotation(response);

        if !annotation.is_empty() {
            return Ok(annotation);
        }

        // Empty structured result: retry once against the alternate
        // endpoint before reporting absence to the caller.
        if let Some(fallback) = &self.config.fallback_url {
            debug!("primary annotation empty, trying fallback endpoint");
            let response = self.request(fallback, text).await?;
            return Ok(Self::into_annotation(response));
        }

        Ok(annotation)
    }
}
