//! Reference-document source.
//!
//! Fetches the plain text of an encyclopedia page for a keyword. The
//! source language is chosen from the script distribution of the keyword
//! itself, independent of the claim's language. Two retrieval paths
//! exist: the summary endpoint (primary) and a two-step query/extract
//! resolution with a raw-HTML fallback (used when the primary path
//! returns no content).

use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};
use crate::extract::Language;

/// A fetched reference document.
#[derive(Debug, Clone, PartialEq)]
pub struct WikiDocument {
    /// Plain-text content
    pub content: String,
    /// Canonical page URL
    pub url: String,
}

impl WikiDocument {
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Reference-document backend.
#[async_trait]
pub trait WikiSource: Send + Sync {
    /// Primary path: the page summary.
    async fn fetch_summary(&self, title: &str) -> Result<WikiDocument>;

    /// Fallback path: full-page extract via title → id → content
    /// resolution, with a raw-HTML fallback when the extract is empty.
    async fn fetch_full(&self, title: &str) -> Result<WikiDocument>;
}

/// HTTP client for the Wikipedia REST and action APIs.
pub struct HttpWikiSource {
    http: Client,
}

// REST summary wire types.
#[derive(Debug, Deserialize)]
struct SummaryResponse {
    #[serde(default)]
    extract: String,
    #[serde(default)]
    content_urls: Option<ContentUrls>,
}

#[derive(Debug, Deserialize)]
struct ContentUrls {
    desktop: Option<DesktopUrls>,
}

#[derive(Debug, Deserialize)]
struct DesktopUrls {
    page: Option<String>,
}

// Action API wire types.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    query: Option<QueryBody>,
}

#[derive(Debug, Deserialize)]
struct QueryBody {
    #[serde(default)]
    pages: std::collections::HashMap<String, QueryPage>,
}

#[derive(Debug, Deserialize)]
struct QueryPage {
    #[serde(default)]
    pageid: Option<i64>,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    fullurl: Option<String>,
}

impl Default for HttpWikiSource {
    fn default() -> Self {
        Self::new(60)
    }
}

impl HttpWikiSource {
    const SERVICE: &'static str = "wikipedia";

    pub fn new(timeout_secs: u64) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();

        Self { http }
    }

    fn subdomain(title: &str) -> &'static str {
        match Language::detect(title) {
            Language::Korean => "ko",
            Language::English => "en",
        }
    }

    fn summary_url(title: &str) -> Result<Url> {
        let base = format!("https://{}.wikipedia.org/api/rest_v1/page/summary/", Self::subdomain(title));
        let mut url = Url::parse(&base)
            .map_err(|e| Error::Config(format!("invalid wiki base url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::Config("wiki base url cannot be a base".to_string()))?
            .push(title);
        Ok(url)
    }

    fn action_url(title: &str) -> Result<Url> {
        let base = format!("https://{}.wikipedia.org/w/api.php", Self::subdomain(title));
        Url::parse(&base).map_err(|e| Error::Config(format!("invalid wiki base url: {}", e)))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::transport(Self::SERVICE, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::transport(
                Self::SERVICE,
                format!("page lookup failed ({})", status),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| Error::parse(Self::SERVICE, format!("Failed to parse response: {}", e)))
    }

    /// Strip tags and collapse whitespace from raw page HTML.
    fn strip_html(html: &str) -> String {
        let tag_re = Regex::new(r"<[^>]+>").expect("valid pattern");
        let without_tags = tag_re.replace_all(html, " ");
        let ws_re = Regex::new(r"\s+").expect("valid pattern");
        ws_re.replace_all(&without_tags, " ").trim().to_string()
    }
}

#[async_trait]
impl WikiSource for HttpWikiSource {
    async fn fetch_summary(&self, title: &str) -> Result<WikiDocument> {
        let url = Self::summary_url(title)?;
        debug!(%title, "fetching page summary");

        let response: SummaryResponse = self.get_json(url).await?;
        let page_url = response
            .content_urls
            .and_then(|c| c.desktop)
            .and_then(|d| d.page)
            .unwrap_or_default();

        Ok(WikiDocument {
            content: response.extract,
            url: page_url,
        })
    }

    async fn fetch_full(&self, title: &str) -> Result<WikiDocument> {
        // Step one: resolve the title to a page id.
        let mut url = Self::action_url(title)?;
        url.query_pairs_mut()
            .append_pair("action", "query")
            .append_pair("format", "json")
            .append_pair("redirects", "1")
            .append_pair("prop", "info")
            .append_pair("inprop", "url")
            .append_pair("titles", title);

        let response: QueryResponse = self.get_json(url).await?;
        let page = response
            .query
            .and_then(|q| q.pages.into_values().next())
            .ok_or_else(|| Error::retrieval(format!("no page found for '{}'", title)))?;
        let pageid = page
            .pageid
            .ok_or_else(|| Error::retrieval(format!("page '{}' has no id", title)))?;
        let page_url = page.fullurl.unwrap_or_default();

        // Step two: fetch the plain-text extract by id.
        let mut url = Self::action_url(title)?;
        url.query_pairs_mut()
            .append_pair("action", "query")
            .append_pair("format", "json")
            .append_pair("prop", "extracts")
            .append_pair("explaintext", "1")
            .append_pair("pageids", &pageid.to_string());

        let response: QueryResponse = self.get_json(url).await?;
        let extract = response
            .query
            .and_then(|q| q.pages.into_values().next())
            .and_then(|p| p.extract)
            .unwrap_or_default();

        if !extract.trim().is_empty() {
            return Ok(WikiDocument {
                content: extract,
                url: page_url,
            });
        }

        // Structured extract empty: fall back to the raw page HTML.
        if page_url.is_empty() {
            return Err(Error::retrieval(format!("empty extract for '{}'", title)));
        }

        debug!(%title, "empty extract, falling back to raw HTML");
        let response = self
            .http
            .get(&page_url)
            .send()
            .await
            .map_err(|e| Error::transport(Self::SERVICE, format!("HTTP request failed: {}", e)))?;
        let html = response
            .text()
            .await
            .map_err(|e| Error::transport(Self::SERVICE, format!("Failed to read page: {}", e)))?;

        Ok(WikiDocument {
            content: Self::strip_html(&html),
            url: page_url,
        })
    }
}
