//! Web search via the Serper (Google) API
//!
//! Returns the raw typed result set; formatting for agents lives in
//! [`super::aggregate`].

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default Serper endpoint
pub const SERPER_BASE_URL: &str = "https://google.serper.dev";

/// Sites that never yield scrapable content
pub const DEFAULT_BANNED_SITES: &[&str] = &["calendar.google.com", "researchgate.net"];

/// Serper search vertical
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    /// Organic web results
    #[default]
    Search,
    /// News articles
    News,
    /// Local places
    Places,
    /// Image results
    Images,
}

impl SearchType {
    /// Path segment of the Serper endpoint
    #[must_use]
    pub const fn endpoint(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::News => "news",
            Self::Places => "places",
            Self::Images => "images",
        }
    }

    /// Key of the hit list in the response for this vertical
    #[must_use]
    pub const fn result_key(self) -> &'static str {
        match self {
            Self::Search => "organic",
            Self::News => "news",
            Self::Places => "places",
            Self::Images => "images",
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}

impl FromStr for SearchType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "search" => Ok(Self::Search),
            "news" => Ok(Self::News),
            "places" => Ok(Self::Places),
            "images" => Ok(Self::Images),
            other => Err(Error::Config(format!("unknown search type: {other}"))),
        }
    }
}

/// Settings for one search aggregation run
#[derive(Debug, Clone)]
pub struct SearchSettings {
    /// Number of hits to request and process
    pub k: usize,
    /// Country code (`gl`)
    pub gl: String,
    /// Interface language (`hl`)
    pub hl: String,
    /// Time-based search filter (`tbs`), e.g. `qdr:d`
    pub tbs: Option<String>,
    /// Sentences kept by the page summarizer
    pub num_sentences: usize,
    /// Search vertical
    pub search_type: SearchType,
    /// URL substrings that are never scraped
    pub banned_sites: Vec<String>,
    /// Timeout for a single page scrape
    pub scrape_timeout: Duration,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            k: 5,
            gl: "us".to_string(),
            hl: "en".to_string(),
            tbs: None,
            num_sentences: 10,
            search_type: SearchType::Search,
            banned_sites: DEFAULT_BANNED_SITES.iter().map(ToString::to_string).collect(),
            scrape_timeout: Duration::from_secs(30),
        }
    }
}

/// Serper result set
///
/// Every list defaults to empty so a vertical missing from the response
/// reads as "no hits" rather than a decode failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// Direct answer panel
    #[serde(default)]
    pub answer_box: Option<AnswerBox>,
    /// Recognized entity panel
    #[serde(default)]
    pub knowledge_graph: Option<KnowledgeGraphPanel>,
    #[serde(default)]
    pub organic: Vec<SearchHit>,
    #[serde(default)]
    pub news: Vec<SearchHit>,
    #[serde(default)]
    pub places: Vec<SearchHit>,
    #[serde(default)]
    pub images: Vec<SearchHit>,
}

impl SearchResponse {
    /// Hits for the given vertical
    #[must_use]
    pub fn hits(&self, search_type: SearchType) -> &[SearchHit] {
        match search_type {
            SearchType::Search => &self.organic,
            SearchType::News => &self.news,
            SearchType::Places => &self.places,
            SearchType::Images => &self.images,
        }
    }
}

/// Answer box panel
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerBox {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    /// Either a string or a list of highlighted fragments
    #[serde(default)]
    pub snippet_highlighted: Option<serde_json::Value>,
}

/// Knowledge graph panel
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KnowledgeGraphPanel {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "type")]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Attribute name to value, in provider order
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

/// One hit of any vertical
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
}

/// Serper API request body
#[derive(Debug, Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
    gl: &'a str,
    hl: &'a str,
    num: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    tbs: Option<&'a str>,
}

/// Serper search client
pub struct SerperClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl SerperClient {
    /// Create a client against the public Serper endpoint
    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, SERPER_BASE_URL.to_string())
    }

    /// Create a client against a custom endpoint
    #[must_use]
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Full URL for a search vertical
    #[must_use]
    pub fn endpoint(&self, search_type: SearchType) -> String {
        format!("{}/{}", self.base_url, search_type.endpoint())
    }

    /// Run a search
    ///
    /// # Errors
    ///
    /// Returns error if the request fails, the provider answers with a
    /// non-success status, or the body is not a valid result set
    #[tracing::instrument(skip(self, settings), fields(search_type = %settings.search_type))]
    pub async fn search(&self, query: &str, settings: &SearchSettings) -> Result<SearchResponse> {
        let body = SerperRequest {
            q: query,
            gl: &settings.gl,
            hl: &settings.hl,
            num: settings.k,
            tbs: settings.tbs.as_deref(),
        };

        let response = self
            .client
            .post(self.endpoint(settings.search_type))
            .header("X-API-KEY", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let response = response.error_for_status().map_err(Error::Http)?;

        let results: SearchResponse = response
            .json()
            .await
            .map_err(|e| Error::Search(format!("invalid result set: {e}")))?;

        tracing::debug!(
            hits = results.hits(settings.search_type).len(),
            answer_box = results.answer_box.is_some(),
            knowledge_graph = results.knowledge_graph.is_some(),
            "search results received"
        );

        Ok(results)
    }
}
