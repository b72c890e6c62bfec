//! Public knowledge graph lookup
//!
//! Thin client for the Enterprise Knowledge Graph public entity search.
//! Responses are returned raw; callers decide what to read from them.

use serde_json::Value;

use crate::{Error, Result};

/// Default Enterprise Knowledge Graph endpoint
pub const KNOWLEDGE_GRAPH_BASE_URL: &str = "https://enterpriseknowledgegraph.googleapis.com";

/// Defaults applied to queries that leave a filter unset
#[derive(Debug, Clone)]
pub struct KnowledgeGraphSettings {
    /// Service location (only `global` is offered today)
    pub location: String,
    /// ISO 639-1 language codes
    pub languages: Vec<String>,
    /// schema.org types to return
    pub types: Vec<String>,
    /// Number of entities to return
    pub limit: u32,
    pub base_url: String,
}

impl Default for KnowledgeGraphSettings {
    fn default() -> Self {
        Self {
            location: "global".to_string(),
            languages: vec!["en".to_string()],
            types: Vec::new(),
            limit: 1,
            base_url: KNOWLEDGE_GRAPH_BASE_URL.to_string(),
        }
    }
}

/// One entity search
#[derive(Debug, Clone, Default)]
pub struct KgQuery {
    pub query: String,
    pub languages: Option<Vec<String>>,
    pub types: Option<Vec<String>>,
    pub limit: Option<u32>,
}

impl KgQuery {
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }
}

/// Knowledge graph client
pub struct KnowledgeGraphClient {
    client: reqwest::Client,
    project_id: String,
    access_token: String,
    settings: KnowledgeGraphSettings,
}

impl KnowledgeGraphClient {
    /// Create a client
    ///
    /// # Errors
    ///
    /// Returns error if the project ID or access token is empty
    pub fn new(
        project_id: String,
        access_token: String,
        settings: KnowledgeGraphSettings,
    ) -> Result<Self> {
        if project_id.is_empty() {
            return Err(Error::Config(
                "GCP project ID required for knowledge graph".to_string(),
            ));
        }
        if access_token.is_empty() {
            return Err(Error::Config(
                "GCP access token required for knowledge graph".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            project_id,
            access_token,
            settings,
        })
    }

    /// Resource name of the location, `projects/{project}/locations/{location}`
    #[must_use]
    pub fn parent(&self) -> String {
        format!(
            "projects/{}/locations/{}",
            self.project_id, self.settings.location
        )
    }

    /// Full search URL
    #[must_use]
    pub fn search_url(&self) -> String {
        format!(
            "{}/v1/{}/publicKnowledgeGraphEntities:Search",
            self.settings.base_url.trim_end_matches('/'),
            self.parent()
        )
    }

    /// Query string pairs with settings applied for unset filters
    #[must_use]
    pub fn query_pairs(&self, query: &KgQuery) -> Vec<(&'static str, String)> {
        let languages = query.languages.as_ref().unwrap_or(&self.settings.languages);
        let types = query.types.as_ref().unwrap_or(&self.settings.types);
        let limit = query.limit.unwrap_or(self.settings.limit);

        let mut pairs = vec![("query", query.query.clone())];
        pairs.extend(languages.iter().map(|l| ("languages", l.clone())));
        pairs.extend(
            types
                .iter()
                .filter(|t| !t.is_empty())
                .map(|t| ("types", t.clone())),
        );
        pairs.push(("limit", limit.to_string()));
        pairs
    }

    /// Search, propagating any failure
    ///
    /// Uses a blocking HTTP client; do not call from within an async runtime.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response is not JSON
    pub fn search_blocking(&self, query: &KgQuery) -> Result<Value> {
        let response = reqwest::blocking::Client::new()
            .get(self.search_url())
            .bearer_auth(&self.access_token)
            .query(&self.query_pairs(query))
            .send()?
            .error_for_status()?;

        Ok(response.json()?)
    }

    /// Search, returning `None` on any failure
    pub async fn search(&self, query: &KgQuery) -> Option<Value> {
        match self.try_search(query).await {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(query = %query.query, error = %e, "knowledge graph search failed");
                None
            }
        }
    }

    async fn try_search(&self, query: &KgQuery) -> Result<Value> {
        let response = self
            .client
            .get(self.search_url())
            .bearer_auth(&self.access_token)
            .query(&self.query_pairs(query))
            .send()
            .await?;

        let response = response
            .error_for_status()
            .map_err(|e| Error::KnowledgeGraph(e.to_string()))?;

        Ok(response.json().await?)
    }
}
