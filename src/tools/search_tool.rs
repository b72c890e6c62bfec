//! `Search_Engine` tool for agents
//!
//! Wraps search, page scraping and summarization into a single call that
//! returns an LLM-ready text block. The blocking and async entry points share
//! one code path.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::web::{
    FrequencySummarizer, PageFetcher, PageScraper, SearchResponse, SearchSettings, SerperClient,
    Summarizer, aggregate,
};
use crate::{Error, Result};

/// Tool name as registered with agents
pub const TOOL_NAME: &str = "Search_Engine";

const TOOL_DESCRIPTION: &str = "Pass this specific targeted queries and/or keywords to quickly search the WWW to retrieve vast amounts of information on virtually any topic, spanning from academic research and navigation to history, entertainment, and current events. It's a tool for understanding, navigating, and engaging with the digital world's vast knowledge.";

/// Tool definition handed to an agent framework
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema of the tool arguments
    pub input_schema: serde_json::Value,
}

/// Tool arguments
#[derive(Debug, Clone, Deserialize)]
pub struct SearchInput {
    /// A search query
    pub query: String,
}

/// Search aggregation tool
pub struct SearchTool {
    client: SerperClient,
    fetcher: Box<dyn PageFetcher>,
    summarizer: Box<dyn Summarizer>,
    settings: SearchSettings,
}

impl SearchTool {
    /// Create the tool with the HTTP page scraper and frequency summarizer
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty or the scraper cannot be built
    pub fn new(api_key: String, settings: SearchSettings) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config("Serper API key required for search".to_string()));
        }

        let fetcher = PageScraper::new(&settings)?;
        Ok(Self::with_components(
            SerperClient::new(api_key),
            Box::new(fetcher),
            Box::new(FrequencySummarizer),
            settings,
        ))
    }

    /// Create the tool from explicit components
    #[must_use]
    pub fn with_components(
        client: SerperClient,
        fetcher: Box<dyn PageFetcher>,
        summarizer: Box<dyn Summarizer>,
        settings: SearchSettings,
    ) -> Self {
        Self {
            client,
            fetcher,
            summarizer,
            settings,
        }
    }

    /// Settings used for every run
    #[must_use]
    pub const fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Agent-facing definition of this tool
    #[must_use]
    pub fn definition() -> ToolDefinition {
        ToolDefinition {
            name: TOOL_NAME.to_string(),
            description: TOOL_DESCRIPTION.to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "a search query"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    /// Search and aggregate
    ///
    /// Scrape failures degrade to snippet-only entries; a failed search
    /// request is returned as an error.
    ///
    /// # Errors
    ///
    /// Returns error if the search request fails
    #[tracing::instrument(skip(self))]
    pub async fn run(&self, query: &str) -> Result<String> {
        let started = Instant::now();

        let results = self.client.search(query, &self.settings).await?;
        let output = self.format_results(&results).await;

        tracing::debug!(
            elapsed_ms = started.elapsed().as_millis(),
            output_len = output.len(),
            "search tool finished"
        );

        Ok(output)
    }

    /// Blocking variant of [`Self::run`]
    ///
    /// Drives the async pipeline on a private current-thread runtime, so it
    /// must not be called from within an async context.
    ///
    /// # Errors
    ///
    /// Returns error if the runtime cannot be built or the search request fails
    pub fn run_blocking(&self, query: &str) -> Result<String> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        runtime.block_on(self.run(query))
    }

    /// Aggregate an already fetched result set
    pub async fn format_results(&self, results: &SearchResponse) -> String {
        aggregate(
            results,
            &self.settings,
            self.fetcher.as_ref(),
            self.summarizer.as_ref(),
        )
        .await
    }

    /// Execute with JSON-encoded [`SearchInput`] arguments
    ///
    /// # Errors
    ///
    /// Returns error if the arguments are malformed or the search fails
    pub async fn execute(&self, arguments: &str) -> Result<String> {
        let input: SearchInput = serde_json::from_str(arguments)?;
        self.run(&input.query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_api_key() {
        let result = SearchTool::new(String::new(), SearchSettings::default());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_definition_schema() {
        let definition = SearchTool::definition();
        assert_eq!(definition.name, "Search_Engine");
        assert_eq!(definition.input_schema["required"][0], "query");
        assert_eq!(definition.input_schema["properties"]["query"]["type"], "string");
    }

    #[tokio::test]
    async fn test_execute_rejects_bad_arguments() {
        let tool = SearchTool::new("key".to_string(), SearchSettings::default()).unwrap();
        let result = tool.execute(r#"{"q": "missing field"}"#).await;
        assert!(matches!(result, Err(Error::Serialization(_))));
    }
}
