//! Tools exposed to LLM agents

mod search_tool;
pub mod web;

pub use search_tool::{SearchInput, SearchTool, ToolDefinition};
pub use web::{
    FrequencySummarizer, PageFetcher, PageScraper, SearchResponse, SearchResult, SearchSettings,
    SearchType, SerperClient, Summarizer,
};
