//! Web tools: search, page scraping, summarization and aggregation

pub mod aggregate;
mod fetch;
mod search;
mod summarize;

pub use aggregate::{NO_RESULT_SENTINEL, SearchResult, aggregate, collect_entries, format_entries};
pub use fetch::{PageFetcher, PageScraper, extract_page_text, is_blocked_ip};
pub use search::{
    AnswerBox, DEFAULT_BANNED_SITES, KnowledgeGraphPanel, SERPER_BASE_URL, SearchHit,
    SearchResponse, SearchSettings, SearchType, SerperClient,
};
pub use summarize::{FrequencySummarizer, Summarizer};
