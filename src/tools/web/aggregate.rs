//! Search result aggregation for LLM agents
//!
//! Turns a Serper result set into enumerated `<resultN>` blocks:
//! answer box first, then knowledge graph facts, then one entry per hit
//! with a summary of the scraped page (or the bare snippet when the page
//! could not be scraped).

use futures::future::join_all;

use super::fetch::PageFetcher;
use super::search::{AnswerBox, KnowledgeGraphPanel, SearchHit, SearchResponse, SearchSettings};
use super::summarize::Summarizer;

/// Entry returned when nothing usable was found
pub const NO_RESULT_SENTINEL: &str = "No good Google Search Result was found";

/// Processing record for one search hit
#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
    /// Scraped page text, when the fetch succeeded
    pub page_text: Option<String>,
    /// Page summary, when the fetch succeeded
    pub summary: Option<String>,
}

impl SearchResult {
    /// Render as an agent-facing entry
    #[must_use]
    pub fn to_entry(&self) -> String {
        match (&self.page_text, &self.summary) {
            (Some(_), summary) => {
                let summary = summary.as_deref().filter(|s| !s.is_empty()).unwrap_or("None");
                format!(
                    "Title: {}\nSource:{}\nSnippet: {}\nSummarized Page: {}",
                    self.title, self.link, self.snippet, summary
                )
            }
            (None, _) => format!("Title: {}\nPossible answers: {}\n", self.title, self.snippet),
        }
    }
}

/// Direct answer text, preferring the exact answer, then the highlighted
/// snippet, then the plain snippet
#[must_use]
pub fn answer_box_text(answer_box: &AnswerBox) -> Option<String> {
    if let Some(answer) = answer_box.answer.as_deref().filter(|a| !a.is_empty()) {
        return Some(answer.to_string());
    }

    let highlighted = match &answer_box.snippet_highlighted {
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(serde_json::Value::Array(parts)) => Some(
            parts
                .iter()
                .filter_map(serde_json::Value::as_str)
                .collect::<Vec<_>>()
                .join(" "),
        ),
        _ => None,
    };
    if let Some(highlighted) = highlighted.filter(|h| !h.is_empty()) {
        return Some(highlighted);
    }

    answer_box
        .snippet
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(|s| s.replace('\n', " "))
}

/// Facts from a knowledge graph panel: type line, description, attributes
#[must_use]
pub fn knowledge_graph_entries(kg: &KnowledgeGraphPanel) -> Vec<String> {
    let title = kg.title.as_deref().unwrap_or_default();
    let mut entries = Vec::new();

    if let Some(entity_type) = kg.entity_type.as_deref().filter(|t| !t.is_empty()) {
        entries.push(format!("{title}: {entity_type}."));
    }

    if let Some(description) = kg.description.as_deref().filter(|d| !d.is_empty()) {
        entries.push(description.to_string());
    }

    for (attribute, value) in &kg.attributes {
        let value = match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        entries.push(format!("{title} {attribute}: {value}."));
    }

    entries
}

async fn process_hit(
    hit: &SearchHit,
    snippet: &str,
    settings: &SearchSettings,
    fetcher: &dyn PageFetcher,
    summarizer: &dyn Summarizer,
) -> SearchResult {
    let mut result = SearchResult {
        title: hit.title.clone().unwrap_or_default(),
        link: hit.link.clone().unwrap_or_default(),
        snippet: snippet.to_string(),
        page_text: None,
        summary: None,
    };

    let Some(link) = hit.link.as_deref() else {
        return result;
    };

    match fetcher.fetch_text(link).await {
        Ok(text) => {
            result.summary = Some(summarizer.summarize(&text, settings.num_sentences));
            result.page_text = Some(text);
        }
        Err(e) => {
            tracing::warn!(url = link, error = %e, "page scrape failed, using snippet");
        }
    }

    result
}

/// Build the entry list for a result set
///
/// Never returns an empty list: when nothing was produced the
/// [`NO_RESULT_SENTINEL`] entry is returned instead.
pub async fn collect_entries(
    results: &SearchResponse,
    settings: &SearchSettings,
    fetcher: &dyn PageFetcher,
    summarizer: &dyn Summarizer,
) -> Vec<String> {
    let mut entries = Vec::new();

    if let Some(text) = results.answer_box.as_ref().and_then(answer_box_text) {
        entries.push(text);
    }

    if let Some(kg) = &results.knowledge_graph {
        entries.extend(knowledge_graph_entries(kg));
    }

    let hits = results.hits(settings.search_type);
    let pending = hits
        .iter()
        .take(settings.k)
        .filter_map(|hit| hit.snippet.as_deref().map(|snippet| (hit, snippet)))
        .map(|(hit, snippet)| process_hit(hit, snippet, settings, fetcher, summarizer));

    entries.extend(join_all(pending).await.iter().map(SearchResult::to_entry));

    if entries.is_empty() {
        return vec![NO_RESULT_SENTINEL.to_string()];
    }

    entries
}

/// Wrap entries as enumerated `<resultN>` blocks
#[must_use]
pub fn format_entries(entries: &[String]) -> String {
    entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| format!("<result{idx}>\n{entry}\n</result{idx}>\n\n"))
        .collect()
}

/// Aggregate a result set into the agent-facing text block
pub async fn aggregate(
    results: &SearchResponse,
    settings: &SearchSettings,
    fetcher: &dyn PageFetcher,
    summarizer: &dyn Summarizer,
) -> String {
    let entries = collect_entries(results, settings, fetcher, summarizer).await;
    format_entries(&entries)
}
