//! Convoscope Agents - conversational agent glue for a language-learning assistant
//!
//! This library provides the agent-side pipelines:
//! - Contextual conversation prompts for language learners (LLM + schema parsing)
//! - A web search tool that scrapes and summarizes results for LLM agents
//! - Public knowledge graph lookups
//! - Wake word detection in transcripts
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                      Callers                         │
//! │    Agent framework  │  Transcription  │  CLI         │
//! └──────────┬──────────────────┬───────────────┬────────┘
//!            │                  │               │
//! ┌──────────▼─────────┐ ┌──────▼──────┐ ┌──────▼───────┐
//! │ agent::ConvoAgent  │ │ voice::     │ │ tools::      │
//! │ tools::SearchTool  │ │ WakeWord    │ │ knowledge::  │
//! └──────────┬─────────┘ └─────────────┘ └──────┬───────┘
//!            │                                  │
//! ┌──────────▼──────────────────────────────────▼───────┐
//! │   LLM API  │  Serper  │  Web pages  │  Knowledge KG  │
//! └──────────────────────────────────────────────────────┘
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod knowledge;
pub mod llm;
pub mod tools;
pub mod voice;

pub use agent::{
    ConversationTurn, ConvoAgent, ConvoOutcome, ConvoReply, ConvoRequest, ConvoResponse,
    TtsRequest,
};
pub use config::Config;
pub use error::{Error, Result};
pub use knowledge::{KgQuery, KnowledgeGraphClient, KnowledgeGraphSettings};
pub use llm::{LlmClient, OpenAiChatClient};
pub use tools::{
    FrequencySummarizer, PageFetcher, PageScraper, SearchResponse, SearchResult, SearchSettings,
    SearchTool, SearchType, SerperClient, Summarizer,
};
pub use voice::{
    WakeWordDetector, WakeWordMatch, does_text_contain_wake_word,
    get_explicit_query_from_transcript,
};
