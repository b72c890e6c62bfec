//! Error types for Convoscope agents

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the agent pipelines
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Search provider error
    #[error("search error: {0}")]
    Search(String),

    /// Page fetch error (denied site, SSRF protection, request failures)
    #[error("web fetch error: {0}")]
    WebFetch(String),

    /// LLM provider error
    #[error("llm error: {0}")]
    Llm(String),

    /// Knowledge graph error
    #[error("knowledge graph error: {0}")]
    KnowledgeGraph(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
