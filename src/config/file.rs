//! TOML configuration file loading
//!
//! Supports `~/.config/convoscope/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct ConvoscopeConfigFile {
    /// LLM configuration
    #[serde(default)]
    pub llm: LlmFileConfig,

    /// Search tool configuration
    #[serde(default)]
    pub search: SearchFileConfig,

    /// Knowledge graph configuration
    #[serde(default)]
    pub knowledge_graph: KnowledgeGraphFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,
}

/// LLM-related configuration
#[derive(Debug, Default, Deserialize)]
pub struct LlmFileConfig {
    /// OpenAI-compatible base URL
    pub base_url: Option<String>,

    /// Model identifier (e.g. "gpt-4o-mini")
    pub model: Option<String>,

    /// Sampling temperature for conversation turns
    pub temperature: Option<f32>,
}

/// Search tool configuration
#[derive(Debug, Default, Deserialize)]
pub struct SearchFileConfig {
    /// Results to process per query
    pub k: Option<usize>,
    pub gl: Option<String>,
    pub hl: Option<String>,
    pub tbs: Option<String>,
    /// Sentences per page summary
    pub num_sentences: Option<usize>,
    /// "search", "news", "places" or "images"
    pub search_type: Option<String>,
    /// Replaces the default deny-list when set
    pub banned_sites: Option<Vec<String>>,
    pub scrape_timeout_secs: Option<u64>,
}

/// Knowledge graph configuration
#[derive(Debug, Default, Deserialize)]
pub struct KnowledgeGraphFileConfig {
    pub location: Option<String>,
    pub languages: Option<Vec<String>>,
    pub types: Option<Vec<String>>,
    pub limit: Option<u32>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub serper: Option<String>,
    pub openai: Option<String>,
    pub gcp_project_id: Option<String>,
    pub gcp_access_token: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `ConvoscopeConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> ConvoscopeConfigFile {
    config_file_path().map_or_else(ConvoscopeConfigFile::default, |path| {
        load_config_file_from(&path)
    })
}

/// Load a TOML config file from an explicit path
///
/// Returns `ConvoscopeConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file_from(path: &Path) -> ConvoscopeConfigFile {
    if !path.exists() {
        return ConvoscopeConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                ConvoscopeConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            ConvoscopeConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/convoscope/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("convoscope").join("config.toml"))
}
