//! Configuration management for Convoscope agents
//!
//! Environment variables override the TOML file, which overrides defaults.

pub mod file;

use std::time::Duration;

use self::file::ConvoscopeConfigFile;
use crate::knowledge::KnowledgeGraphSettings;
use crate::tools::{SearchSettings, SearchType};
use crate::{Error, Result};

/// Default OpenAI-compatible endpoint
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

/// Agent configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// API keys
    pub api_keys: ApiKeys,

    /// LLM endpoint and sampling
    pub llm: LlmConfig,

    /// Search tool settings
    pub search: SearchSettings,

    /// Knowledge graph defaults
    pub knowledge_graph: KnowledgeGraphSettings,
}

/// API keys for external services
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// Serper (Google search) API key
    pub serper: Option<String>,

    /// `OpenAI` API key
    pub openai: Option<String>,

    /// GCP project hosting the knowledge graph API
    pub gcp_project_id: Option<String>,

    /// GCP OAuth access token
    pub gcp_access_token: Option<String>,
}

/// LLM configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: OPENAI_BASE_URL.to_string(),
            model: DEFAULT_LLM_MODEL.to_string(),
            temperature: crate::agent::convo::DEFAULT_TEMPERATURE,
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: Option<String>) -> Result<Option<T>> {
    value
        .map(|v| {
            v.trim()
                .parse()
                .map_err(|_| Error::Config(format!("invalid value for {name}: {v}")))
        })
        .transpose()
}

fn require<'a>(value: Option<&'a String>, what: &str, var: &str) -> Result<&'a str> {
    value
        .map(String::as_str)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::Config(format!("{what} not configured (set {var})")))
}

impl Config {
    /// Load configuration from the config file and process environment
    ///
    /// # Errors
    ///
    /// Returns error if a value is malformed or out of range
    pub fn load() -> Result<Self> {
        Self::from_sources(file::load_config_file(), |name| std::env::var(name).ok())
    }

    /// Build configuration from a parsed file and an environment lookup
    ///
    /// # Errors
    ///
    /// Returns error if a value is malformed or out of range
    pub fn from_sources<F>(fc: ConvoscopeConfigFile, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_keys = ApiKeys {
            serper: env("SERPER_API_KEY").or(fc.api_keys.serper),
            openai: env("OPENAI_API_KEY").or(fc.api_keys.openai),
            gcp_project_id: env("GCP_PROJECT_ID").or(fc.api_keys.gcp_project_id),
            gcp_access_token: env("GCP_ACCESS_TOKEN").or(fc.api_keys.gcp_access_token),
        };

        let llm_defaults = LlmConfig::default();
        let llm = LlmConfig {
            base_url: env("CONVOSCOPE_LLM_BASE_URL")
                .or(fc.llm.base_url)
                .unwrap_or(llm_defaults.base_url),
            model: env("CONVOSCOPE_LLM_MODEL")
                .or(fc.llm.model)
                .unwrap_or(llm_defaults.model),
            temperature: parse_env("CONVOSCOPE_LLM_TEMPERATURE", env("CONVOSCOPE_LLM_TEMPERATURE"))?
                .or(fc.llm.temperature)
                .unwrap_or(llm_defaults.temperature),
        };

        if !(0.0..=2.0).contains(&llm.temperature) {
            return Err(Error::Config(format!(
                "LLM temperature must be within 0.0..=2.0, got {}",
                llm.temperature
            )));
        }

        let search_defaults = SearchSettings::default();
        let search_type = match env("CONVOSCOPE_SEARCH_TYPE").or(fc.search.search_type) {
            Some(value) => value.parse::<SearchType>()?,
            None => search_defaults.search_type,
        };
        let search = SearchSettings {
            k: parse_env("CONVOSCOPE_SEARCH_K", env("CONVOSCOPE_SEARCH_K"))?
                .or(fc.search.k)
                .unwrap_or(search_defaults.k),
            gl: env("CONVOSCOPE_SEARCH_GL")
                .or(fc.search.gl)
                .unwrap_or(search_defaults.gl),
            hl: env("CONVOSCOPE_SEARCH_HL")
                .or(fc.search.hl)
                .unwrap_or(search_defaults.hl),
            tbs: env("CONVOSCOPE_SEARCH_TBS").or(fc.search.tbs),
            num_sentences: fc.search.num_sentences.unwrap_or(search_defaults.num_sentences),
            search_type,
            banned_sites: fc.search.banned_sites.unwrap_or(search_defaults.banned_sites),
            scrape_timeout: fc
                .search
                .scrape_timeout_secs
                .map_or(search_defaults.scrape_timeout, Duration::from_secs),
        };

        if search.k == 0 {
            return Err(Error::Config("search k must be at least 1".to_string()));
        }
        if search.scrape_timeout.is_zero() {
            return Err(Error::Config("scrape timeout must be non-zero".to_string()));
        }

        let kg_defaults = KnowledgeGraphSettings::default();
        let knowledge_graph = KnowledgeGraphSettings {
            location: fc.knowledge_graph.location.unwrap_or(kg_defaults.location),
            languages: fc.knowledge_graph.languages.unwrap_or(kg_defaults.languages),
            types: fc.knowledge_graph.types.unwrap_or(kg_defaults.types),
            limit: fc.knowledge_graph.limit.unwrap_or(kg_defaults.limit),
            base_url: kg_defaults.base_url,
        };

        Ok(Self {
            api_keys,
            llm,
            search,
            knowledge_graph,
        })
    }

    /// Serper API key
    ///
    /// # Errors
    ///
    /// Returns error if the key is not configured
    pub fn serper_api_key(&self) -> Result<&str> {
        require(self.api_keys.serper.as_ref(), "Serper API key", "SERPER_API_KEY")
    }

    /// `OpenAI` API key
    ///
    /// # Errors
    ///
    /// Returns error if the key is not configured
    pub fn openai_api_key(&self) -> Result<&str> {
        require(self.api_keys.openai.as_ref(), "OpenAI API key", "OPENAI_API_KEY")
    }

    /// GCP project ID and access token for the knowledge graph
    ///
    /// # Errors
    ///
    /// Returns error if either value is not configured
    pub fn gcp_credentials(&self) -> Result<(&str, &str)> {
        Ok((
            require(self.api_keys.gcp_project_id.as_ref(), "GCP project ID", "GCP_PROJECT_ID")?,
            require(
                self.api_keys.gcp_access_token.as_ref(),
                "GCP access token",
                "GCP_ACCESS_TOKEN",
            )?,
        ))
    }
}
