use std::env;
use std::str::FromStr;

use crate::error::NatureCardError;

pub const DEFAULT_INATURALIST_URL: &str = "https://api.inaturalist.org/v1";
pub const DEFAULT_GBIF_URL: &str = "https://api.gbif.org/v1";
pub const DEFAULT_LLM_GATEWAY_URL: &str = "http://localhost:18789/v1";
pub const DEFAULT_LLM_MODEL: &str = "anthropic/claude-sonnet-4-5";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Species providers
    pub inaturalist_base_url: String,
    pub gbif_base_url: String,
    pub provider_timeout_secs: u64,
    pub fetch_concurrency: usize,

    // Card text generation
    pub llm_gateway_url: String,
    pub llm_gateway_token: String,
    pub llm_model: String,

    // Web server
    pub web_host: String,
    pub web_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inaturalist_base_url: DEFAULT_INATURALIST_URL.to_string(),
            gbif_base_url: DEFAULT_GBIF_URL.to_string(),
            provider_timeout_secs: 10,
            fetch_concurrency: 5,
            llm_gateway_url: DEFAULT_LLM_GATEWAY_URL.to_string(),
            llm_gateway_token: String::new(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            web_host: "0.0.0.0".to_string(),
            web_port: 3000,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, NatureCardError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, NatureCardError> {
        let defaults = Self::default();
        let get = |key: &str, default: String| lookup(key).unwrap_or(default);

        Ok(Self {
            inaturalist_base_url: get("INATURALIST_BASE_URL", defaults.inaturalist_base_url),
            gbif_base_url: get("GBIF_BASE_URL", defaults.gbif_base_url),
            provider_timeout_secs: parse_var(
                &lookup,
                "PROVIDER_TIMEOUT_SECS",
                defaults.provider_timeout_secs,
            )?,
            fetch_concurrency: parse_var(&lookup, "FETCH_CONCURRENCY", defaults.fetch_concurrency)?
                .max(1),
            llm_gateway_url: get("LLM_GATEWAY_URL", defaults.llm_gateway_url),
            llm_gateway_token: get("LLM_GATEWAY_TOKEN", defaults.llm_gateway_token),
            llm_model: get("LLM_MODEL", defaults.llm_model),
            web_host: get("WEB_HOST", defaults.web_host),
            web_port: parse_var(&lookup, "WEB_PORT", defaults.web_port)?,
        })
    }

    /// Card generation is disabled when no gateway token is configured.
    pub fn card_generation_enabled(&self) -> bool {
        !self.llm_gateway_token.is_empty()
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, NatureCardError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| NatureCardError::Config(format!("{key} must be a number, got {raw:?}"))),
        None => Ok(default),
    }
}
