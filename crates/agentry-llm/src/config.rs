//! Client configuration
//!
//! Settings are layered: built-in defaults, then `AGENTRY_*` environment
//! variables, then provider API keys. A `.env` file in the working directory
//! is loaded first when present.

use crate::error::{LlmError, LlmResult};
use serde::Deserialize;
use std::time::Duration;

/// Default OpenAI endpoint
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Gemini's OpenAI-compatible endpoint
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Hosted provider behind the OpenAI-compatible protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// api.openai.com or any compatible server
    OpenAi,
    /// Google Gemini through its compatibility layer
    Gemini,
}

impl std::str::FromStr for Provider {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "gemini" => Ok(Self::Gemini),
            other => Err(LlmError::configuration(format!(
                "unsupported provider '{}'",
                other
            ))),
        }
    }
}

/// Configuration for [`crate::Client`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Provider the endpoint belongs to
    pub provider: Provider,

    /// Base URL without trailing slash, e.g. `https://api.openai.com/v1`
    pub base_url: String,

    /// Bearer token
    pub api_key: String,

    /// Default chat model
    pub model: String,

    /// Default embedding model
    pub embedding_model: String,

    /// Request timeout
    pub timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    base_url: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
    embedding_model: String,
    timeout_secs: u64,
}

impl ClientConfig {
    /// Create a configuration for an OpenAI-compatible endpoint
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            provider: Provider::OpenAi,
            base_url: OPENAI_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Create a configuration for Gemini's compatibility endpoint
    pub fn gemini(api_key: impl Into<String>) -> Self {
        Self {
            provider: Provider::Gemini,
            base_url: GEMINI_BASE_URL.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            ..Self::new(api_key)
        }
    }

    /// Load from `.env`, `AGENTRY_*` variables and provider API keys
    pub fn from_env() -> LlmResult<Self> {
        dotenv::dotenv().ok();

        Self::load(
            config::Environment::with_prefix("AGENTRY"),
            std::env::var("OPENAI_API_KEY").ok(),
            std::env::var("GEMINI_API_KEY").ok(),
        )
    }

    /// Load for an explicitly chosen provider
    pub fn for_provider(provider: Provider) -> LlmResult<Self> {
        let config = Self::from_env()?;
        if config.provider == provider {
            return Ok(config);
        }

        match provider {
            Provider::Gemini => {
                let key = std::env::var("GEMINI_API_KEY")
                    .map_err(|_| LlmError::configuration("GEMINI_API_KEY is not set"))?;
                Ok(Self::gemini(key))
            }
            Provider::OpenAi => {
                let key = std::env::var("OPENAI_API_KEY")
                    .map_err(|_| LlmError::configuration("OPENAI_API_KEY is not set"))?;
                Ok(Self::new(key))
            }
        }
    }

    fn load(
        environment: config::Environment,
        openai_key: Option<String>,
        gemini_key: Option<String>,
    ) -> LlmResult<Self> {
        let raw: RawConfig = config::Config::builder()
            .set_default("embedding_model", DEFAULT_EMBEDDING_MODEL)?
            .set_default("timeout_secs", 60)?
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        let mut config = match (raw.api_key, openai_key, gemini_key) {
            (Some(key), _, _) | (None, Some(key), _) => Self::new(key),
            (None, None, Some(key)) => Self::gemini(key),
            (None, None, None) => {
                return Err(LlmError::configuration(
                    "OPENAI_API_KEY is not set. Please ensure it is defined in your .env file.",
                ))
            }
        };

        if let Some(base_url) = raw.base_url {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(model) = raw.model {
            config.model = model;
        }
        config.embedding_model = raw.embedding_model;
        config.timeout = Duration::from_secs(raw.timeout_secs);

        Ok(config)
    }

    /// Set the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the default chat model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the default embedding model
    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        config::Environment::with_prefix("AGENTRY").source(Some(map))
    }

    #[test]
    fn test_defaults_with_openai_key() {
        let config = ClientConfig::load(env(&[]), Some("sk-test".into()), None).unwrap();

        assert_eq!(config.provider, Provider::OpenAi);
        assert_eq!(config.base_url, OPENAI_BASE_URL);
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.embedding_model, "text-embedding-3-small");
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_gemini_key_switches_endpoint() {
        let config = ClientConfig::load(env(&[]), None, Some("g-key".into())).unwrap();

        assert_eq!(config.provider, Provider::Gemini);
        assert_eq!(config.base_url, GEMINI_BASE_URL);
        assert_eq!(config.api_key, "g-key");
    }

    #[test]
    fn test_environment_overrides() {
        let config = ClientConfig::load(
            env(&[
                ("AGENTRY_BASE_URL", "http://localhost:11434/v1/"),
                ("AGENTRY_MODEL", "llama3.2"),
                ("AGENTRY_TIMEOUT_SECS", "5"),
            ]),
            Some("sk-test".into()),
            None,
        )
        .unwrap();

        assert_eq!(config.base_url, "http://localhost:11434/v1");
        assert_eq!(config.model, "llama3.2");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_missing_key_is_error() {
        let err = ClientConfig::load(env(&[]), None, None).unwrap_err();
        assert!(matches!(err, LlmError::Configuration { .. }));
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("Gemini".parse::<Provider>().unwrap(), Provider::Gemini);
        assert!("anthropic".parse::<Provider>().is_err());
    }
}
