//! Service client configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::time::Duration;
use url::Url;

use manualqa_core::{Error, Result};

const DEFAULT_GROQ_API_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_GROQ_MODEL: &str = "llama-3.1-8b-instant";

const DEFAULT_EMBEDDING_API_URL: &str = "http://localhost:11434/v1";
const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";
const DEFAULT_EMBEDDING_DIM: usize = 768;
const DEFAULT_EMBEDDING_TIMEOUT_SECS: u64 = 30;

/// Configuration for the Groq chat completions client
#[derive(Clone, Serialize, Deserialize)]
pub struct GroqConfig {
    #[serde(skip_serializing)]
    pub api_key: String,
    pub model: String,
    pub api_url: String,
}

impl GroqConfig {
    /// Create configuration from environment variables
    ///
    /// `GROQ_API_KEY` is required; `GROQ_MODEL` and `GROQ_API_URL` are optional.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_key = env::var("GROQ_API_KEY").map_err(|_| {
            Error::Configuration("GROQ_API_KEY environment variable not found".to_string())
        })?;

        let model = env::var("GROQ_MODEL").unwrap_or_else(|_| DEFAULT_GROQ_MODEL.to_string());

        let api_url =
            env::var("GROQ_API_URL").unwrap_or_else(|_| DEFAULT_GROQ_API_URL.to_string());

        let config = Self {
            api_key,
            model,
            api_url,
        };
        config.validate()?;
        Ok(config)
    }

    /// Create configuration with explicit values
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: DEFAULT_GROQ_MODEL.to_string(),
            api_url: DEFAULT_GROQ_API_URL.to_string(),
        }
    }

    /// Reject configurations no request could be built from
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::Configuration("GROQ_API_KEY is empty".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(Error::Configuration("GROQ_MODEL is empty".to_string()));
        }
        parse_base_url("GROQ_API_URL", &self.api_url)?;
        Ok(())
    }
}

impl fmt::Debug for GroqConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroqConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// Configuration for the OpenAI-compatible embeddings client
#[derive(Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub api_url: String,
    pub model: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub dimension: usize,
    pub timeout: Duration,
}

impl EmbeddingConfig {
    /// Create configuration from environment variables
    ///
    /// All variables are optional: `EMBEDDING_API_URL`, `EMBEDDING_MODEL`,
    /// `EMBEDDING_API_KEY`, `EMBEDDING_DIM`, `EMBEDDING_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_url = env::var("EMBEDDING_API_URL")
            .unwrap_or_else(|_| DEFAULT_EMBEDDING_API_URL.to_string());

        let model =
            env::var("EMBEDDING_MODEL").unwrap_or_else(|_| DEFAULT_EMBEDDING_MODEL.to_string());

        let api_key = env::var("EMBEDDING_API_KEY").ok().filter(|k| !k.is_empty());

        let dimension = match env::var("EMBEDDING_DIM") {
            Ok(raw) => raw.trim().parse().map_err(|_| {
                Error::Configuration(format!("EMBEDDING_DIM must be a positive integer, got '{}'", raw))
            })?,
            Err(_) => DEFAULT_EMBEDDING_DIM,
        };

        let timeout_secs = match env::var("EMBEDDING_TIMEOUT_SECS") {
            Ok(raw) => raw.trim().parse().map_err(|_| {
                Error::Configuration(format!(
                    "EMBEDDING_TIMEOUT_SECS must be a positive integer, got '{}'",
                    raw
                ))
            })?,
            Err(_) => DEFAULT_EMBEDDING_TIMEOUT_SECS,
        };

        let config = Self {
            api_url,
            model,
            api_key,
            dimension,
            timeout: Duration::from_secs(timeout_secs),
        };
        config.validate()?;
        Ok(config)
    }

    /// Create configuration with explicit values
    pub fn new(api_url: String, model: String, dimension: usize) -> Self {
        Self {
            api_url,
            model,
            api_key: None,
            dimension,
            timeout: Duration::from_secs(DEFAULT_EMBEDDING_TIMEOUT_SECS),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.dimension == 0 {
            return Err(Error::Configuration("EMBEDDING_DIM must be greater than zero".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(Error::Configuration(
                "EMBEDDING_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }
        parse_base_url("EMBEDDING_API_URL", &self.api_url)?;
        Ok(())
    }
}

impl fmt::Debug for EmbeddingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingConfig")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("dimension", &self.dimension)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn parse_base_url(name: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| Error::Configuration(format!("{} '{}' is not a valid URL: {}", name, raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::Configuration(format!(
            "{} must use http or https, got '{}'",
            name, other
        ))),
    }
}

/// Join an endpoint path onto a configured base URL
pub(crate) fn endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groq_config_validation() {
        assert!(GroqConfig::new("gsk_test".to_string()).validate().is_ok());
        assert!(matches!(
            GroqConfig::new("  ".to_string()).validate(),
            Err(Error::Configuration(_))
        ));

        let mut config = GroqConfig::new("gsk_test".to_string());
        config.api_url = "ftp://api.groq.com".to_string();
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_embedding_config_validation() {
        let config = EmbeddingConfig::new(
            "http://localhost:11434/v1".to_string(),
            "nomic-embed-text".to_string(),
            0,
        );
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));

        let config = EmbeddingConfig::new("not a url".to_string(), "m".to_string(), 4);
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_endpoint_join() {
        assert_eq!(
            endpoint("https://api.groq.com/openai/v1/", "/chat/completions"),
            "https://api.groq.com/openai/v1/chat/completions"
        );
    }
}
