//! Groq chat completions client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use manualqa_core::{Error, GenerationConfig, LanguageModel, Result};

use crate::config::{endpoint, GroqConfig};

/// Groq client speaking the OpenAI-compatible chat completions API
pub struct GroqClient {
    config: GroqConfig,
    client: Client,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl GroqClient {
    /// Model constants
    pub const LLAMA_3_1_8B_INSTANT: &'static str = "llama-3.1-8b-instant";
    pub const LLAMA_3_3_70B_VERSATILE: &'static str = "llama-3.3-70b-versatile";

    /// Create a new Groq client from configuration
    pub fn new(config: GroqConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create a new Groq client from environment variables
    pub fn from_env() -> Result<Self> {
        let config = GroqConfig::from_env()?;
        Self::new(config)
    }

    /// Set the model to use for generation
    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.config.model = model_id.into();
        self
    }

    async fn perform_generation(&self, prompt: &str, config: &GenerationConfig) -> Result<String> {
        let request_body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        };

        let url = endpoint(&self.config.api_url, "chat/completions");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .timeout(config.timeout)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| transport_error(e, config))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Generation(format!(
                "Groq API request failed with status {}: {}",
                status, error_text
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_error(e, config))?;

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Generation(format!("Malformed Groq response: {}", e)))?;

        let answer = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        if answer.is_empty() {
            return Err(Error::Generation(format!(
                "Empty response from Groq API. Raw response: {}",
                body
            )));
        }

        debug!(model = %self.config.model, chars = answer.len(), "groq generation complete");
        Ok(answer)
    }
}

fn transport_error(err: reqwest::Error, config: &GenerationConfig) -> Error {
    if err.is_timeout() {
        Error::GenerationTimeout(config.timeout)
    } else {
        Error::Generation(err.to_string())
    }
}

#[async_trait]
impl LanguageModel for GroqClient {
    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String> {
        self.perform_generation(prompt, config).await
    }

    fn model_id(&self) -> &str {
        &self.config.model
    }
}
