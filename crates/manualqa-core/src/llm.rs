//! Language model trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::Result;

/// Configuration for a single generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    pub timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_tokens: 512,
            temperature: Some(0.2),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Trait for language model services (e.g. Groq)
///
/// Implementations fail with [`crate::Error::GenerationTimeout`] when the
/// request exceeds `config.timeout` and with [`crate::Error::Generation`] on
/// transport errors or malformed responses.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a completion for the prompt
    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String>;

    /// Get the model ID being used
    fn model_id(&self) -> &str;
}
