//! Pipeline configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use manualqa_core::{DistanceMetric, Error, GenerationConfig, Result};

pub const DEFAULT_TEXT_COLLECTION: &str = "text_chunks_collection";
pub const DEFAULT_IMAGE_COLLECTION: &str = "image_embeddings_collection";

/// Tunables for retrieval, context assembly, generation and caching
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub text_collection: String,
    pub image_collection: String,
    pub metric: DistanceMetric,
    pub top_k: usize,
    pub max_distance: f32,
    pub context_max_chars: usize,
    pub fallback_excerpt_chars: usize,
    pub answer_cache_ttl: Duration,
    pub answer_cache_capacity: Option<usize>,
    pub embedding_cache_ttl: Duration,
    pub embedding_cache_capacity: Option<usize>,
    pub generation: GenerationConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let metric = DistanceMetric::Euclidean;
        Self {
            text_collection: DEFAULT_TEXT_COLLECTION.to_string(),
            image_collection: DEFAULT_IMAGE_COLLECTION.to_string(),
            metric,
            top_k: 3,
            max_distance: metric.default_max_distance(),
            context_max_chars: 3500,
            fallback_excerpt_chars: 1200,
            answer_cache_ttl: Duration::from_secs(300),
            answer_cache_capacity: Some(1024),
            embedding_cache_ttl: Duration::from_secs(300),
            embedding_cache_capacity: Some(256),
            generation: GenerationConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Defaults overridden by `MANUALQA_*` environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Some(name) = env_var("MANUALQA_TEXT_COLLECTION") {
            config.text_collection = name;
        }
        if let Some(name) = env_var("MANUALQA_IMAGE_COLLECTION") {
            config.image_collection = name;
        }
        if let Some(metric) = parse_env::<DistanceMetric>("MANUALQA_METRIC")? {
            config.metric = metric;
            config.max_distance = metric.default_max_distance();
        }
        if let Some(max_distance) = parse_env("MANUALQA_MAX_DISTANCE")? {
            config.max_distance = max_distance;
        }
        if let Some(top_k) = parse_env("MANUALQA_TOP_K")? {
            config.top_k = top_k;
        }
        if let Some(chars) = parse_env("MANUALQA_CONTEXT_CHARS")? {
            config.context_max_chars = chars;
        }
        if let Some(chars) = parse_env("MANUALQA_EXCERPT_CHARS")? {
            config.fallback_excerpt_chars = chars;
        }
        if let Some(secs) = parse_env("MANUALQA_CACHE_TTL_SECS")? {
            config.answer_cache_ttl = Duration::from_secs(secs);
        }
        if let Some(capacity) = parse_env::<usize>("MANUALQA_ANSWER_CACHE_CAPACITY")? {
            config.answer_cache_capacity = (capacity > 0).then_some(capacity);
        }
        if let Some(secs) = parse_env("MANUALQA_EMBED_CACHE_TTL_SECS")? {
            config.embedding_cache_ttl = Duration::from_secs(secs);
        }
        if let Some(capacity) = parse_env::<usize>("MANUALQA_EMBED_CACHE_CAPACITY")? {
            config.embedding_cache_capacity = (capacity > 0).then_some(capacity);
        }
        if let Some(secs) = parse_env("MANUALQA_LLM_TIMEOUT_SECS")? {
            config.generation.timeout = Duration::from_secs(secs);
        }
        if let Some(max_tokens) = parse_env("MANUALQA_MAX_TOKENS")? {
            config.generation.max_tokens = max_tokens;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.text_collection.trim().is_empty() || self.image_collection.trim().is_empty() {
            return Err(Error::Configuration("collection names must not be empty".to_string()));
        }
        if self.top_k == 0 {
            return Err(Error::Configuration("top_k must be greater than zero".to_string()));
        }
        if !self.max_distance.is_finite() || self.max_distance < 0.0 {
            return Err(Error::Configuration(format!(
                "max_distance must be a non-negative number, got {}",
                self.max_distance
            )));
        }
        if self.context_max_chars == 0 || self.fallback_excerpt_chars == 0 {
            return Err(Error::Configuration(
                "context and excerpt budgets must be greater than zero".to_string(),
            ));
        }
        if self.answer_cache_ttl.is_zero() || self.embedding_cache_ttl.is_zero() {
            return Err(Error::Configuration("cache TTLs must be greater than zero".to_string()));
        }
        if self.generation.timeout.is_zero() {
            return Err(Error::Configuration("LLM timeout must be greater than zero".to_string()));
        }
        if self.generation.max_tokens == 0 {
            return Err(Error::Configuration("max_tokens must be greater than zero".to_string()));
        }
        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: FromStr>(name: &str) -> Result<Option<T>> {
    match env_var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Configuration(format!("{} has an invalid value '{}'", name, raw))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.top_k, 3);
        assert_eq!(config.max_distance, 0.8);
        assert_eq!(config.context_max_chars, 3500);
        assert_eq!(config.answer_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.answer_cache_capacity, Some(1024));
    }

    #[test]
    fn test_validation_rejects_unusable_values() {
        let cases: Vec<Box<dyn Fn(&mut PipelineConfig)>> = vec![
            Box::new(|c| c.top_k = 0),
            Box::new(|c| c.max_distance = -0.1),
            Box::new(|c| c.max_distance = f32::NAN),
            Box::new(|c| c.context_max_chars = 0),
            Box::new(|c| c.answer_cache_ttl = Duration::ZERO),
            Box::new(|c| c.generation.timeout = Duration::ZERO),
            Box::new(|c| c.generation.max_tokens = 0),
            Box::new(|c| c.image_collection = " ".to_string()),
        ];

        for mutate in cases {
            let mut config = PipelineConfig::default();
            mutate(&mut config);
            assert!(matches!(config.validate(), Err(Error::Configuration(_))));
        }
    }
}
