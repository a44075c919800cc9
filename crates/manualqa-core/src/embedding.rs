//! Embedding service trait

use async_trait::async_trait;

use crate::{EmbeddingVector, Result};

/// Trait for query embedding services (e.g. an OpenAI-compatible endpoint)
///
/// Implementations fail with [`crate::Error::Embedding`] on transport or model
/// failure.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Embed a single query text
    async fn embed(&self, text: &str) -> Result<EmbeddingVector>;

    /// Dimension every returned vector must have
    fn dimension(&self) -> usize;
}
