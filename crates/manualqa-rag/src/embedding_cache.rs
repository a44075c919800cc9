//! Query embedding cache

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use manualqa_core::{EmbeddingService, EmbeddingVector, Error, Result};

use crate::cache::{Clock, TtlCache};

/// Memoizes query → vector lookups in front of an [`EmbeddingService`].
///
/// Concurrent misses on the same query each call the service; the last write
/// wins. Failures are never cached.
pub struct EmbeddingCache {
    service: Arc<dyn EmbeddingService>,
    cache: TtlCache<EmbeddingVector>,
}

impl EmbeddingCache {
    pub fn new(service: Arc<dyn EmbeddingService>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            service,
            cache: TtlCache::new(ttl, clock),
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.cache = self.cache.with_capacity(capacity);
        self
    }

    /// Dimension the service promises for every vector
    pub fn dimension(&self) -> usize {
        self.service.dimension()
    }

    /// Cached vector for `query`, embedding it on a miss.
    ///
    /// A vector of the wrong dimension is a configuration error and is not
    /// stored.
    pub async fn get_or_embed(&self, query: &str) -> Result<EmbeddingVector> {
        if let Some(vector) = self.cache.get(query) {
            debug!(query, "embedding cache hit");
            return Ok(vector);
        }

        let vector = self.service.embed(query).await?;

        let expected = self.service.dimension();
        if vector.dim() != expected {
            return Err(Error::Configuration(format!(
                "embedding service returned {} dimensions, index expects {}",
                vector.dim(),
                expected
            )));
        }

        self.cache.insert(query, vector.clone());
        debug!(query, "embedding cache miss, stored");
        Ok(vector)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
