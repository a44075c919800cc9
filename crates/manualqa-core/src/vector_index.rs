//! Vector index trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{DistanceMetric, EmbeddingVector, Result};

/// A raw match returned by a vector index collection.
///
/// `payload` is `None` when the stored point carries no usable payload field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMatch {
    pub payload: Option<String>,
    pub distance: f32,
}

/// Shape of a collection as reported by the index
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub dimension: usize,
    pub metric: DistanceMetric,
}

/// Trait for vector indexes (e.g. Qdrant, in-memory)
///
/// A collection that cannot be reached fails with
/// [`crate::Error::IndexUnavailable`] for that collection only.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Top-k search in one collection, ordered by ascending distance
    async fn search(
        &self,
        collection: &str,
        vector: &EmbeddingVector,
        top_k: usize,
    ) -> Result<Vec<IndexMatch>>;

    /// Describe a collection's dimension and metric
    async fn describe(&self, collection: &str) -> Result<CollectionInfo>;
}
