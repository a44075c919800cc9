//! Vector index implementations

use async_trait::async_trait;
use qdrant_client::qdrant::{
    self, value::Kind, vectors_config::Config as VectorsConfig, Distance, SearchPoints, Value,
};
use qdrant_client::Qdrant;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

use manualqa_core::{
    CollectionInfo, DistanceMetric, EmbeddingVector, Error, IndexMatch, Result, VectorIndex,
};

/// Payload keys tried, in order, after the collection's configured field
const FALLBACK_PAYLOAD_KEYS: &[&str] = &[
    "text",
    "content",
    "page_content",
    "chunk",
    "caption",
    "image_path",
];

struct LocalCollection {
    dimension: usize,
    points: Vec<(Vec<f32>, String)>,
}

/// In-memory brute-force index
///
/// Useful offline and in tests. All collections share one metric.
pub struct LocalVectorIndex {
    metric: DistanceMetric,
    collections: RwLock<HashMap<String, LocalCollection>>,
}

impl LocalVectorIndex {
    pub fn new(metric: DistanceMetric) -> Self {
        Self {
            metric,
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Create an empty collection, replacing any existing one
    pub fn create_collection(&self, name: impl Into<String>, dimension: usize) {
        let mut collections = self.collections.write().unwrap_or_else(PoisonError::into_inner);
        collections.insert(
            name.into(),
            LocalCollection {
                dimension,
                points: Vec::new(),
            },
        );
    }

    /// Store a vector and its payload
    pub fn insert(
        &self,
        collection: &str,
        vector: Vec<f32>,
        payload: impl Into<String>,
    ) -> Result<()> {
        let mut collections = self.collections.write().unwrap_or_else(PoisonError::into_inner);
        let target = collections
            .get_mut(collection)
            .ok_or_else(|| Error::index_unavailable(collection, "no such collection"))?;

        if vector.len() != target.dimension {
            return Err(Error::InvalidInput(format!(
                "collection '{}' expects {} dimensions, got {}",
                collection,
                target.dimension,
                vector.len()
            )));
        }

        target.points.push((vector, payload.into()));
        Ok(())
    }

    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(collection)
            .map_or(0, |c| c.points.len())
    }
}

#[async_trait]
impl VectorIndex for LocalVectorIndex {
    async fn search(
        &self,
        collection: &str,
        vector: &EmbeddingVector,
        top_k: usize,
    ) -> Result<Vec<IndexMatch>> {
        let collections = self.collections.read().unwrap_or_else(PoisonError::into_inner);
        let target = collections
            .get(collection)
            .ok_or_else(|| Error::index_unavailable(collection, "no such collection"))?;

        if vector.dim() != target.dimension {
            return Err(Error::Configuration(format!(
                "query has {} dimensions, collection '{}' stores {}",
                vector.dim(),
                collection,
                target.dimension
            )));
        }

        let mut matches: Vec<IndexMatch> = target
            .points
            .iter()
            .map(|(stored, payload)| IndexMatch {
                payload: Some(payload.clone()),
                distance: self.metric.distance(vector.as_slice(), stored),
            })
            .collect();

        matches.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        matches.truncate(top_k);
        Ok(matches)
    }

    async fn describe(&self, collection: &str) -> Result<CollectionInfo> {
        let collections = self.collections.read().unwrap_or_else(PoisonError::into_inner);
        collections
            .get(collection)
            .map(|c| CollectionInfo {
                dimension: c.dimension,
                metric: self.metric,
            })
            .ok_or_else(|| Error::index_unavailable(collection, "no such collection"))
    }
}

/// Qdrant-backed index
///
/// Scores are converted to distances per the configured metric: cosine
/// similarity `s` becomes `1 - s`, Euclidean scores are already distances.
pub struct QdrantVectorIndex {
    client: Qdrant,
    metric: DistanceMetric,
    payload_fields: HashMap<String, String>,
}

impl QdrantVectorIndex {
    pub fn new(url: &str, api_key: Option<String>, metric: DistanceMetric) -> Result<Self> {
        let client = Qdrant::from_url(url)
            .api_key(api_key)
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build Qdrant client: {}", e)))?;

        Ok(Self {
            client,
            metric,
            payload_fields: HashMap::new(),
        })
    }

    /// Read `field` first when extracting payloads from `collection`
    pub fn with_payload_field(
        mut self,
        collection: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        self.payload_fields.insert(collection.into(), field.into());
        self
    }

    fn extract_payload(&self, collection: &str, payload: &HashMap<String, Value>) -> Option<String> {
        let preferred = self.payload_fields.get(collection).map(String::as_str);
        preferred
            .into_iter()
            .chain(FALLBACK_PAYLOAD_KEYS.iter().copied())
            .find_map(|key| payload_to_string(payload.get(key)))
    }

    fn score_to_distance(&self, score: f32) -> f32 {
        match self.metric {
            DistanceMetric::Cosine => 1.0 - score,
            DistanceMetric::Euclidean => score,
        }
    }
}

#[async_trait]
impl VectorIndex for QdrantVectorIndex {
    async fn search(
        &self,
        collection: &str,
        vector: &EmbeddingVector,
        top_k: usize,
    ) -> Result<Vec<IndexMatch>> {
        let response = self
            .client
            .search_points(SearchPoints {
                collection_name: collection.to_string(),
                vector: vector.as_slice().to_vec(),
                limit: top_k as u64,
                with_payload: Some(qdrant::WithPayloadSelector {
                    selector_options: Some(qdrant::with_payload_selector::SelectorOptions::Enable(
                        true,
                    )),
                }),
                ..Default::default()
            })
            .await
            .map_err(|e| Error::index_unavailable(collection, e))?;

        debug!(collection, points = response.result.len(), "qdrant search complete");

        Ok(response
            .result
            .into_iter()
            .map(|point| IndexMatch {
                payload: self.extract_payload(collection, &point.payload),
                distance: self.score_to_distance(point.score),
            })
            .collect())
    }

    async fn describe(&self, collection: &str) -> Result<CollectionInfo> {
        let response = self
            .client
            .collection_info(collection)
            .await
            .map_err(|e| Error::index_unavailable(collection, e))?;

        let config = response
            .result
            .and_then(|info| info.config)
            .and_then(|config| config.params)
            .and_then(|params| params.vectors_config)
            .and_then(|vectors| vectors.config);

        let params = match config {
            Some(VectorsConfig::Params(params)) => params,
            Some(VectorsConfig::ParamsMap(_)) => {
                return Err(Error::Configuration(format!(
                    "collection '{}' uses named vectors, expected a single unnamed vector",
                    collection
                )))
            }
            None => {
                return Err(Error::index_unavailable(
                    collection,
                    "collection info has no vector parameters",
                ))
            }
        };

        let metric = match params.distance() {
            Distance::Cosine => DistanceMetric::Cosine,
            Distance::Euclid => DistanceMetric::Euclidean,
            other => {
                return Err(Error::Configuration(format!(
                    "collection '{}' uses unsupported distance {:?}",
                    collection, other
                )))
            }
        };

        Ok(CollectionInfo {
            dimension: params.size as usize,
            metric,
        })
    }
}

fn payload_to_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(|value| value.kind.as_ref())
        .and_then(|kind| match kind {
            Kind::StringValue(text) if !text.trim().is_empty() => Some(text.clone()),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string_value(text: &str) -> Value {
        Value {
            kind: Some(Kind::StringValue(text.to_string())),
        }
    }

    #[tokio::test]
    async fn test_local_index_orders_by_distance() {
        let index = LocalVectorIndex::new(DistanceMetric::Euclidean);
        index.create_collection("text", 2);
        index.insert("text", vec![3.0, 0.0], "far").unwrap();
        index.insert("text", vec![0.1, 0.0], "near").unwrap();
        index.insert("text", vec![1.0, 0.0], "middle").unwrap();

        let matches = index
            .search("text", &EmbeddingVector::new(vec![0.0, 0.0]), 2)
            .await
            .unwrap();
        let payloads: Vec<_> = matches.iter().map(|m| m.payload.as_deref()).collect();

        assert_eq!(payloads, vec![Some("near"), Some("middle")]);
        assert!((matches[0].distance - 0.1).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_local_index_errors() {
        let index = LocalVectorIndex::new(DistanceMetric::Cosine);
        index.create_collection("image", 3);

        assert!(matches!(
            index.insert("image", vec![1.0], "fig.png"),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            index.search("missing", &EmbeddingVector::new(vec![1.0; 3]), 3).await,
            Err(Error::IndexUnavailable { .. })
        ));
        assert_eq!(
            index.describe("image").await.unwrap(),
            CollectionInfo {
                dimension: 3,
                metric: DistanceMetric::Cosine,
            }
        );
        assert_eq!(index.len("image"), 0);
    }

    #[tokio::test]
    async fn test_payload_extraction_prefers_configured_field() {
        let index = QdrantVectorIndex::new("http://localhost:6334", None, DistanceMetric::Cosine)
            .unwrap()
            .with_payload_field("image_embeddings_collection", "image_path");

        let mut payload = HashMap::new();
        payload.insert("text".to_string(), string_value("OCR text"));
        payload.insert("image_path".to_string(), string_value("figs/pump.png"));

        assert_eq!(
            index.extract_payload("image_embeddings_collection", &payload).as_deref(),
            Some("figs/pump.png")
        );
        assert_eq!(
            index.extract_payload("text_chunks_collection", &payload).as_deref(),
            Some("OCR text")
        );
        assert_eq!(index.extract_payload("text_chunks_collection", &HashMap::new()), None);
    }

    #[tokio::test]
    async fn test_score_conversion() {
        let cosine = QdrantVectorIndex::new("http://localhost:6334", None, DistanceMetric::Cosine)
            .unwrap();
        assert!((cosine.score_to_distance(0.9) - 0.1).abs() < 1e-6);

        let l2 = QdrantVectorIndex::new("http://localhost:6334", None, DistanceMetric::Euclidean)
            .unwrap();
        assert_eq!(l2.score_to_distance(0.42), 0.42);
    }
}
