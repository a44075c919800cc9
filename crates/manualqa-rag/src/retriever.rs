//! Dual-collection similarity search

use std::sync::Arc;
use tracing::{debug, info, warn};

use manualqa_core::{
    DistanceMetric, EmbeddingVector, Error, HitKind, IndexMatch, Result, SearchHit, VectorIndex,
};

/// Searches the text and image collections and normalizes their matches into
/// [`SearchHit`]s.
///
/// Text hits always precede image hits. Each list keeps the index's ascending
/// distance order; the two lists are never merged or re-ranked against each
/// other.
pub struct VectorIndexClient {
    index: Arc<dyn VectorIndex>,
    text_collection: String,
    image_collection: String,
    metric: DistanceMetric,
}

impl VectorIndexClient {
    pub fn new(
        index: Arc<dyn VectorIndex>,
        text_collection: impl Into<String>,
        image_collection: impl Into<String>,
        metric: DistanceMetric,
    ) -> Self {
        Self {
            index,
            text_collection: text_collection.into(),
            image_collection: image_collection.into(),
            metric,
        }
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Check that both collections use the configured metric and `dimension`.
    ///
    /// A collection that cannot be described is logged and skipped; searches
    /// against it will degrade to an empty list.
    pub async fn verify(&self, dimension: usize) -> Result<()> {
        for collection in [&self.text_collection, &self.image_collection] {
            let info = match self.index.describe(collection).await {
                Ok(info) => info,
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    warn!(collection = %collection, error = %err, "could not verify collection");
                    continue;
                }
            };

            if info.metric != self.metric {
                return Err(Error::Configuration(format!(
                    "collection '{}' uses {} distance but the pipeline is configured for {}",
                    collection, info.metric, self.metric
                )));
            }
            if info.dimension != dimension {
                return Err(Error::Configuration(format!(
                    "collection '{}' stores {}-dimensional vectors, embeddings have {}",
                    collection, info.dimension, dimension
                )));
            }
            info!(collection = %collection, dimension, metric = %self.metric, "collection verified");
        }
        Ok(())
    }

    /// Top-`top_k` hits per collection with `distance <= max_distance`.
    ///
    /// An unreachable collection contributes no hits. A configuration error
    /// from either collection fails the whole search.
    pub async fn search(
        &self,
        vector: &EmbeddingVector,
        top_k: usize,
        max_distance: f32,
    ) -> Result<Vec<SearchHit>> {
        if top_k == 0 {
            return Err(Error::InvalidInput("top_k must be greater than zero".to_string()));
        }
        if max_distance.is_nan() || max_distance < 0.0 {
            return Err(Error::InvalidInput(format!(
                "max_distance must be non-negative, got {}",
                max_distance
            )));
        }

        let (text, image) = tokio::join!(
            self.index.search(&self.text_collection, vector, top_k),
            self.index.search(&self.image_collection, vector, top_k),
        );

        let mut hits = self.collect(HitKind::Text, &self.text_collection, text, top_k, max_distance)?;
        hits.extend(self.collect(HitKind::Image, &self.image_collection, image, top_k, max_distance)?);
        Ok(hits)
    }

    fn collect(
        &self,
        kind: HitKind,
        collection: &str,
        result: Result<Vec<IndexMatch>>,
        top_k: usize,
        max_distance: f32,
    ) -> Result<Vec<SearchHit>> {
        let matches = match result {
            Ok(matches) => matches,
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                warn!(collection, error = %err, "collection search failed, continuing without it");
                return Ok(Vec::new());
            }
        };

        let hits: Vec<SearchHit> = matches
            .into_iter()
            .take(top_k)
            .filter_map(|m| {
                let distance = m.distance.max(0.0);
                if distance > max_distance {
                    return None;
                }
                match m.payload {
                    Some(payload) => Some(SearchHit::new(kind, payload, distance)),
                    None => {
                        debug!(collection, distance, "skipping match without payload");
                        None
                    }
                }
            })
            .collect();

        debug!(collection, kind = kind.label(), hits = hits.len(), "collection searched");
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use manualqa_core::CollectionInfo;
    use std::collections::HashMap;

    #[derive(Default)]
    struct StaticIndex {
        collections: HashMap<String, Vec<IndexMatch>>,
        info: HashMap<String, CollectionInfo>,
    }

    impl StaticIndex {
        fn with(mut self, collection: &str, matches: &[(&str, f32)]) -> Self {
            self.collections.insert(
                collection.to_string(),
                matches
                    .iter()
                    .map(|(payload, distance)| IndexMatch {
                        payload: Some(payload.to_string()),
                        distance: *distance,
                    })
                    .collect(),
            );
            self
        }
    }

    #[async_trait]
    impl VectorIndex for StaticIndex {
        async fn search(
            &self,
            collection: &str,
            _vector: &EmbeddingVector,
            _top_k: usize,
        ) -> Result<Vec<IndexMatch>> {
            self.collections
                .get(collection)
                .cloned()
                .ok_or_else(|| Error::index_unavailable(collection, "connection refused"))
        }

        async fn describe(&self, collection: &str) -> Result<CollectionInfo> {
            self.info
                .get(collection)
                .copied()
                .ok_or_else(|| Error::index_unavailable(collection, "connection refused"))
        }
    }

    fn client(index: StaticIndex) -> VectorIndexClient {
        client_over(Arc::new(index))
    }

    fn client_over(index: Arc<dyn VectorIndex>) -> VectorIndexClient {
        VectorIndexClient::new(index, "text", "image", DistanceMetric::Euclidean)
    }

    fn query() -> EmbeddingVector {
        EmbeddingVector::new(vec![0.0; 4])
    }

    #[tokio::test]
    async fn test_text_hits_precede_image_hits() {
        let index = StaticIndex::default()
            .with("text", &[("t1", 0.1), ("t2", 0.5)])
            .with("image", &[("i1.png", 0.05), ("i2.png", 0.3)]);

        let hits = client(index).search(&query(), 3, 0.8).await.unwrap();
        let shape: Vec<(HitKind, f32)> = hits.iter().map(|h| (h.kind(), h.distance())).collect();

        assert_eq!(
            shape,
            vec![
                (HitKind::Text, 0.1),
                (HitKind::Text, 0.5),
                (HitKind::Image, 0.05),
                (HitKind::Image, 0.3),
            ]
        );
    }

    #[tokio::test]
    async fn test_threshold_and_top_k_apply_per_collection() {
        let index = StaticIndex::default()
            .with("text", &[("t1", 0.1), ("t2", 0.2), ("t3", 0.3), ("t4", 0.4)])
            .with("image", &[("far.png", 0.9)]);

        let hits = client(index).search(&query(), 3, 0.25).await.unwrap();
        let payloads: Vec<&str> = hits.iter().map(|h| h.payload()).collect();
        assert_eq!(payloads, vec!["t1", "t2"]);
    }

    #[tokio::test]
    async fn test_unreachable_collection_yields_partial_results() {
        let index = StaticIndex::default().with("text", &[("Bolt A3 torque: 45 Nm", 0.2)]);

        let hits = client(index).search(&query(), 3, 0.8).await.unwrap();
        assert_eq!(hits, vec![SearchHit::text("Bolt A3 torque: 45 Nm", 0.2)]);
    }

    #[tokio::test]
    async fn test_configuration_error_from_a_collection_is_fatal() {
        let index = crate::LocalVectorIndex::new(DistanceMetric::Euclidean);
        index.create_collection("text", 3);
        index.create_collection("image", 3);

        let err = client_over(Arc::new(index))
            .search(&query(), 3, 0.8)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[tokio::test]
    async fn test_matches_without_payload_are_skipped() {
        let mut index = StaticIndex::default().with("image", &[]);
        index.collections.insert(
            "text".to_string(),
            vec![
                IndexMatch {
                    payload: None,
                    distance: 0.1,
                },
                IndexMatch {
                    payload: Some("kept".to_string()),
                    distance: 0.2,
                },
            ],
        );

        let hits = client(index).search(&query(), 3, 0.8).await.unwrap();
        assert_eq!(hits, vec![SearchHit::text("kept", 0.2)]);
    }

    #[tokio::test]
    async fn test_rejects_invalid_arguments() {
        let client = client(StaticIndex::default());
        assert!(matches!(
            client.search(&query(), 0, 0.8).await,
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            client.search(&query(), 3, f32::NAN).await,
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_verify_detects_mismatches() {
        let mut index = StaticIndex::default();
        index.info.insert(
            "text".to_string(),
            CollectionInfo {
                dimension: 4,
                metric: DistanceMetric::Euclidean,
            },
        );
        index.info.insert(
            "image".to_string(),
            CollectionInfo {
                dimension: 4,
                metric: DistanceMetric::Cosine,
            },
        );
        let client = client(index);

        assert!(matches!(client.verify(4).await, Err(Error::Configuration(_))));
    }

    #[tokio::test]
    async fn test_verify_skips_unreachable_collections() {
        let mut index = StaticIndex::default();
        index.info.insert(
            "text".to_string(),
            CollectionInfo {
                dimension: 4,
                metric: DistanceMetric::Euclidean,
            },
        );
        let client = client(index);

        assert!(client.verify(4).await.is_ok());
        assert!(matches!(client.verify(8).await, Err(Error::Configuration(_))));
    }
}
