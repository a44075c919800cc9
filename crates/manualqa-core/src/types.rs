//! Domain types shared across the pipeline

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// A query embedding produced by the embedding service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingVector(Vec<f32>);

impl EmbeddingVector {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    /// Number of components.
    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }
}

impl From<Vec<f32>> for EmbeddingVector {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

/// Which collection a hit came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HitKind {
    /// A chunk of manual text
    Text,
    /// An image extracted from a manual
    Image,
}

impl HitKind {
    pub fn label(&self) -> &'static str {
        match self {
            HitKind::Text => "text",
            HitKind::Image => "image",
        }
    }
}

/// One similarity search result, normalized at the index client boundary.
///
/// `distance` is non-negative and lower means more similar. Distances are only
/// comparable between hits of the same search call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    kind: HitKind,
    payload: String,
    distance: f32,
}

impl SearchHit {
    pub fn new(kind: HitKind, payload: impl Into<String>, distance: f32) -> Self {
        Self {
            kind,
            payload: payload.into(),
            distance,
        }
    }

    pub fn text(payload: impl Into<String>, distance: f32) -> Self {
        Self::new(HitKind::Text, payload, distance)
    }

    pub fn image(payload: impl Into<String>, distance: f32) -> Self {
        Self::new(HitKind::Image, payload, distance)
    }

    pub fn kind(&self) -> HitKind {
        self.kind
    }

    /// Chunk text for text hits, image path for image hits.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }
}

/// Distance metric the vector index was built with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Cosine distance, `1 - cosine_similarity`, in `[0, 2]`
    Cosine,
    /// Euclidean (L2) distance
    Euclidean,
}

impl DistanceMetric {
    /// Default `max_distance` cut-off for this metric.
    pub fn default_max_distance(&self) -> f32 {
        match self {
            DistanceMetric::Cosine => 0.5,
            DistanceMetric::Euclidean => 0.8,
        }
    }

    /// Distance between two vectors of equal length.
    pub fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            DistanceMetric::Cosine => {
                let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
                let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
                let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
                if norm_a == 0.0 || norm_b == 0.0 {
                    return 1.0;
                }
                (1.0 - dot / (norm_a * norm_b)).max(0.0)
            }
            DistanceMetric::Euclidean => a
                .iter()
                .zip(b)
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f32>()
                .sqrt(),
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceMetric::Cosine => write!(f, "cosine"),
            DistanceMetric::Euclidean => write!(f, "l2"),
        }
    }
}

impl FromStr for DistanceMetric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "cosine" | "cos" => Ok(DistanceMetric::Cosine),
            "l2" | "euclid" | "euclidean" => Ok(DistanceMetric::Euclidean),
            other => Err(Error::Configuration(format!(
                "unsupported distance metric '{}', expected 'cosine' or 'l2'",
                other
            ))),
        }
    }
}
