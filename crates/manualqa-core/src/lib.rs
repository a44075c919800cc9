//! Core traits and types for ManualQA
//!
//! This crate defines the domain types shared by the retrieval pipeline and the
//! collaborator interfaces it consumes: the embedding service, the vector index
//! and the language model. Keeping them here lets the pipeline be tested against
//! in-memory fakes and lets each service client live in its own crate.

pub mod embedding;
pub mod error;
pub mod llm;
pub mod types;
pub mod vector_index;

pub use embedding::EmbeddingService;
pub use error::{Error, Result};
pub use llm::{GenerationConfig, LanguageModel};
pub use types::{DistanceMetric, EmbeddingVector, HitKind, SearchHit};
pub use vector_index::{CollectionInfo, IndexMatch, VectorIndex};
