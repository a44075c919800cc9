//! Retrieval and answer synthesis for ManualQA
//!
//! [`AnswerPipeline`] answers a question by embedding it (through
//! [`EmbeddingCache`]), searching the text and image collections
//! ([`VectorIndexClient`]), assembling a bounded context
//! ([`ContextAssembler`]) and asking the language model
//! ([`AnswerSynthesizer`]), falling back to an extractive answer when the model
//! is missing, slow or broken. Answers are memoized in an [`AnswerCache`].

pub mod answer_cache;
pub mod cache;
pub mod config;
pub mod context;
pub mod embedding_cache;
pub mod normalize;
pub mod pipeline;
pub mod retriever;
pub mod synthesizer;
pub mod vector_store;


pub use answer_cache::{AnswerCache, AnswerRecord};
pub use cache::{CacheEntry, Clock, ManualClock, SystemClock, TtlCache};
pub use config::{PipelineConfig, DEFAULT_IMAGE_COLLECTION, DEFAULT_TEXT_COLLECTION};
pub use context::{ContextAssembler, ContextDocument, IMAGE_MARKER};
pub use embedding_cache::EmbeddingCache;
pub use normalize::{QueryNormalizer, WhitespaceNormalizer};
pub use pipeline::{AnswerOutcome, AnswerPipeline, AnswerSource};
pub use retriever::VectorIndexClient;
pub use synthesizer::{
    build_prompt, fallback_answer, AnswerSynthesizer, Synthesis, SynthesisPath,
    FALLBACK_PREAMBLE, FALLBACK_SOURCES_HINT, NO_INFORMATION_ANSWER,
};
pub use vector_store::{LocalVectorIndex, QdrantVectorIndex};
