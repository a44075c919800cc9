//! Groq and embedding service integration for ManualQA
//!
//! This crate provides the HTTP implementations of the [`LanguageModel`] and
//! [`EmbeddingService`] traits. Both speak the OpenAI-compatible wire format,
//! so the embedding client also works against Ollama or a local inference
//! server.

mod client;
mod config;
mod embedder;

#[cfg(test)]
mod tests;

pub use client::GroqClient;
pub use config::{EmbeddingConfig, GroqConfig};
pub use embedder::EmbeddingClient;

// Re-export core types for convenience
pub use manualqa_core::{
    EmbeddingService, EmbeddingVector, Error, GenerationConfig, LanguageModel, Result,
};
