//! Question answering orchestrator

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use manualqa_core::{EmbeddingService, Error, LanguageModel, Result, VectorIndex};

use crate::answer_cache::AnswerCache;
use crate::cache::Clock;
use crate::config::PipelineConfig;
use crate::context::{ContextAssembler, ContextDocument};
use crate::embedding_cache::EmbeddingCache;
use crate::normalize::{QueryNormalizer, WhitespaceNormalizer};
use crate::retriever::VectorIndexClient;
use crate::synthesizer::{AnswerSynthesizer, SynthesisPath};

/// Where an answer came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerSource {
    /// Served from the answer cache
    Cache,
    /// Produced by the language model
    Model,
    /// Extractive or no-information fallback
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerOutcome {
    pub answer: String,
    pub source: AnswerSource,
}

/// Wires the caches, index client, context assembler and synthesizer into a
/// single `answer(question)` operation.
///
/// Safe to share across tasks behind an `Arc`; the caches are the only
/// mutable state.
pub struct AnswerPipeline {
    config: PipelineConfig,
    normalizer: Box<dyn QueryNormalizer>,
    embeddings: EmbeddingCache,
    retriever: VectorIndexClient,
    assembler: ContextAssembler,
    synthesizer: AnswerSynthesizer,
    answers: AnswerCache,
}

impl AnswerPipeline {
    /// Build a pipeline without a language model; answers are extractive
    /// until [`AnswerPipeline::with_language_model`] is called.
    pub fn new(
        config: PipelineConfig,
        embedder: Arc<dyn EmbeddingService>,
        index: Arc<dyn VectorIndex>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        let mut embeddings = EmbeddingCache::new(embedder, config.embedding_cache_ttl, clock.clone());
        if let Some(capacity) = config.embedding_cache_capacity {
            embeddings = embeddings.with_capacity(capacity);
        }

        let mut answers = AnswerCache::new(config.answer_cache_ttl, clock);
        if let Some(capacity) = config.answer_cache_capacity {
            answers = answers.with_capacity(capacity);
        }

        Ok(Self {
            normalizer: Box::new(WhitespaceNormalizer),
            embeddings,
            retriever: VectorIndexClient::new(
                index,
                config.text_collection.clone(),
                config.image_collection.clone(),
                config.metric,
            ),
            assembler: ContextAssembler::new(config.context_max_chars),
            synthesizer: AnswerSynthesizer::new(
                config.generation.clone(),
                config.fallback_excerpt_chars,
            ),
            answers,
            config,
        })
    }

    pub fn with_language_model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.synthesizer = self.synthesizer.with_model(model);
        self
    }

    pub fn with_normalizer(mut self, normalizer: impl QueryNormalizer + 'static) -> Self {
        self.normalizer = Box::new(normalizer);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn answer_cache(&self) -> &AnswerCache {
        &self.answers
    }

    pub fn embedding_cache(&self) -> &EmbeddingCache {
        &self.embeddings
    }

    pub fn has_language_model(&self) -> bool {
        self.synthesizer.has_model()
    }

    /// Startup check that both collections match the embedding dimension and
    /// the configured metric
    pub async fn verify(&self) -> Result<()> {
        self.retriever.verify(self.embeddings.dimension()).await
    }

    /// Answer `question` from the indexed manuals.
    ///
    /// Fails only for an empty question or a configuration problem; every
    /// other failure degrades to a fallback answer.
    pub async fn answer(&self, question: &str) -> Result<String> {
        self.answer_with_outcome(question).await.map(|o| o.answer)
    }

    /// Like [`AnswerPipeline::answer`], also reporting where the answer came from
    pub async fn answer_with_outcome(&self, question: &str) -> Result<AnswerOutcome> {
        if question.trim().is_empty() {
            return Err(Error::InvalidInput("question must not be empty".to_string()));
        }

        if let Some(answer) = self.answers.get(question) {
            debug!(question, "answer cache hit");
            return Ok(AnswerOutcome {
                answer,
                source: AnswerSource::Cache,
            });
        }

        let query = self.normalizer.normalize(question);
        let context = self.retrieve_context(question, &query).await?;

        let synthesis = self.synthesizer.synthesize(question, &context).await;
        let source = match synthesis.path {
            SynthesisPath::Generated => AnswerSource::Model,
            SynthesisPath::Fallback => AnswerSource::Fallback,
        };

        self.answers.put(question, &synthesis.answer);
        info!(question, source = ?source, context_chars = context.char_len(), "question answered");

        Ok(AnswerOutcome {
            answer: synthesis.answer,
            source,
        })
    }

    /// Embed, search and assemble. Recoverable failures yield an empty
    /// context; fatal ones propagate.
    async fn retrieve_context(&self, question: &str, query: &str) -> Result<ContextDocument> {
        let vector = match self.embeddings.get_or_embed(query).await {
            Ok(vector) => vector,
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                warn!(stage = "embed", question, error = %err, "embedding failed, answering without context");
                return Ok(ContextDocument::default());
            }
        };

        let hits = match self
            .retriever
            .search(&vector, self.config.top_k, self.config.max_distance)
            .await
        {
            Ok(hits) => hits,
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                warn!(stage = "search", question, error = %err, "search failed, answering without context");
                return Ok(ContextDocument::default());
            }
        };

        debug!(question, hits = hits.len(), "retrieved hits");
        Ok(self.assembler.build(&hits))
    }
}
