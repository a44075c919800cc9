//! Answer generation with an extractive fallback

use std::sync::Arc;
use tracing::{debug, warn};

use manualqa_core::{Error, GenerationConfig, LanguageModel, Result};

use crate::context::ContextDocument;

/// Answer when retrieval produced no usable context
pub const NO_INFORMATION_ANSWER: &str =
    "I couldn't find any relevant information in the indexed manuals for that question.";

/// First line of an extractive answer
pub const FALLBACK_PREAMBLE: &str = "Based on the retrieved manual excerpts:";

/// Last line of an extractive answer
pub const FALLBACK_SOURCES_HINT: &str =
    "(If you want the exact page/images, I can retrieve sources.)";

/// Grounding prompt: answer only from `context`
pub fn build_prompt(context: &ContextDocument, question: &str) -> String {
    format!(
        "You are an AI assistant. Use ONLY the context below to answer the question.\n\
         If the answer is not in the context, say you don't know.\n\
         \n\
         Context:\n\
         {}\n\
         \n\
         Question:\n\
         {}",
        context, question
    )
}

/// How a synthesized answer was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisPath {
    Generated,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesis {
    pub answer: String,
    pub path: SynthesisPath,
}

/// Calls the language model and falls back to an extractive answer on any
/// failure. Never returns an error.
pub struct AnswerSynthesizer {
    model: Option<Arc<dyn LanguageModel>>,
    generation: GenerationConfig,
    excerpt_chars: usize,
}

impl AnswerSynthesizer {
    pub fn new(generation: GenerationConfig, excerpt_chars: usize) -> Self {
        Self {
            model: None,
            generation,
            excerpt_chars,
        }
    }

    pub fn with_model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    pub async fn synthesize(&self, question: &str, context: &ContextDocument) -> Synthesis {
        if context.is_empty() {
            return self.fallback(context);
        }

        match self.generate(question, context).await {
            Ok(answer) => Synthesis {
                answer,
                path: SynthesisPath::Generated,
            },
            Err(err) => {
                warn!(stage = "generate", question, error = %err, "falling back to extractive answer");
                self.fallback(context)
            }
        }
    }

    async fn generate(&self, question: &str, context: &ContextDocument) -> Result<String> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| Error::Generation("no language model configured".to_string()))?;

        let prompt = build_prompt(context, question);
        let timeout = self.generation.timeout;

        let answer = tokio::time::timeout(timeout, model.generate(&prompt, &self.generation))
            .await
            .map_err(|_| Error::GenerationTimeout(timeout))??;

        let answer = answer.trim();
        if answer.is_empty() {
            return Err(Error::Generation("model returned an empty answer".to_string()));
        }

        debug!(model = model.model_id(), chars = answer.len(), "answer generated");
        Ok(answer.to_string())
    }

    fn fallback(&self, context: &ContextDocument) -> Synthesis {
        Synthesis {
            answer: fallback_answer(context, self.excerpt_chars),
            path: SynthesisPath::Fallback,
        }
    }
}

/// Extractive answer built from the start of `context`
pub fn fallback_answer(context: &ContextDocument, excerpt_chars: usize) -> String {
    if context.is_empty() {
        return NO_INFORMATION_ANSWER.to_string();
    }
    format!(
        "{}\n\n{}\n\n{}",
        FALLBACK_PREAMBLE,
        context.excerpt(excerpt_chars),
        FALLBACK_SOURCES_HINT
    )
}
