//! Question → answer cache

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{Clock, TtlCache};

/// A cached answer as owned by [`AnswerCache`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerRecord {
    pub question: String,
    pub answer_text: String,
    pub created_at: DateTime<Utc>,
}

/// Memoizes full answers keyed on the exact, unnormalized question.
///
/// Two questions that differ only in case or spacing are distinct entries.
pub struct AnswerCache {
    cache: TtlCache<String>,
}

impl AnswerCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            cache: TtlCache::new(ttl, clock),
        }
    }

    /// Keep at most `capacity` answers, evicting stale then oldest entries
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.cache = self.cache.with_capacity(capacity);
        self
    }

    pub fn get(&self, question: &str) -> Option<String> {
        self.cache.get(question)
    }

    pub fn put(&self, question: &str, answer: &str) {
        self.cache.insert(question, answer.to_string());
    }

    /// Fresh record for `question`, with its creation time
    pub fn record(&self, question: &str) -> Option<AnswerRecord> {
        self.cache.get_entry(question).map(|entry| AnswerRecord {
            question: question.to_string(),
            answer_text: entry.value,
            created_at: entry.created_at,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.cache.ttl()
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
