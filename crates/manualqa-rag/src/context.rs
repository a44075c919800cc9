//! Context assembly under a character budget

use std::fmt;

use manualqa_core::{HitKind, SearchHit};

/// Prefix marking an image reference inside the context
pub const IMAGE_MARKER: &str = "Related image: ";

const FRAGMENT_SEPARATOR: &str = "\n\n";

/// Text handed to the language model, already cut to its budget
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextDocument {
    text: String,
}

impl ContextDocument {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// True when no hit contributed a fragment
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Length in `char`s
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// The first `max_chars` characters
    pub fn excerpt(&self, max_chars: usize) -> &str {
        truncate_chars(&self.text, max_chars)
    }
}

impl fmt::Display for ContextDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Turns ranked hits into a [`ContextDocument`]
#[derive(Debug, Clone, Copy)]
pub struct ContextAssembler {
    max_chars: usize,
}

impl ContextAssembler {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Join one fragment per hit, in order, and cut the tail past the budget.
    ///
    /// Text hits contribute their trimmed payload, image hits an
    /// [`IMAGE_MARKER`] line. Hits with a blank payload are dropped.
    pub fn build(&self, hits: &[SearchHit]) -> ContextDocument {
        let fragments: Vec<String> = hits.iter().filter_map(fragment).collect();
        let joined = fragments.join(FRAGMENT_SEPARATOR);

        ContextDocument {
            text: truncate_chars(&joined, self.max_chars).to_string(),
        }
    }
}

fn fragment(hit: &SearchHit) -> Option<String> {
    let payload = hit.payload().trim();
    if payload.is_empty() {
        return None;
    }
    Some(match hit.kind() {
        HitKind::Text => payload.to_string(),
        HitKind::Image => format!("{}{}", IMAGE_MARKER, payload),
    })
}

/// Longest prefix of `text` with at most `max_chars` characters
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
