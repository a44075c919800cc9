//! Query normalization hook

/// Rewrites a question before it is embedded.
///
/// The answer cache always keys on the raw question; only the embedding
/// lookup sees the normalized form.
pub trait QueryNormalizer: Send + Sync {
    fn normalize(&self, question: &str) -> String;
}

/// Trims and collapses runs of whitespace into single spaces
#[derive(Debug, Default, Clone, Copy)]
pub struct WhitespaceNormalizer;

impl QueryNormalizer for WhitespaceNormalizer {
    fn normalize(&self, question: &str) -> String {
        question.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_normalizer() {
        let normalizer = WhitespaceNormalizer;
        assert_eq!(
            normalizer.normalize("  torque   for\tbolt\nA3 "),
            "torque for bolt A3"
        );
        assert_eq!(normalizer.normalize(" \t\n"), "");
        // case is preserved
        assert_eq!(normalizer.normalize("Bolt A3"), "Bolt A3");
    }
}
