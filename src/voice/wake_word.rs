//! Wake and sleep phrase matching
//!
//! Trigger phrases are matched case-insensitively as substrings of the
//! transcribed text, so "hi, lumi 在吗" wakes a session configured with
//! "Hi, Lumi".

/// A set of trigger phrases
#[derive(Debug, Clone)]
pub struct PhraseSet {
    phrases: Vec<String>,
}

impl PhraseSet {
    /// Create a phrase set, lowercasing and trimming each phrase
    ///
    /// Empty phrases are discarded; they would match everything.
    #[must_use]
    pub fn new(phrases: &[String]) -> Self {
        let normalized: Vec<String> = phrases
            .iter()
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();

        tracing::debug!(phrases = ?normalized, "phrase set initialized");

        Self {
            phrases: normalized,
        }
    }

    /// Check whether the text contains any phrase of the set
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        let normalized = text.to_lowercase();

        self.phrases
            .iter()
            .any(|phrase| normalized.contains(phrase.as_str()))
    }

    /// Get the normalized phrases
    #[must_use]
    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }
}
