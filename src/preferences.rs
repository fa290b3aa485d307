//! Preference extraction from user utterances
//!
//! Scans free text for first-person statements of taste ("我喜欢猫",
//! "I love trains") and returns the captured objects grouped by category.
//! Extraction is pure; deduplication against what is already remembered
//! happens when the session engine merges into long-term memory.

use std::sync::LazyLock;

use regex::Regex;

use crate::memory::Preferences;

/// Strategy for pulling preference statements out of a single utterance
///
/// Implementations must be pure: no side effects, deterministic for the same
/// text. The returned lists may contain duplicates; merging dedups them.
pub trait PreferenceExtractor: Send + Sync {
    fn extract(&self, text: &str) -> Preferences;
}

/// Pattern-indicator lists, one family per category.
///
/// Each pattern captures the token right after the indicator phrase as a run
/// of word characters, which in this engine includes Han characters, so
/// "我喜欢猫" captures "猫". The interest pattern keeps its capture lazy so a
/// trailing intensifier ("我对天文很感兴趣") stays out of the token.
static LIKE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"我(?:最|很|超)?喜欢(\w+)",
        r"我(?:最|很|超)?爱(\w+)",
        r"\b[Ii] (?:really )?(?:like|love) (\w+)",
    ])
});

static DISLIKE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"我不(?:太)?喜欢(\w+)",
        r"我(?:很|超)?讨厌(\w+)",
        r"\b[Ii] (?:really )?(?:hate|dislike) (\w+)",
    ])
});

static INTEREST_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"我对(\w+?)(?:很|非常|特别)?感兴趣",
        r"我想学(\w+)",
        r"\b[Ii](?:'m| am) interested in (\w+)",
    ])
});

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("valid regex"))
        .collect()
}

/// Regex-based extractor over the built-in pattern families
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexExtractor;

impl PreferenceExtractor for RegexExtractor {
    fn extract(&self, text: &str) -> Preferences {
        Preferences {
            likes: capture_all(&LIKE_PATTERNS, text),
            dislikes: capture_all(&DISLIKE_PATTERNS, text),
            interests: capture_all(&INTEREST_PATTERNS, text),
        }
    }
}

fn capture_all(patterns: &[Regex], text: &str) -> Vec<String> {
    let mut found = Vec::new();

    for pattern in patterns {
        for captures in pattern.captures_iter(text) {
            if let Some(token) = captures.get(1) {
                found.push(token.as_str().to_string());
            }
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> Preferences {
        RegexExtractor.extract(text)
    }

    #[test]
    fn test_simple_like() {
        let prefs = extract("我喜欢猫");

        assert_eq!(prefs.likes, vec!["猫"]);
        assert!(prefs.dislikes.is_empty());
        assert!(prefs.interests.is_empty());
    }

    #[test]
    fn test_like_with_intensifier() {
        assert_eq!(extract("我最喜欢画画").likes, vec!["画画"]);
        assert_eq!(extract("我超爱恐龙").likes, vec!["恐龙"]);
    }

    #[test]
    fn test_dislike_does_not_count_as_like() {
        let prefs = extract("我不喜欢吃药");

        assert!(prefs.likes.is_empty());
        assert_eq!(prefs.dislikes, vec!["吃药"]);
    }

    #[test]
    fn test_dislike_hate() {
        assert_eq!(extract("我讨厌打雷").dislikes, vec!["打雷"]);
    }

    #[test]
    fn test_interest_with_trailing_intensifier() {
        assert_eq!(extract("我对天文很感兴趣").interests, vec!["天文"]);
        assert_eq!(extract("我对恐龙感兴趣").interests, vec!["恐龙"]);
    }

    #[test]
    fn test_interest_learning() {
        assert_eq!(extract("我想学钢琴").interests, vec!["钢琴"]);
    }

    #[test]
    fn test_english_statements() {
        assert_eq!(extract("I really like trains").likes, vec!["trains"]);
        assert_eq!(extract("i hate thunder").dislikes, vec!["thunder"]);
        assert_eq!(extract("I'm interested in space").interests, vec!["space"]);
    }

    #[test]
    fn test_embedded_i_is_not_a_statement() {
        assert!(extract("Hi like that").likes.is_empty());
    }

    #[test]
    fn test_multiple_statements_in_one_utterance() {
        let prefs = extract("我喜欢猫，我讨厌打雷，我想学画画");

        assert_eq!(prefs.likes, vec!["猫"]);
        assert_eq!(prefs.dislikes, vec!["打雷"]);
        assert_eq!(prefs.interests, vec!["画画"]);
    }

    #[test]
    fn test_duplicates_within_one_call_are_kept() {
        let prefs = extract("我喜欢猫，真的，我喜欢猫");

        assert_eq!(prefs.likes, vec!["猫", "猫"]);
    }

    #[test]
    fn test_no_statements() {
        assert!(extract("今天天气不错").is_empty());
        assert!(extract("").is_empty());
    }

    #[test]
    fn test_deterministic() {
        let text = "我喜欢猫，我对天文很感兴趣";
        assert_eq!(extract(text), extract(text));
    }
}
