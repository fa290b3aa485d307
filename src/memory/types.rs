//! Data model for the two persisted memory documents

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::emotion::EmotionLabel;

/// Timestamp format used in both persisted documents
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time rendered in the persisted timestamp format
#[must_use]
pub fn now_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Role of a short-term conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Parse a lowercase wire value back into a role
    #[must_use]
    pub fn from_str_value(value: &str) -> Option<Self> {
        match value {
            "system" => Some(Self::System),
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            _ => None,
        }
    }
}

/// One entry in the short-term conversation sequence
///
/// The first entry is always the system persona message and is the only one
/// ever rewritten in place. It carries no timestamp; user and assistant
/// entries are stamped when appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: MessageRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ConversationMessage {
    #[must_use]
    pub const fn system(content: String) -> Self {
        Self {
            role: MessageRole::System,
            content,
            timestamp: None,
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            timestamp: Some(now_timestamp()),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            timestamp: Some(now_timestamp()),
        }
    }
}

/// One completed conversation turn in the long-term log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub user_input: String,
    pub reply: String,
    pub emotion: EmotionLabel,
    pub timestamp: String,
}

impl ConversationRecord {
    #[must_use]
    pub fn new(user_input: impl Into<String>, reply: impl Into<String>, emotion: EmotionLabel) -> Self {
        Self {
            user_input: user_input.into(),
            reply: reply.into(),
            emotion,
            timestamp: now_timestamp(),
        }
    }
}

/// Accumulated user preferences, deduplicated by exact string match
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub likes: Vec<String>,
    #[serde(default)]
    pub dislikes: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
}

impl Preferences {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.likes.is_empty() && self.dislikes.is_empty() && self.interests.is_empty()
    }

    /// Merge newly extracted preferences into the accumulated set
    ///
    /// Entries already present in a category are skipped. Returns the number
    /// of entries actually added, so callers can skip persistence when the
    /// merge was a no-op.
    pub fn merge(&mut self, found: &Self) -> usize {
        let mut added = 0;

        for (existing, new) in [
            (&mut self.likes, &found.likes),
            (&mut self.dislikes, &found.dislikes),
            (&mut self.interests, &found.interests),
        ] {
            for item in new {
                if !existing.contains(item) {
                    existing.push(item.clone());
                    added += 1;
                }
            }
        }

        added
    }
}

/// The whole long-term memory document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongTermMemory {
    #[serde(default)]
    pub conversations: Vec<ConversationRecord>,
    #[serde(default)]
    pub preferences: Preferences,
}
