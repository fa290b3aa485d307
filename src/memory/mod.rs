//! Durable memory for the companion
//!
//! Two whole-document JSON files: the short-term conversation sequence that
//! is replayed to the language model, and the long-term document holding the
//! conversation log plus accumulated preferences. Both are rewritten in full
//! on every change; the session engine is the single writer.

pub mod types;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

pub use types::{
    ConversationMessage, ConversationRecord, LongTermMemory, MessageRole, Preferences,
    now_timestamp,
};

use crate::error::{Error, Result};

/// Owns the paths of the two persisted memory documents
#[derive(Debug, Clone)]
pub struct MemoryStore {
    short_term_path: PathBuf,
    long_term_path: PathBuf,
}

impl MemoryStore {
    #[must_use]
    pub const fn new(short_term_path: PathBuf, long_term_path: PathBuf) -> Self {
        Self {
            short_term_path,
            long_term_path,
        }
    }

    /// Load the short-term sequence, or a fresh one seeded with the persona
    ///
    /// A persisted document that lost its leading system message (for example
    /// after hand editing) gets one reinserted so the head invariant holds.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_short_term(&self, persona: &str) -> Result<Vec<ConversationMessage>> {
        if !self.short_term_path.exists() {
            return Ok(vec![ConversationMessage::system(persona.to_string())]);
        }

        let content = fs::read_to_string(&self.short_term_path)?;
        let mut messages: Vec<ConversationMessage> = serde_json::from_str(&content)?;

        if messages.first().is_none_or(|m| m.role != MessageRole::System) {
            messages.insert(0, ConversationMessage::system(persona.to_string()));
        }

        Ok(messages)
    }

    /// Load the long-term document, or an empty one if none was persisted yet
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_long_term(&self) -> Result<LongTermMemory> {
        if !self.long_term_path.exists() {
            return Ok(LongTermMemory::default());
        }

        let content = fs::read_to_string(&self.long_term_path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Overwrite the short-term document with the given sequence
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be serialized or written.
    pub fn persist_short_term(&self, messages: &[ConversationMessage]) -> Result<()> {
        write_document(&self.short_term_path, &messages)
    }

    /// Overwrite the long-term document
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be serialized or written.
    pub fn persist_long_term(&self, memory: &LongTermMemory) -> Result<()> {
        write_document(&self.long_term_path, memory)
    }

    /// Delete both documents, used by `lumi memory clear`
    ///
    /// # Errors
    ///
    /// Returns an error if an existing document cannot be removed.
    pub fn clear(&self) -> Result<()> {
        for path in [&self.short_term_path, &self.long_term_path] {
            if path.exists() {
                fs::remove_file(path).map_err(|e| {
                    Error::Persistence(format!("remove {}: {e}", path.display()))
                })?;
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn short_term_path(&self) -> &Path {
        &self.short_term_path
    }

    #[must_use]
    pub fn long_term_path(&self) -> &Path {
        &self.long_term_path
    }
}

/// Bound the short-term sequence to at most `max` entries
///
/// Drops the oldest user and assistant entries while always keeping the
/// leading system message. `max == 0` disables bounding.
pub fn apply_history_bound(messages: &mut Vec<ConversationMessage>, max: usize) {
    if max == 0 || messages.len() <= max {
        return;
    }

    let excess = messages.len() - max;
    messages.drain(1..=excess);
}

fn write_document<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| Error::Persistence(format!("create {}: {e}", parent.display())))?;
    }

    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)
        .map_err(|e| Error::Persistence(format!("write {}: {e}", path.display())))?;

    Ok(())
}
