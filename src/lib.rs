//! Lumi Companion - a voice-driven companion agent
//!
//! This library provides the core functionality for the Lumi companion:
//! - Session lifecycle (Dormant/Awake state machine, silence timeout)
//! - Short-term and long-term memory with JSON persistence
//! - Regex preference extraction and keyword emotion classification
//! - Voice adapters (wake phrases, Whisper STT, TTS) with console fallbacks
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │               Speech adapters                 │
//! │    microphone + Whisper  │  console (stdin)   │
//! └──────────────────┬────────────────────────────┘
//!                    │ utterances
//! ┌──────────────────▼────────────────────────────┐
//! │               Session Engine                  │
//! │   wake/sleep  │  turns  │  emotion  │  merge  │
//! └─────┬──────────────┬──────────────────┬───────┘
//!       │              │                  │
//! ┌─────▼──────┐ ┌─────▼───────┐ ┌────────▼───────┐
//! │  Animator  │ │ Chat model  │ │ Memory stores  │
//! │  (frames)  │ │  (OpenAI)   │ │  (JSON files)  │
//! └────────────┘ └─────────────┘ └────────────────┘
//! ```

pub mod animator;
pub mod config;
pub mod display;
pub mod emotion;
pub mod error;
pub mod memory;
pub mod model;
pub mod preferences;
pub mod prompt;
pub mod session;
pub mod setup;
pub mod voice;

pub use animator::FeedbackAnimator;
pub use config::Config;
pub use display::{ConsoleDisplay, DisplayAdapter, PanelDisplay};
pub use emotion::EmotionLabel;
pub use error::{Error, Result};
pub use memory::{
    ConversationMessage, ConversationRecord, LongTermMemory, MemoryStore, MessageRole, Preferences,
};
pub use model::{LanguageModel, OpenAiChatModel};
pub use preferences::{PreferenceExtractor, RegexExtractor};
pub use session::{SessionEngine, SessionState};
pub use voice::{SpeechInput, SpeechOutput};
