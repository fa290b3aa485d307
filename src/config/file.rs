//! TOML configuration file loading
//!
//! Supports `~/.config/lumi/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Result;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct LumiConfigFile {
    /// Session lifecycle configuration
    #[serde(default)]
    pub session: SessionFileConfig,

    /// Chat model configuration
    #[serde(default)]
    pub llm: LlmFileConfig,

    /// Voice/audio configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,

    /// Storage configuration
    #[serde(default)]
    pub storage: StorageFileConfig,
}

/// Session lifecycle configuration
#[derive(Debug, Default, Deserialize)]
pub struct SessionFileConfig {
    /// Phrases that wake the companion from Dormant
    pub wake_phrases: Option<Vec<String>>,

    /// Keywords that send an Awake session back to Dormant
    pub sleep_keywords: Option<Vec<String>>,

    /// Seconds of silence before an Awake session goes Dormant
    pub silence_timeout_secs: Option<u64>,

    /// Persona text for the system message
    pub persona: Option<String>,

    /// Spoken acknowledgement on wake
    pub wake_ack: Option<String>,

    /// Spoken acknowledgement on sleep
    pub sleep_ack: Option<String>,

    /// Maximum short-term history length (0 disables bounding)
    pub max_history_messages: Option<usize>,
}

/// Chat model configuration
#[derive(Debug, Default, Deserialize)]
pub struct LlmFileConfig {
    /// Model identifier (e.g. "gpt-3.5-turbo")
    pub model: Option<String>,

    /// `OpenAI`-compatible API base URL
    pub base_url: Option<String>,
}

/// Voice processing configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// Enable voice input/output (false = console mode)
    pub enabled: Option<bool>,

    /// STT model (e.g. "whisper-1")
    pub stt_model: Option<String>,

    /// Language hint passed to transcription (e.g. "zh")
    pub stt_language: Option<String>,

    /// TTS model (e.g. "tts-1")
    pub tts_model: Option<String>,

    /// TTS voice identifier (e.g. "zh-CN-XiaoyiNeural")
    pub tts_voice: Option<String>,

    /// Seconds per microphone listen window
    pub listen_window_secs: Option<u64>,

    /// Milliseconds between animation frames
    pub frame_interval_ms: Option<u64>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub openai: Option<String>,
}

/// Storage configuration
#[derive(Debug, Default, Deserialize)]
pub struct StorageFileConfig {
    /// Data directory for memory stores
    pub data_dir: Option<String>,
}

/// Load the TOML config file, from `path_override` when given, else from the
/// standard path.
///
/// An explicit override must load cleanly; the standard path degrades to
/// `LumiConfigFile::default()` when missing or unparsable.
///
/// # Errors
///
/// Returns an error if an explicitly given path cannot be read or parsed.
pub fn load_config_file(path_override: Option<&Path>) -> Result<LumiConfigFile> {
    if let Some(path) = path_override {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), "loaded config file");
        return Ok(config);
    }

    let Some(path) = config_file_path() else {
        return Ok(LumiConfigFile::default());
    };

    if !path.exists() {
        return Ok(LumiConfigFile::default());
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                Ok(config)
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                Ok(LumiConfigFile::default())
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            Ok(LumiConfigFile::default())
        }
    }
}

/// Return the config file path: `~/.config/lumi/config.toml`
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("lumi").join("config.toml"))
}
